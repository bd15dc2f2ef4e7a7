//! Network transport layer for control signaling and audio delivery.
//!
//! RAOP uses a split transport model:
//!
//! - **TCP** ([`tcp`]): carries the RTSP-style control requests. One TCP
//!   connection per sender, with a thread per connection.
//!
//! - **UDP** ([`udp`]): carries audio datagrams. Each
//!   [`Session`](crate::session::Session) owns its own socket, bound on an
//!   ephemeral port for receiving or connected to the peer for sending.

pub(crate) mod tcp;
pub(crate) mod udp;
