//! Audio streaming sessions.
//!
//! A session owns one stream's UDP data socket. A control handler creates
//! it (typically on ANNOUNCE or SETUP), then either binds it for receiving
//! or dials the peer for sending.
//!
//! ## Lifecycle
//!
//! ```text
//! new()             -> Created
//! init_receive()    -> ReceivingBound   (ephemeral port in local_ports.data)
//! start_receiving() -> Active           (receive thread running)
//! start_sending()   -> SendingBound     (socket connected to remote data port)
//! close()           -> Closed           (terminal)
//! ```
//!
//! ## Delivery
//!
//! The receive thread pushes every datagram, decrypted when a
//! [`Decrypter`] is configured, onto a channel holding at most
//! [`DELIVERY_CAPACITY`] payloads. When the consumer falls behind the push
//! blocks, which in turn stops reading the socket; excess datagrams are then
//! dropped by the OS rather than buffered here. A datagram that fails to
//! decrypt is logged and dropped; the stream continues.
//!
//! ## Shutdown
//!
//! There is no read timeout on the socket. [`Session::close`] marks the
//! [`DataConn`] closed, which fails all further I/O on it, and wakes the
//! pending read. The thread then exits and signals completion, blocking
//! until the caller receives it. If the thread is blocked pushing onto a full
//! channel, it only notices the close once the consumer makes room, so
//! shutdown latency depends on the consumer.

mod conn;
pub mod ports;

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{RaopError, Result};
use crate::transport::udp;
pub use conn::DataConn;
pub use ports::PortSet;

/// Maximum number of undelivered payloads per session.
pub const DELIVERY_CAPACITY: usize = 1000;

/// Size of the reusable datagram read buffer.
pub const READ_BUFFER_LEN: usize = 16 * 1024;

/// Per-session payload decryption, keyed out of band (e.g. from ANNOUNCE).
pub trait Decrypter: Send + Sync {
    /// Return the plaintext for one datagram.
    fn decode(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    ReceivingBound,
    SendingBound,
    /// Receive thread running.
    Active,
    Closed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::ReceivingBound => "receiving-bound",
            SessionState::SendingBound => "sending-bound",
            SessionState::Active => "active",
            SessionState::Closed => "closed",
        }
    }
}

/// Coordination between [`Session::close`] and the receive thread so that
/// completion is signalled exactly once, whichever side finishes last.
#[derive(Default)]
struct Shutdown {
    inner: Mutex<ShutdownInner>,
}

#[derive(Default)]
struct ShutdownInner {
    loop_running: bool,
    done: Option<Sender<()>>,
}

impl Shutdown {
    /// Hand `done` to the receive thread. Returns `true` when the thread is
    /// still running and has to be woken; it will signal `done` on exit.
    /// Otherwise `done` is signalled here.
    fn close(&self, done: Option<Sender<()>>) -> bool {
        let mut inner = self.inner.lock();
        if inner.loop_running {
            inner.done = done;
            return true;
        }
        drop(inner);
        if let Some(done) = done {
            signal_now(&done);
        }
        false
    }

    /// Signal a pending `done` from the closing side when the receive
    /// thread cannot be woken.
    fn release(&self) {
        let done = self.inner.lock().done.take();
        if let Some(done) = done {
            signal_now(&done);
        }
    }

    fn loop_started(&self) {
        self.inner.lock().loop_running = true;
    }

    fn loop_finished(&self) {
        let done = {
            let mut inner = self.inner.lock();
            inner.loop_running = false;
            inner.done.take()
        };
        // Runs on the receive thread, so waiting for the caller is fine.
        if let Some(done) = done
            && done.send(()).is_err()
        {
            tracing::debug!("session close signal receiver dropped");
        }
    }
}

/// Signal from the closing thread itself, which cannot wait on its own
/// receiver. Needs a channel with room for the message.
fn signal_now(done: &Sender<()>) {
    if let Err(e) = done.try_send(()) {
        tracing::warn!(error = %e, "could not signal session close");
    }
}

/// One audio stream.
///
/// `D` is the session description produced by an external SDP parser; the
/// session only stores it.
pub struct Session<D = ()> {
    pub local_ports: PortSet,
    pub remote_ports: PortSet,
    description: D,
    decrypter: Option<Arc<dyn Decrypter>>,
    data_conn: Option<Arc<DataConn>>,
    data_tx: Option<Sender<Vec<u8>>>,
    data_rx: Receiver<Vec<u8>>,
    state: SessionState,
    shutdown: Arc<Shutdown>,
}

impl<D> Session<D> {
    pub fn new(description: D, decrypter: Option<Arc<dyn Decrypter>>) -> Self {
        let (data_tx, data_rx) = crossbeam_channel::bounded(DELIVERY_CAPACITY);
        Session {
            local_ports: PortSet::default(),
            remote_ports: PortSet::default(),
            description,
            decrypter,
            data_conn: None,
            data_tx: Some(data_tx),
            data_rx,
            state: SessionState::Created,
            shutdown: Arc::new(Shutdown::default()),
        }
    }

    pub fn description(&self) -> &D {
        &self.description
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Live data socket, if one has been bound or dialed. Handles stop
    /// working once the session is closed.
    pub fn data_conn(&self) -> Option<Arc<DataConn>> {
        self.data_conn.clone()
    }

    /// Consumer end of the delivery channel.
    ///
    /// The channel disconnects once the receive thread exits, or on close
    /// when receiving never started. One consumer per session.
    pub fn data_channel(&self) -> Receiver<Vec<u8>> {
        self.data_rx.clone()
    }

    fn expect_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        match self.state {
            SessionState::Closed => Err(RaopError::SessionClosed),
            state if state == expected => Ok(()),
            state => Err(RaopError::InvalidState {
                operation,
                state: state.as_str(),
            }),
        }
    }

    /// Bind an ephemeral UDP socket for inbound audio and record its port
    /// in `local_ports.data`.
    pub fn init_receive(&mut self) -> Result<()> {
        self.expect_state(SessionState::Created, "init receive")?;

        let socket = udp::bind_ephemeral()?;
        let port = socket.local_addr()?.port();
        self.local_ports.data = port;
        self.data_conn = Some(Arc::new(DataConn::new(socket)));
        self.state = SessionState::ReceivingBound;

        tracing::debug!(data_port = port, "session bound for receiving");
        Ok(())
    }

    /// Spawn the receive thread.
    pub fn start_receiving(&mut self) -> Result<()> {
        self.expect_state(SessionState::ReceivingBound, "start receiving")?;

        let (Some(conn), Some(tx)) = (self.data_conn.clone(), self.data_tx.take()) else {
            return Err(RaopError::InvalidState {
                operation: "start receiving",
                state: self.state.as_str(),
            });
        };

        let decrypter = self.decrypter.clone();
        let shutdown = self.shutdown.clone();
        shutdown.loop_started();
        self.state = SessionState::Active;

        tracing::info!(
            data_port = self.local_ports.data,
            encrypted = decrypter.is_some(),
            "session started, listening for audio packets"
        );

        thread::spawn(move || {
            let reason = receive_loop(&conn, &tx, decrypter.as_deref());
            drop(tx);
            tracing::info!(reason, "session receive loop exited");
            shutdown.loop_finished();
        });

        Ok(())
    }

    /// Connect a UDP socket to `remote_ports.address:remote_ports.data`.
    ///
    /// Outbound audio is then written with [`send`](Self::send) or directly
    /// on [`data_conn`](Self::data_conn).
    pub fn start_sending(&mut self) -> Result<()> {
        self.expect_state(SessionState::Created, "start sending")?;

        let socket = udp::dial(&self.remote_ports.address, self.remote_ports.data).map_err(|e| {
            tracing::error!(
                address = %self.remote_ports.address,
                port = self.remote_ports.data,
                error = %e,
                "failed to dial data port"
            );
            e
        })?;
        self.data_conn = Some(Arc::new(DataConn::new(socket)));
        self.state = SessionState::SendingBound;

        tracing::info!(
            address = %self.remote_ports.address,
            port = self.remote_ports.data,
            "session started, sending packets"
        );
        Ok(())
    }

    /// Write one datagram on the dialed socket.
    pub fn send(&self, payload: &[u8]) -> Result<usize> {
        self.expect_state(SessionState::SendingBound, "send")?;
        let conn = self.data_conn.as_ref().ok_or(RaopError::InvalidState {
            operation: "send",
            state: self.state.as_str(),
        })?;
        Ok(conn.send(payload)?)
    }

    /// Close the data socket and signal `done` once the receive thread has
    /// exited.
    ///
    /// While receiving, the thread blocks on `done` until it is received, so
    /// any channel works, including `bounded(0)`. When no data connection
    /// was ever opened, or nothing is receiving, `done` is signalled before
    /// this returns and needs room for one message.
    pub fn close(&mut self, done: Sender<()>) {
        tracing::info!(state = self.state.as_str(), "closing session");
        self.state = SessionState::Closed;
        self.data_tx = None;

        let Some(conn) = self.data_conn.take() else {
            tracing::debug!("no data connection to close");
            signal_now(&done);
            return;
        };

        // `done` is registered before the flag so the thread cannot exit
        // unseen in between.
        let running = self.shutdown.close(Some(done));
        conn.mark_closed();
        if running && let Err(e) = conn.wake() {
            tracing::warn!(error = %e, "failed to wake session receive loop");
            self.shutdown.release();
        }
    }
}

impl<D> Drop for Session<D> {
    fn drop(&mut self) {
        if let Some(conn) = self.data_conn.take()
            && conn.mark_closed()
            && self.shutdown.close(None)
        {
            let _ = conn.wake();
        }
    }
}

/// Read, decrypt and deliver datagrams until the session is closed, the
/// socket fails or the consumer goes away. Returns the exit reason.
fn receive_loop(
    conn: &DataConn,
    tx: &Sender<Vec<u8>>,
    decrypter: Option<&dyn Decrypter>,
) -> &'static str {
    let mut buf = vec![0u8; READ_BUFFER_LEN];
    loop {
        let read = conn.raw().recv_from(&mut buf);
        if conn.is_closed() {
            return "session closed";
        }

        let n = match read {
            Ok((n, _)) => n,
            Err(e) => {
                tracing::warn!(error = %e, "error reading data from socket");
                return "read error";
            }
        };

        let payload = match decrypter {
            Some(decrypter) => match decrypter.decode(&buf[..n]) {
                Ok(plaintext) => plaintext,
                Err(e) => {
                    tracing::warn!(len = n, error = %e, "dropping undecryptable packet");
                    continue;
                }
            },
            None => buf[..n].to_vec(),
        };

        tracing::trace!(len = payload.len(), queued = tx.len(), "packet received");

        if tx.send(payload).is_err() {
            return "consumer dropped";
        }
    }
}
