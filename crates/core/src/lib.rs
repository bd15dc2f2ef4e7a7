pub mod daap;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
mod transport;

pub use error::{RaopError, Result};
pub use protocol::{Method, Request, RequestHandler, Response};
pub use server::{Server, ServerConfig};
pub use session::{DataConn, Decrypter, PortSet, Session};
