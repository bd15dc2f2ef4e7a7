use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::transport::udp;

/// A session's UDP data socket.
///
/// Handed out by [`Session::data_conn`](super::Session::data_conn). Once the
/// session is closed every I/O call fails with [`io::ErrorKind::NotConnected`],
/// including on handles cloned before the close.
#[derive(Debug)]
pub struct DataConn {
    socket: UdpSocket,
    closed: AtomicBool,
}

impl DataConn {
    pub(super) fn new(socket: UdpSocket) -> Self {
        DataConn {
            socket,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> io::Result<()> {
        if self.is_closed() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "session closed"));
        }
        Ok(())
    }

    /// Send on a dialed connection.
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        self.socket.send(buf)
    }

    pub fn send_to(&self, buf: &[u8], addr: impl ToSocketAddrs) -> io::Result<usize> {
        self.check_open()?;
        self.socket.send_to(buf, addr)
    }

    /// Receive one datagram. A read woken by the close reports the close
    /// rather than the wake datagram.
    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.check_open()?;
        let read = self.socket.recv_from(buf);
        self.check_open()?;
        read
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }

    /// Socket for the session's own receive thread, which checks
    /// [`is_closed`](Self::is_closed) itself after every read.
    pub(super) fn raw(&self) -> &UdpSocket {
        &self.socket
    }

    /// Mark closed. Returns `false` if it already was.
    pub(super) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    /// Unblock a read pending on this socket.
    pub(super) fn wake(&self) -> Result<()> {
        udp::wake(&self.socket)
    }
}
