use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use crate::error::Result;

/// Bind an ephemeral UDP socket on all IPv4 interfaces.
pub(crate) fn bind_ephemeral() -> Result<UdpSocket> {
    Ok(UdpSocket::bind("0.0.0.0:0")?)
}

/// Open a UDP socket connected to `host:port`.
///
/// The local socket is bound on the wildcard address of the same family as
/// the first resolved remote address.
pub(crate) fn dial(host: &str, port: u16) -> Result<UdpSocket> {
    let remote = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("no address for {host}:{port}"),
        )
    })?;
    let local: SocketAddr = match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local)?;
    socket.connect(remote)?;
    Ok(socket)
}

/// Address a datagram must be sent to in order to reach `socket` from the
/// local host.
fn loopback_target(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}

/// Unblock a thread parked in `recv_from` on `socket`.
///
/// Std sockets cannot be closed from another thread, so an empty datagram
/// is sent to the socket's own address instead. The reader is expected to
/// check its shutdown flag after every read.
pub(crate) fn wake(socket: &UdpSocket) -> Result<()> {
    let target = loopback_target(socket.local_addr()?);
    let waker = match target {
        SocketAddr::V4(_) => UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))?,
        SocketAddr::V6(_) => UdpSocket::bind((Ipv6Addr::LOCALHOST, 0))?,
    };
    waker.send_to(&[], target)?;
    Ok(())
}
