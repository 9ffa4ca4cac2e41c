//! Internal utilities.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Bind the notification socket.
///
/// IPv6 sockets are dual-stack (`IPV6_V6ONLY` off), so `[::]:162` also
/// receives IPv4 traps. A requested receive buffer is best effort: Linux
/// silently caps it at `net.core.rmem_max`. Must run inside a tokio runtime.
pub(crate) fn bind_udp_socket(
    addr: SocketAddr,
    recv_buffer_size: Option<usize>,
    reuse_address: bool,
) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(reuse_address)?;
    if let Some(size) = recv_buffer_size
        && let Err(e) = socket.set_recv_buffer_size(size)
    {
        tracing::debug!(
            snmp.recv_buffer = size,
            error = %e,
            "receive buffer size not applied"
        );
    }

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}
