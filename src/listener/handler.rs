//! The handler contract and the default logging handler.

use std::net::SocketAddr;

use crate::notification::TrapPacket;

/// Application callback invoked once per received datagram.
///
/// The packet may be partial or empty when the datagram could not be decoded
/// (see [`DecodeFailurePolicy`](crate::DecodeFailurePolicy)).
///
/// In [`DispatchMode::Inline`](crate::DispatchMode::Inline) the handler runs on
/// the listener's task and blocks the receive loop until it returns. In
/// [`DispatchMode::Queued`](crate::DispatchMode::Queued) it runs on one of the
/// worker threads. No other thread guarantee is made.
///
/// Any `Fn(TrapPacket, SocketAddr)` closure is a handler:
///
/// ```rust
/// use async_snmp_trap::TrapListener;
///
/// let listener = TrapListener::builder()
///     .handler(|packet: async_snmp_trap::TrapPacket, source: std::net::SocketAddr| {
///         println!("{source}: {:?}", packet.trap_oid());
///     })
///     .build();
/// ```
pub trait TrapHandler: Send + Sync + 'static {
    /// Handle one packet received from `source`.
    fn handle(&self, packet: TrapPacket, source: SocketAddr);
}

impl<F> TrapHandler for F
where
    F: Fn(TrapPacket, SocketAddr) + Send + Sync + 'static,
{
    fn handle(&self, packet: TrapPacket, source: SocketAddr) {
        self(packet, source)
    }
}

/// Default handler: logs one line per packet at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl TrapHandler for LoggingHandler {
    fn handle(&self, packet: TrapPacket, source: SocketAddr) {
        tracing::info!(
            snmp.source = %source,
            snmp.varbind_count = packet.varbinds.len(),
            "got trap from {}: {}",
            source,
            packet
        );
    }
}
