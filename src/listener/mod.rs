//! UDP trap listener.
//!
//! A [`TrapListener`] binds a UDP socket, reads datagrams, passes each one to
//! its [`TrapDecoder`] and hands the resulting packet to its [`TrapHandler`]
//! together with the sender's address.
//!
//! # Failure handling
//!
//! | Failure | What happens |
//! |---------|--------------|
//! | Address cannot be resolved | [`Error::AddressResolution`] is returned, no socket is opened |
//! | Socket cannot be bound | [`Error::Bind`] is returned |
//! | A read fails | Logged, then the [`ReadErrorPolicy`] decides: sleep and retry, retry at once, or stop with [`Error::ReadFailed`] |
//! | A datagram cannot be decoded | Logged, then the [`DecodeFailurePolicy`] decides: dispatch the partial packet (default) or drop it |
//!
//! # Example
//!
//! ```rust,no_run
//! use async_snmp_trap::{TrapListener, TrapPacket};
//! use std::net::SocketAddr;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> async_snmp_trap::Result<()> {
//! let listener = TrapListener::builder()
//!     .handler(|packet: TrapPacket, source: SocketAddr| {
//!         println!("{source}: {packet}");
//!     })
//!     .build();
//!
//! let token = CancellationToken::new();
//! let bound = listener.bind("0.0.0.0:1162").await?;
//! println!("listening on {}", bound.local_addr());
//! bound.run(token).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod handler;

pub use config::{
    DEFAULT_MAX_DATAGRAM_SIZE, DecodeFailurePolicy, DispatchMode, ListenerConfig, ReadErrorPolicy,
};
pub use handler::{LoggingHandler, TrapHandler};

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::decoder::{BerTrapDecoder, TrapDecoder};
use crate::error::{Error, Result};
use crate::util::bind_udp_socket;
use dispatch::Dispatcher;

/// A configured, not yet bound, trap listener.
///
/// Built once through [`TrapListener::builder`] (or [`TrapListener::new`] for
/// all defaults) and immutable afterwards. One listener value can be used to
/// listen on several addresses; each call binds its own socket and runs its
/// own receive loop.
#[derive(Clone)]
pub struct TrapListener {
    handler: Arc<dyn TrapHandler>,
    decoder: Arc<dyn TrapDecoder>,
    config: ListenerConfig,
}

impl TrapListener {
    /// Listener with the logging handler, the BER decoder and the default
    /// configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring the listener.
    ///
    /// ```rust
    /// use async_snmp_trap::{DecodeFailurePolicy, TrapListener};
    ///
    /// let listener = TrapListener::builder()
    ///     .max_datagram_size(8192)
    ///     .decode_failure(DecodeFailurePolicy::Suppress)
    ///     .build();
    /// assert_eq!(listener.config().max_datagram_size, 8192);
    /// ```
    pub fn builder() -> TrapListenerBuilder {
        TrapListenerBuilder::new()
    }

    /// The effective configuration.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Receive traps on `addr` until the process ends.
    ///
    /// Only returns on setup failure, or with [`Error::ReadFailed`] when the
    /// read-error policy has a threshold.
    pub async fn listen(&self, addr: &str) -> Result<()> {
        self.listen_until(addr, CancellationToken::new()).await
    }

    /// Receive traps on `addr` until `token` is cancelled.
    ///
    /// Returns `Ok(())` once cancelled. Packets already queued for workers are
    /// handled before this returns.
    pub async fn listen_until(&self, addr: &str, token: CancellationToken) -> Result<()> {
        self.bind(addr).await?.run(token).await
    }

    /// Resolve and bind `addr` without starting the receive loop.
    ///
    /// `addr` is `host:port`. `:port` binds every interface through a
    /// dual-stack `[::]` socket, falling back to `0.0.0.0` on hosts without
    /// IPv6. Binding port 0 picks a free port, see
    /// [`BoundTrapListener::local_addr`].
    pub async fn bind(&self, addr: &str) -> Result<BoundTrapListener> {
        let mut bind_addr = resolve_listen_addr(addr).await?;

        let socket = match self.bind_socket(bind_addr) {
            Err(e) if addr.starts_with(':') && e.kind() != io::ErrorKind::AddrInUse => {
                tracing::debug!(
                    snmp.local_addr = %bind_addr,
                    error = %e,
                    "dual-stack bind failed, using IPv4 only"
                );
                bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, bind_addr.port()));
                self.bind_socket(bind_addr)
            }
            other => other,
        }
        .map_err(|source| Error::Bind {
            addr: bind_addr,
            source,
        })?;

        let local_addr = socket.local_addr().map_err(|source| Error::Io {
            target: Some(bind_addr),
            source,
        })?;

        tracing::debug!(
            snmp.local_addr = %local_addr,
            snmp.max_datagram_size = self.config.max_datagram_size,
            "trap listener bound"
        );

        Ok(BoundTrapListener {
            socket,
            local_addr,
            listener: self.clone(),
        })
    }
}

impl TrapListener {
    fn bind_socket(&self, addr: SocketAddr) -> io::Result<UdpSocket> {
        bind_udp_socket(
            addr,
            self.config.recv_buffer_size,
            self.config.reuse_address,
        )
    }
}

impl Default for TrapListener {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TrapListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrapListener")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TrapListener`].
///
/// Anything left unset falls back to its default: [`LoggingHandler`],
/// [`BerTrapDecoder`] and [`ListenerConfig::default`].
pub struct TrapListenerBuilder {
    handler: Option<Arc<dyn TrapHandler>>,
    decoder: Option<Arc<dyn TrapDecoder>>,
    config: ListenerConfig,
}

impl TrapListenerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            handler: None,
            decoder: None,
            config: ListenerConfig::default(),
        }
    }

    /// Set the handler invoked for every packet.
    pub fn handler(mut self, handler: impl TrapHandler) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set a shared handler.
    pub fn shared_handler(mut self, handler: Arc<dyn TrapHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Replace the datagram decoder.
    pub fn decoder(mut self, decoder: impl TrapDecoder) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ListenerConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable read/decode diagnostics (default: true).
    pub fn log_errors(mut self, enabled: bool) -> Self {
        self.config.log_errors = enabled;
        self
    }

    /// Set the per-datagram receive buffer size (default: 4096).
    ///
    /// Datagrams larger than this are truncated.
    pub fn max_datagram_size(mut self, size: usize) -> Self {
        self.config.max_datagram_size = size;
        self
    }

    /// Request a kernel receive buffer size (SO_RCVBUF).
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = Some(size);
        self
    }

    /// Set SO_REUSEADDR on the socket (default: false).
    pub fn reuse_address(mut self, enabled: bool) -> Self {
        self.config.reuse_address = enabled;
        self
    }

    /// Set the policy for undecodable datagrams.
    pub fn decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.config.decode_failure = policy;
        self
    }

    /// Set the policy for socket read errors.
    pub fn read_errors(mut self, policy: ReadErrorPolicy) -> Self {
        self.config.read_errors = policy;
        self
    }

    /// Set the dispatch mode.
    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.config.dispatch = mode;
        self
    }

    /// Build the listener.
    pub fn build(self) -> TrapListener {
        TrapListener {
            handler: self.handler.unwrap_or_else(|| Arc::new(LoggingHandler)),
            decoder: self
                .decoder
                .unwrap_or_else(|| Arc::new(BerTrapDecoder::new())),
            config: self.config,
        }
    }
}

impl Default for TrapListenerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A trap listener with a bound socket, ready to run.
///
/// Dropping it without calling [`run`](Self::run) closes the socket.
pub struct BoundTrapListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    listener: TrapListener,
}

impl BoundTrapListener {
    /// The address the socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the receive loop until `token` is cancelled.
    ///
    /// Consumes the listener; the socket is closed when this returns.
    pub async fn run(self, token: CancellationToken) -> Result<()> {
        let Self {
            socket,
            local_addr,
            listener,
        } = self;
        receive_loop(socket, local_addr, listener, token).await
    }
}

/// Where the receive loop gets its datagrams from.
pub(crate) trait RecvDatagram {
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

impl RecvDatagram for UdpSocket {
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.recv_from(buf).await
    }
}

async fn receive_loop<S: RecvDatagram>(
    mut socket: S,
    local_addr: SocketAddr,
    listener: TrapListener,
    token: CancellationToken,
) -> Result<()> {
    let TrapListener {
        handler,
        decoder,
        config,
    } = listener;

    let mut dispatcher = Dispatcher::new(handler, config.dispatch);
    let mut buf = vec![0u8; config.max_datagram_size];
    let mut consecutive_errors: u32 = 0;

    tracing::info!(snmp.local_addr = %local_addr, "trap listener started");

    let result = loop {
        let received = tokio::select! {
            biased;
            _ = token.cancelled() => break Ok(()),
            received = socket.recv_datagram(&mut buf) => received,
        };

        match received {
            Ok((len, source)) => {
                consecutive_errors = 0;
                tracing::trace!(
                    snmp.source = %source,
                    snmp.bytes = len,
                    "received datagram"
                );

                let (packet, err) = decoder.decode(&buf[..len]);
                if let Some(e) = err {
                    if config.log_errors {
                        tracing::warn!(
                            snmp.source = %source,
                            snmp.bytes = len,
                            error = %e,
                            "failed to decode trap"
                        );
                    }
                    if config.decode_failure == DecodeFailurePolicy::Suppress {
                        continue;
                    }
                }

                dispatcher.dispatch(packet, source);
            }
            Err(e) => {
                consecutive_errors = consecutive_errors.saturating_add(1);
                if config.log_errors {
                    tracing::error!(
                        snmp.local_addr = %local_addr,
                        snmp.consecutive_errors = consecutive_errors,
                        error = %e,
                        "trap receive error"
                    );
                }

                if config.read_errors.exhausted(consecutive_errors) {
                    break Err(Error::ReadFailed {
                        local_addr,
                        consecutive: consecutive_errors,
                        source: e,
                    });
                }

                if let Some(delay) = config.read_errors.delay_for(consecutive_errors)
                    && backoff(delay, &token).await
                {
                    break Ok(());
                }
            }
        }
    };

    drop(socket);
    let dropped = dispatcher.shutdown().await;

    tracing::info!(
        snmp.local_addr = %local_addr,
        snmp.dropped = dropped,
        "trap listener stopped"
    );

    result
}

impl std::fmt::Debug for BoundTrapListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundTrapListener")
            .field("local_addr", &self.local_addr)
            .field("config", &self.listener.config)
            .finish_non_exhaustive()
    }
}

/// Sleep for `delay`, returning true if cancelled meanwhile.
async fn backoff(delay: Duration, token: &CancellationToken) -> bool {
    if delay.is_zero() {
        return token.is_cancelled();
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => true,
        _ = tokio::time::sleep(delay) => false,
    }
}

/// Resolve a `host:port` listen address to the first matching endpoint.
async fn resolve_listen_addr(addr: &str) -> Result<SocketAddr> {
    let target = match addr.strip_prefix(':') {
        Some(port) => format!("[::]:{port}"),
        None => addr.to_owned(),
    };

    let mut resolved = tokio::net::lookup_host(target.as_str())
        .await
        .map_err(|source| resolution_error(addr, source))?;

    resolved.next().ok_or_else(|| {
        resolution_error(
            addr,
            io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        )
    })
}

fn resolution_error(addr: &str, source: io::Error) -> Error {
    Error::AddressResolution {
        input: addr.into(),
        source,
    }
}
