//! Listener configuration and policies.

use std::time::Duration;

/// Default receive buffer per datagram. Larger datagrams are truncated.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 4096;

/// What the receive loop does after a socket read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadErrorPolicy {
    /// Retry immediately, forever.
    ///
    /// A socket that fails persistently produces a tight error loop. Kept for
    /// callers that need the historical behaviour.
    Continue,
    /// Sleep before the next read, doubling the delay per consecutive error.
    Backoff {
        /// Delay after the first error.
        base_delay: Duration,
        /// Upper bound for the delay.
        max_delay: Duration,
        /// Stop the loop with [`Error::ReadFailed`](crate::Error::ReadFailed)
        /// once this many errors occurred in a row (`None` = never stop).
        max_consecutive: Option<u32>,
    },
}

impl Default for ReadErrorPolicy {
    fn default() -> Self {
        Self::Backoff {
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            max_consecutive: None,
        }
    }
}

impl ReadErrorPolicy {
    /// Delay to apply after the `consecutive`-th error in a row (1-based).
    pub fn delay_for(&self, consecutive: u32) -> Option<Duration> {
        match *self {
            Self::Continue => None,
            Self::Backoff {
                base_delay,
                max_delay,
                ..
            } => {
                let factor = 2u32.saturating_pow(consecutive.saturating_sub(1));
                Some(base_delay.saturating_mul(factor).min(max_delay))
            }
        }
    }

    /// Whether the loop should give up after `consecutive` errors in a row.
    pub fn exhausted(&self, consecutive: u32) -> bool {
        match *self {
            Self::Continue => false,
            Self::Backoff {
                max_consecutive, ..
            } => max_consecutive.is_some_and(|max| consecutive >= max),
        }
    }
}

/// What happens to a datagram the decoder could not fully decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeFailurePolicy {
    /// Dispatch whatever packet the decoder produced (possibly empty).
    #[default]
    FailOpen,
    /// Log the error and drop the datagram.
    Suppress,
}

/// How packets are handed to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Call the handler on the receive task, before the next read.
    ///
    /// Per-socket delivery order is preserved. A slow handler stalls the
    /// receive loop and the kernel drops datagrams once its buffer fills.
    #[default]
    Inline,
    /// Hand packets to a pool of worker threads through a bounded queue.
    ///
    /// When the queue is full the datagram is dropped and counted so the
    /// receive loop keeps draining the socket. Ordering is only preserved
    /// with a single worker.
    Queued {
        /// Queue capacity (minimum 1).
        capacity: usize,
        /// Number of worker threads (minimum 1).
        workers: usize,
    },
}

/// Configuration for a trap listener.
///
/// `ListenerConfig::default()` is the default policy: errors are logged,
/// datagrams are read into a 4096-byte buffer, undecodable datagrams are still
/// dispatched, read errors back off without ever stopping the loop, and the
/// handler runs inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Emit diagnostics for read and decode errors (default: true).
    pub log_errors: bool,
    /// Receive buffer size per datagram (default: 4096).
    pub max_datagram_size: usize,
    /// Kernel receive buffer size (SO_RCVBUF). The kernel may cap this.
    pub recv_buffer_size: Option<usize>,
    /// Set SO_REUSEADDR before binding (default: false).
    ///
    /// On Linux this lets several sockets bind the same UDP port, which hides
    /// the "port already in use" failure.
    pub reuse_address: bool,
    /// Policy for undecodable datagrams (default: fail open).
    pub decode_failure: DecodeFailurePolicy,
    /// Policy for socket read errors (default: backoff, never stop).
    pub read_errors: ReadErrorPolicy,
    /// Handler dispatch mode (default: inline).
    pub dispatch: DispatchMode,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            log_errors: true,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            recv_buffer_size: None,
            reuse_address: false,
            decode_failure: DecodeFailurePolicy::default(),
            read_errors: ReadErrorPolicy::default(),
            dispatch: DispatchMode::default(),
        }
    }
}
