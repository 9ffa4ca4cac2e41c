//! # async-snmp-trap
//!
//! Async SNMP trap receiver built on tokio.
//!
//! A [`TrapListener`] binds a UDP socket (port 162 by convention), decodes
//! every datagram it receives into a [`TrapPacket`] and hands the packet to a
//! [`TrapHandler`] together with the sender's address.
//!
//! - SNMPv1 Trap-PDUs and SNMPv2c SNMPv2-Trap / InformRequest PDUs
//! - Fail-open decoding: malformed datagrams still reach the handler as a
//!   partial or empty packet (configurable)
//! - Cancellation through [`tokio_util::sync::CancellationToken`]
//! - Bounded backoff on socket read errors
//! - Optional bounded queue with worker threads for slow handlers
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use async_snmp_trap::{TrapListener, TrapPacket};
//! use std::net::SocketAddr;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> async_snmp_trap::Result<()> {
//!     let listener = TrapListener::builder()
//!         .handler(|packet: TrapPacket, source: SocketAddr| {
//!             if let Some(trap) = packet.trap_oid() {
//!                 println!("{source} sent {trap}");
//!             }
//!         })
//!         .build();
//!
//!     // Runs until the process exits
//!     listener.listen("0.0.0.0:162").await
//! }
//! ```
//!
//! Without a handler the listener logs one line per trap through `tracing`
//! ([`LoggingHandler`]).
//!
//! ## Tracing
//!
//! The crate emits [`tracing`] events and installs no subscriber. Events use
//! these fields:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `snmp.local_addr` | Address the listener is bound to |
//! | `snmp.source` | Sender of a datagram |
//! | `snmp.bytes` | Datagram length |
//! | `snmp.varbind_count` | Number of varbinds in a handled packet |
//! | `snmp.consecutive_errors` | Read errors in a row |
//! | `snmp.dropped` | Packets dropped because the dispatch queue was full |
//!
//! Read errors are logged at `error`, decode errors and queue overflow at
//! `warn`, listener start/stop and the default handler at `info`, individual
//! datagrams at `trace`.

pub mod ber;
pub mod decoder;
pub mod error;
pub mod listener;
pub mod notification;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use decoder::{BerTrapDecoder, TrapDecoder};
pub use error::{DecodeErrorKind, Error, OidErrorKind, Result};
pub use listener::{
    BoundTrapListener, DecodeFailurePolicy, DispatchMode, ListenerConfig, LoggingHandler,
    ReadErrorPolicy, TrapHandler, TrapListener, TrapListenerBuilder,
};
pub use notification::TrapPacket;
pub use oid::Oid;
pub use pdu::{GenericTrap, PduType, TrapV1Pdu};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
