//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use async_snmp_trap::prelude::*;
//! ```
//!
//! This imports:
//! - Listener types: [`TrapListener`], [`TrapHandler`], [`TrapPacket`]
//! - Core types: [`Oid`], [`Value`], [`VarBind`], [`Version`]
//! - Error handling: [`Error`], [`Result`]
//! - [`CancellationToken`] for stopping a listener
//! - The [`oid!`] macro for OID construction

pub use crate::error::{Error, Result};
pub use crate::listener::{ListenerConfig, TrapHandler, TrapListener};
pub use crate::notification::TrapPacket;
pub use crate::oid::Oid;
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;
pub use tokio_util::sync::CancellationToken;

#[doc(no_inline)]
pub use crate::oid;
