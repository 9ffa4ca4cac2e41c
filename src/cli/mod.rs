//! CLI utilities for async-snmp-trap.
//!
//! This module provides command-line argument parsing and trap output
//! formatting for the `asnmp-trapd` daemon.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod output;
