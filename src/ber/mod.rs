//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! This is the subset of X.690 needed to take a notification datagram apart:
//! a permissive cursor-based reader ([`Decoder`]) and a reverse-buffer writer
//! ([`EncodeBuf`]) used to build datagrams for tests and tooling.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;

pub(crate) use decode::{decode_integer, decode_unsigned32, decode_unsigned64, ip_address_from};
