//! Tag octets used in SNMP messages.
//!
//! Every tag SNMP uses fits in a single identifier octet (X.690 8.1.2), so
//! tags are plain `u8` constants.

/// Context-specific class bits.
const CONTEXT_SPECIFIC: u8 = 0x80;
/// Constructed bit.
const CONSTRUCTED: u8 = 0x20;

pub mod universal {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    /// Constructed OCTET STRING. Rejected by the decoder.
    pub const OCTET_STRING_CONSTRUCTED: u8 = 0x24;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
}

/// SMIv2 application types (RFC 2578).
pub mod application {
    pub const IP_ADDRESS: u8 = 0x40;
    pub const COUNTER32: u8 = 0x41;
    /// Gauge32 and Unsigned32 share a tag.
    pub const GAUGE32: u8 = 0x42;
    pub const TIMETICKS: u8 = 0x43;
    pub const OPAQUE: u8 = 0x44;
    pub const COUNTER64: u8 = 0x46;
}

/// Varbind exception values (RFC 3416). Agents should never put these in a
/// notification, but they decode.
pub mod context {
    pub const NO_SUCH_OBJECT: u8 = 0x80;
    pub const NO_SUCH_INSTANCE: u8 = 0x81;
    pub const END_OF_MIB_VIEW: u8 = 0x82;
}

/// PDU tags, 0xA0 through 0xA8.
///
/// A trap port normally only sees [`TRAP_V1`](pdu::TRAP_V1),
/// [`TRAP_V2`](pdu::TRAP_V2) and [`INFORM_REQUEST`](pdu::INFORM_REQUEST).
pub mod pdu {
    const BASE: u8 = super::CONTEXT_SPECIFIC | super::CONSTRUCTED;

    pub const GET_REQUEST: u8 = BASE;
    pub const GET_NEXT_REQUEST: u8 = BASE | 0x01;
    pub const RESPONSE: u8 = BASE | 0x02;
    pub const SET_REQUEST: u8 = BASE | 0x03;
    pub const TRAP_V1: u8 = BASE | 0x04;
    pub const GET_BULK_REQUEST: u8 = BASE | 0x05;
    pub const INFORM_REQUEST: u8 = BASE | 0x06;
    pub const TRAP_V2: u8 = BASE | 0x07;
    pub const REPORT: u8 = BASE | 0x08;
}
