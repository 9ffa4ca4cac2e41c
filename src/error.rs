//! Error types for async-snmp-trap.
//!
//! Only setup failures ([`Error::AddressResolution`], [`Error::Bind`]) and an
//! exhausted read-error budget ([`Error::ReadFailed`]) are ever returned from the
//! listener. Errors raised while receiving or decoding an individual datagram are
//! reported through `tracing` and never stop the receive loop.

use std::net::SocketAddr;

pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while taking a datagram apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    // Framing
    EmptyMessage,
    TruncatedData,
    IndefiniteLength,
    /// Long-form length with more subsequent octets than supported.
    LengthTooLong { octets: usize },
    /// A TLV's declared length runs past its enclosing value.
    TlvOverflow,
    UnexpectedTag { expected: u8, actual: u8 },

    // Primitive contents
    ZeroLengthInteger,
    IntegerOverflow,
    Integer64TooLong { length: usize },
    InvalidNull,
    InvalidIpAddressLength { length: usize },
    InvalidOidEncoding,
    OidTooLong { count: usize, max: usize },
    ConstructedOctetString,

    // Message structure
    UnknownVersion(i32),
    /// A recognised version this crate cannot process (SNMPv3).
    UnsupportedVersion(i32),
    MissingPdu,
    UnknownPduType(u8),
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => f.write_str("empty datagram"),
            Self::TruncatedData => f.write_str("data ends mid-value"),
            Self::IndefiniteLength => f.write_str("indefinite length is not allowed"),
            Self::LengthTooLong { octets } => write!(f, "{octets}-octet length field"),
            Self::TlvOverflow => f.write_str("value runs past its container"),
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "tag 0x{actual:02X} where 0x{expected:02X} was expected")
            }
            Self::ZeroLengthInteger => f.write_str("integer with no content octets"),
            Self::IntegerOverflow => f.write_str("integer does not fit in 32 bits"),
            Self::Integer64TooLong { length } => {
                write!(f, "{length}-octet Counter64")
            }
            Self::InvalidNull => f.write_str("NULL with content"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "{length}-octet IpAddress")
            }
            Self::InvalidOidEncoding => f.write_str("malformed OBJECT IDENTIFIER"),
            Self::OidTooLong { count, max } => {
                write!(f, "OBJECT IDENTIFIER with {count} arcs (limit {max})")
            }
            Self::ConstructedOctetString => f.write_str("constructed OCTET STRING"),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version {v}"),
            Self::UnsupportedVersion(v) => {
                write!(f, "SNMP version {v} is not supported (no USM)")
            }
            Self::MissingPdu => f.write_str("message has no PDU"),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type 0x{t:02X}"),
        }
    }
}

/// Why an OID was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OidErrorKind {
    Empty,
    /// An arc that is not a decimal u32.
    InvalidArc,
    InvalidFirstArc(u32),
    /// Under first arc 0 or 1 the second arc must be below 40.
    InvalidSecondArc { first: u32, second: u32 },
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("no arcs"),
            Self::InvalidArc => f.write_str("arc is not a 32-bit number"),
            Self::InvalidFirstArc(v) => write!(f, "first arc {v} is not 0, 1 or 2"),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {second} is out of range under {first}")
            }
            Self::TooManyArcs { count, max } => write!(f, "{count} arcs (limit {max})"),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The listen address could not be resolved to a UDP endpoint.
    #[error("cannot resolve listen address {input:?}: {source}")]
    AddressResolution {
        input: Box<str>,
        #[source]
        source: std::io::Error,
    },

    /// The UDP socket could not be created or bound.
    #[error("cannot bind trap listener to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// I/O error on an already bound socket.
    #[error("I/O error{}: {source}", target.map(|t| format!(" on {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// The receive loop gave up after too many consecutive read errors.
    #[error("receive failed {consecutive} consecutive times on {local_addr}: {source}")]
    ReadFailed {
        local_addr: SocketAddr,
        consecutive: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        /// The text that failed to parse, when there was any.
        input: Option<Box<str>>,
    },

    /// Malformed datagram. `offset` is relative to the start of the datagram.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },
}

impl Error {
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Get the decode error kind, if this is a decode error.
    pub fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            Self::Decode { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this error happened before the receive loop started.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::AddressResolution { .. } | Self::Bind { .. })
    }
}
