//! SNMP value types.
//!
//! Covers the SMIv2 base types (RFC 2578), the three exception values a
//! varbind can carry (RFC 3416), and an `Unknown` variant so that an
//! unrecognised tag never fails the whole notification.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER (Integer32)
    Integer(i32),
    /// OCTET STRING
    OctetString(Bytes),
    /// NULL
    Null,
    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),
    /// IpAddress
    IpAddress([u8; 4]),
    /// Counter32
    Counter32(u32),
    /// Gauge32 / Unsigned32
    Gauge32(u32),
    /// TimeTicks (hundredths of a second)
    TimeTicks(u32),
    /// Opaque
    Opaque(Bytes),
    /// Counter64
    Counter64(u64),
    /// noSuchObject exception
    NoSuchObject,
    /// noSuchInstance exception
    NoSuchInstance,
    /// endOfMibView exception
    EndOfMibView,
    /// Any other tag, kept as raw content.
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// Whether this is one of the exception values.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Get as i32 if this is an Integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as u32 for the unsigned 32-bit types.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) if *v >= 0 => Some(*v as u32),
            _ => None,
        }
    }

    /// Get as u64 for any unsigned integer type.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            other => other.as_u32().map(u64::from),
        }
    }

    /// Get the raw bytes of an OctetString or Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) | Value::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// Get an OctetString as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Get as OID if this is an ObjectIdentifier.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Decode a value from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let (tag, content, offset) = decoder.read_any()?;
        let value = match tag {
            tag::universal::INTEGER => {
                Value::Integer(crate::ber::decode_integer(&content, offset)?)
            }
            tag::universal::OCTET_STRING => Value::OctetString(content),
            tag::universal::OCTET_STRING_CONSTRUCTED => {
                return Err(Error::decode(
                    offset,
                    DecodeErrorKind::ConstructedOctetString,
                ));
            }
            tag::universal::NULL => {
                if !content.is_empty() {
                    return Err(Error::decode(offset, DecodeErrorKind::InvalidNull));
                }
                Value::Null
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Value::ObjectIdentifier(Oid::from_ber(&content).map_err(|e| match e {
                    Error::Decode { offset: rel, kind } => Error::decode(offset + rel, kind),
                    other => other,
                })?)
            }
            tag::application::IP_ADDRESS => {
                Value::IpAddress(crate::ber::ip_address_from(&content, offset)?)
            }
            tag::application::COUNTER32 => {
                Value::Counter32(crate::ber::decode_unsigned32(&content, offset)?)
            }
            tag::application::GAUGE32 => {
                Value::Gauge32(crate::ber::decode_unsigned32(&content, offset)?)
            }
            tag::application::TIMETICKS => {
                Value::TimeTicks(crate::ber::decode_unsigned32(&content, offset)?)
            }
            tag::application::OPAQUE => Value::Opaque(content),
            tag::application::COUNTER64 => {
                Value::Counter64(crate::ber::decode_unsigned64(&content, offset)?)
            }
            tag::context::NO_SUCH_OBJECT => Value::NoSuchObject,
            tag::context::NO_SUCH_INSTANCE => Value::NoSuchInstance,
            tag::context::END_OF_MIB_VIEW => Value::EndOfMibView,
            other => Value::Unknown {
                tag: other,
                data: content,
            },
        };
        Ok(value)
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(b) => buf.push_octet_string(b),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(b) => {
                buf.push_bytes(b);
                buf.push_length(b.len());
                buf.push_tag(tag::application::OPAQUE);
            }
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::NoSuchObject => {
                buf.push_length(0);
                buf.push_tag(tag::context::NO_SUCH_OBJECT);
            }
            Value::NoSuchInstance => {
                buf.push_length(0);
                buf.push_tag(tag::context::NO_SUCH_INSTANCE);
            }
            Value::EndOfMibView => {
                buf.push_length(0);
                buf.push_tag(tag::context::END_OF_MIB_VIEW);
            }
            Value::Unknown { tag, data } => {
                buf.push_bytes(data);
                buf.push_length(data.len());
                buf.push_tag(*tag);
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(b) => match std::str::from_utf8(b) {
                Ok(s) if s.chars().all(|c| !c.is_control() || c.is_whitespace()) => {
                    write!(f, "\"{}\"", s)
                }
                _ => write_hex(f, b),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(a) => write!(f, "{}.{}.{}.{}", a[0], a[1], a[2], a[3]),
            Value::Counter32(v) => write!(f, "Counter32: {}", v),
            Value::Gauge32(v) => write!(f, "Gauge32: {}", v),
            Value::TimeTicks(v) => write!(f, "Timeticks: ({}) {}", v, format_timeticks(*v)),
            Value::Opaque(b) => {
                write!(f, "Opaque: ")?;
                write_hex(f, b)
            }
            Value::Counter64(v) => write!(f, "Counter64: {}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
            Value::Unknown { tag, data } => {
                write!(f, "Unknown(0x{:02X}): ", tag)?;
                write_hex(f, data)
            }
        }
    }
}

fn write_hex(f: &mut std::fmt::Formatter<'_>, data: &[u8]) -> std::fmt::Result {
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{:02X}", b)?;
    }
    Ok(())
}

/// Format TimeTicks as `d:hh:mm:ss.cc`.
pub fn format_timeticks(ticks: u32) -> String {
    let centis = ticks % 100;
    let total_secs = ticks / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = (total_secs / 3600) % 24;
    let days = total_secs / 86400;
    format!("{}:{:02}:{:02}:{:02}.{:02}", days, hours, mins, secs, centis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn decode(bytes: &'static [u8]) -> Result<Value> {
        Value::decode(&mut Decoder::new(Bytes::from_static(bytes)))
    }

    #[test]
    fn test_decode_application_types() {
        assert_eq!(decode(&[0x41, 0x01, 0x05]).unwrap(), Value::Counter32(5));
        assert_eq!(decode(&[0x42, 0x01, 0x07]).unwrap(), Value::Gauge32(7));
        assert_eq!(
            decode(&[0x43, 0x02, 0x30, 0x39]).unwrap(),
            Value::TimeTicks(12345)
        );
        assert_eq!(
            decode(&[0x40, 0x04, 192, 168, 0, 1]).unwrap(),
            Value::IpAddress([192, 168, 0, 1])
        );
        assert_eq!(
            decode(&[0x46, 0x01, 0x2A]).unwrap(),
            Value::Counter64(42)
        );
    }

    #[test]
    fn test_decode_exceptions() {
        assert_eq!(decode(&[0x80, 0x00]).unwrap(), Value::NoSuchObject);
        assert_eq!(decode(&[0x81, 0x00]).unwrap(), Value::NoSuchInstance);
        assert!(decode(&[0x82, 0x00]).unwrap().is_exception());
    }

    #[test]
    fn test_decode_unknown_tag_is_kept() {
        let value = decode(&[0x47, 0x02, 0xAB, 0xCD]).unwrap();
        assert_eq!(
            value,
            Value::Unknown {
                tag: 0x47,
                data: Bytes::from_static(&[0xAB, 0xCD])
            }
        );
    }

    #[test]
    fn test_decode_oid_value() {
        let value = decode(&[0x06, 0x03, 0x2B, 0x06, 0x01]).unwrap();
        assert_eq!(value.as_oid(), Some(&oid!(1, 3, 6, 1)));
    }

    #[test]
    fn test_decode_constructed_octet_string_rejected() {
        let err = decode(&[0x24, 0x00]).unwrap_err();
        assert_eq!(
            err.decode_kind(),
            Some(DecodeErrorKind::ConstructedOctetString)
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Integer(-3).as_i32(), Some(-3));
        assert_eq!(Value::Integer(-3).as_u32(), None);
        assert_eq!(Value::TimeTicks(9).as_u64(), Some(9));
        assert_eq!(
            Value::OctetString(Bytes::from_static(b"up")).as_str(),
            Some("up")
        );
        assert_eq!(Value::Null.as_bytes(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(
            Value::OctetString(Bytes::from_static(b"link down")).to_string(),
            "\"link down\""
        );
        assert_eq!(
            Value::OctetString(Bytes::from_static(&[0x00, 0xFF])).to_string(),
            "00 FF"
        );
        assert_eq!(
            Value::TimeTicks(8_640_123).to_string(),
            "Timeticks: (8640123) 1:00:00:01.23"
        );
        assert_eq!(Value::IpAddress([10, 1, 2, 3]).to_string(), "10.1.2.3");
    }

    #[test]
    fn test_format_timeticks() {
        assert_eq!(format_timeticks(0), "0:00:00:00.00");
        assert_eq!(format_timeticks(360_000), "0:01:00:00.00");
    }
}
