//! BER decoding.
//!
//! [`Decoder`] is a cursor over a shared [`Bytes`] buffer. Reading a constructed
//! type returns a child decoder over its contents without copying. Every error
//! carries the absolute offset of the offending element within the original
//! datagram.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// Cursor-based BER decoder.
#[derive(Debug, Clone)]
pub struct Decoder {
    data: Bytes,
    pos: usize,
    /// Absolute offset of `data[0]` within the outermost buffer.
    base: usize,
}

impl Decoder {
    /// Create a decoder over the given bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /// Create a decoder by copying a byte slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Absolute offset of the next byte to be read.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn error(&self, kind: DecodeErrorKind) -> Error {
        Error::decode(self.offset(), kind)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        let tag = self
            .peek_tag()
            .ok_or_else(|| self.error(DecodeErrorKind::TruncatedData))?;
        self.pos += 1;
        Ok(tag)
    }

    /// Read a length and check it fits in the remaining data.
    pub fn read_length(&mut self) -> Result<usize> {
        let start = self.offset();
        let (len, consumed) = decode_length(&self.data[self.pos..], start)?;
        self.pos += consumed;
        if len > self.remaining() {
            return Err(Error::decode(start, DecodeErrorKind::TlvOverflow));
        }
        Ok(len)
    }

    /// Read a complete TLV, returning its tag, content and the content offset.
    fn read_tlv(&mut self) -> Result<(u8, Bytes, usize)> {
        let tag = self.read_tag()?;
        let len = self.read_length()?;
        let content_offset = self.offset();
        let content = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok((tag, content, content_offset))
    }

    /// Read a TLV and require a specific tag.
    fn expect_tlv(&mut self, expected: u8) -> Result<(Bytes, usize)> {
        let tag_offset = self.offset();
        let actual = self
            .peek_tag()
            .ok_or_else(|| self.error(DecodeErrorKind::TruncatedData))?;
        if actual != expected {
            return Err(Error::decode(
                tag_offset,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        let (_, content, content_offset) = self.read_tlv()?;
        Ok((content, content_offset))
    }

    /// Read a constructed element with the given tag, returning a decoder over its contents.
    pub fn read_constructed(&mut self, expected: u8) -> Result<Decoder> {
        let (content, content_offset) = self.expect_tlv(expected)?;
        Ok(Decoder {
            data: content,
            pos: 0,
            base: content_offset,
        })
    }

    /// Read a SEQUENCE, returning a decoder over its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read an INTEGER as i32.
    pub fn read_integer(&mut self) -> Result<i32> {
        let (content, offset) = self.expect_tlv(tag::universal::INTEGER)?;
        decode_integer(&content, offset)
    }

    /// Read an unsigned 32-bit application type (Counter32, Gauge32, TimeTicks).
    pub fn read_unsigned32(&mut self, expected: u8) -> Result<u32> {
        let (content, offset) = self.expect_tlv(expected)?;
        decode_unsigned32(&content, offset)
    }

    /// Read a Counter64.
    pub fn read_integer64(&mut self) -> Result<u64> {
        let (content, offset) = self.expect_tlv(tag::application::COUNTER64)?;
        decode_unsigned64(&content, offset)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        if self.peek_tag() == Some(tag::universal::OCTET_STRING_CONSTRUCTED) {
            return Err(self.error(DecodeErrorKind::ConstructedOctetString));
        }
        let (content, _) = self.expect_tlv(tag::universal::OCTET_STRING)?;
        Ok(content)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let (content, offset) = self.expect_tlv(tag::universal::NULL)?;
        if !content.is_empty() {
            return Err(Error::decode(offset, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let (content, offset) = self.expect_tlv(tag::universal::OBJECT_IDENTIFIER)?;
        Oid::from_ber(&content).map_err(|e| match e {
            Error::Decode { offset: rel, kind } => Error::decode(offset + rel, kind),
            other => other,
        })
    }

    /// Read an IpAddress.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let (content, offset) = self.expect_tlv(tag::application::IP_ADDRESS)?;
        ip_address_from(&content, offset)
    }

    /// Read any TLV, returning its tag, content and the offset of the content.
    ///
    /// Used by value decoding, which dispatches on the tag itself.
    pub fn read_any(&mut self) -> Result<(u8, Bytes, usize)> {
        self.read_tlv()
    }
}

/// Decode a signed INTEGER content (two's complement, big-endian).
pub(crate) fn decode_integer(content: &[u8], offset: usize) -> Result<i32> {
    if content.is_empty() {
        return Err(Error::decode(offset, DecodeErrorKind::ZeroLengthInteger));
    }
    if content.len() > 4 {
        return Err(Error::decode(offset, DecodeErrorKind::IntegerOverflow));
    }
    let mut value: i32 = if content[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in content {
        value = (value << 8) | b as i32;
    }
    Ok(value)
}

/// Decode an unsigned 32-bit content.
///
/// A leading 0x00 pad octet is allowed. Values that are sign-extended
/// negatives are reinterpreted as u32, matching net-snmp's leniency.
pub(crate) fn decode_unsigned32(content: &[u8], offset: usize) -> Result<u32> {
    if content.is_empty() {
        return Err(Error::decode(offset, DecodeErrorKind::ZeroLengthInteger));
    }
    let digits = match content {
        [0, rest @ ..] if content.len() == 5 => rest,
        _ if content.len() > 4 => {
            return Err(Error::decode(offset, DecodeErrorKind::IntegerOverflow));
        }
        _ => content,
    };
    if digits.len() < content.len() {
        // Stripped pad octet: value is non-negative by construction
        return Ok(digits.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32));
    }
    decode_integer(digits, offset).map(|v| v as u32)
}

/// Decode an unsigned 64-bit content (Counter64).
pub(crate) fn decode_unsigned64(content: &[u8], offset: usize) -> Result<u64> {
    if content.is_empty() {
        return Err(Error::decode(offset, DecodeErrorKind::ZeroLengthInteger));
    }
    let digits = match content {
        [0, rest @ ..] if content.len() == 9 => rest,
        _ if content.len() > 8 => {
            return Err(Error::decode(
                offset,
                DecodeErrorKind::Integer64TooLong {
                    length: content.len(),
                },
            ));
        }
        _ => content,
    };
    Ok(digits.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

/// Convert IpAddress content to octets.
pub(crate) fn ip_address_from(content: &[u8], offset: usize) -> Result<[u8; 4]> {
    content.try_into().map_err(|_| {
        Error::decode(
            offset,
            DecodeErrorKind::InvalidIpAddressLength {
                length: content.len(),
            },
        )
    })
}
