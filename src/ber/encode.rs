//! BER encoding.
//!
//! The listener never encodes on the wire. [`TrapPacket::encode`](crate::TrapPacket::encode),
//! the integration tests and the fuzz targets use this to build datagrams.
//!
//! [`EncodeBuf`] fills its buffer back to front, so a constructed value's
//! length is known by the time its header is written. Callers push the
//! children of a SEQUENCE last-first.

use super::length::encode_length;
use super::tag;
use bytes::Bytes;

/// Reverse-order BER writer.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(512),
        }
    }

    /// Prepend raw content bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Prepend a length header.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..count]);
    }

    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write the contents with `f`, then wrap them in `tag` and a length.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let before = self.len();
        f(self);
        let content_len = self.len() - before;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    fn push_primitive(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    pub fn push_integer(&mut self, value: i32) {
        let bytes = value.to_be_bytes();
        self.push_primitive(tag::universal::INTEGER, minimal_signed(&bytes));
    }

    /// Counter64.
    pub fn push_integer64(&mut self, value: u64) {
        let bytes = widen(&value.to_be_bytes());
        self.push_primitive(tag::application::COUNTER64, minimal_signed(&bytes));
    }

    /// An unsigned 32-bit application type (Counter32, Gauge32, TimeTicks, ...).
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        let bytes = widen(&value.to_be_bytes());
        self.push_primitive(tag, minimal_signed(&bytes));
    }

    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_primitive(tag::universal::OCTET_STRING, data);
    }

    pub fn push_null(&mut self) {
        self.push_primitive(tag::universal::NULL, &[]);
    }

    pub fn push_oid(&mut self, oid: &crate::oid::Oid) {
        let ber = oid.to_ber_smallvec();
        self.push_primitive(tag::universal::OBJECT_IDENTIFIER, &ber);
    }

    /// IpAddress, always four octets.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_primitive(tag::application::IP_ADDRESS, &addr);
    }

    /// Write the community-based envelope around a PDU written by `f`.
    ///
    /// `SEQUENCE { INTEGER version, OCTET STRING community, PDU }`
    pub fn push_community_message<F>(&mut self, version: i32, community: &[u8], f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_sequence(|buf| {
            f(buf);
            buf.push_octet_string(community);
            buf.push_integer(version);
        });
    }

    /// Consume the writer and return the encoding in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Big-endian bytes of an unsigned value with a 0x00 sign octet in front.
fn widen(bytes: &[u8]) -> smallvec::SmallVec<[u8; 9]> {
    let mut out = smallvec::SmallVec::new();
    out.push(0);
    out.extend_from_slice(bytes);
    out
}

/// Strip redundant leading octets from a two's complement big-endian value.
///
/// An octet is redundant when it is all zeros or all ones and the next
/// octet's top bit repeats it.
fn minimal_signed(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xFF => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    &bytes[start..]
}
