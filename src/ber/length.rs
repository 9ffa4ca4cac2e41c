//! BER length encoding (X.690 Section 8.1.3).
//!
//! Only the definite form is accepted. Long-form lengths are limited to four
//! subsequent octets, which is far beyond any UDP datagram.

use crate::error::{DecodeErrorKind, Error, Result};

/// Maximum number of subsequent octets in a long-form length.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a length for the reverse encode buffer.
///
/// Returns the bytes in reverse order (ready to be pushed onto an
/// [`EncodeBuf`](super::EncodeBuf)) and the number of valid bytes.
pub fn encode_length(len: usize) -> ([u8; 9], usize) {
    let mut out = [0u8; 9];
    if len < 0x80 {
        out[0] = len as u8;
        return (out, 1);
    }

    let mut count = 0;
    let mut remaining = len;
    while remaining > 0 {
        out[count] = (remaining & 0xFF) as u8;
        remaining >>= 8;
        count += 1;
    }
    out[count] = 0x80 | count as u8;
    (out, count + 1)
}

/// Decode a length starting at the beginning of `data`.
///
/// `offset` is the absolute position of `data[0]`, used for error reporting.
/// Returns the decoded length and the number of octets consumed.
pub fn decode_length(data: &[u8], offset: usize) -> Result<(usize, usize)> {
    let first = *data
        .first()
        .ok_or_else(|| Error::decode(offset, DecodeErrorKind::TruncatedData))?;

    if first < 0x80 {
        return Ok((first as usize, 1));
    }

    if first == 0x80 {
        return Err(Error::decode(offset, DecodeErrorKind::IndefiniteLength));
    }

    let octets = (first & 0x7F) as usize;
    if octets > MAX_LENGTH_OCTETS {
        return Err(Error::decode(
            offset,
            DecodeErrorKind::LengthTooLong { octets },
        ));
    }

    let bytes = data
        .get(1..=octets)
        .ok_or_else(|| Error::decode(offset, DecodeErrorKind::TruncatedData))?;

    let len = bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    Ok((len, octets + 1))
}
