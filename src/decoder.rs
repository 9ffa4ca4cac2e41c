//! The decoder boundary between raw datagrams and [`TrapPacket`]s.
//!
//! The listener never looks inside a datagram itself. It hands the received
//! bytes to a [`TrapDecoder`] and forwards whatever packet comes back. A decoder
//! must therefore always produce a usable packet, even when it also reports an
//! error: the packet is dispatched to the handler regardless (unless the
//! listener is configured with [`DecodeFailurePolicy::Suppress`]).
//!
//! [`BerTrapDecoder`] is the default implementation. Custom decoders can be
//! plugged in through [`TrapListenerBuilder::decoder`], either as a type
//! implementing the trait or as a plain function:
//!
//! ```rust
//! use async_snmp_trap::{Error, TrapListener, TrapPacket};
//!
//! fn raw_only(data: &[u8]) -> (TrapPacket, Option<Error>) {
//!     let mut packet = TrapPacket::default();
//!     packet.community = bytes::Bytes::copy_from_slice(data);
//!     (packet, None)
//! }
//!
//! let listener = TrapListener::builder().decoder(raw_only).build();
//! ```
//!
//! [`DecodeFailurePolicy::Suppress`]: crate::DecodeFailurePolicy::Suppress
//! [`TrapListenerBuilder::decoder`]: crate::TrapListenerBuilder::decoder

use bytes::Bytes;

use crate::ber::{Decoder, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::notification::TrapPacket;
use crate::pdu::{PduType, TrapV1Pdu};
use crate::varbind::decode_varbind_list_into;
use crate::version::Version;

/// Converts a datagram into a notification packet.
///
/// Implementations must be cheap to call from the receive loop and must not
/// block: they run on the listener's task, between two socket reads.
pub trait TrapDecoder: Send + Sync + 'static {
    /// Decode one datagram.
    ///
    /// Always returns a packet. The error, if any, describes why the packet is
    /// partial or empty.
    fn decode(&self, data: &[u8]) -> (TrapPacket, Option<Error>);
}

impl<F> TrapDecoder for F
where
    F: Fn(&[u8]) -> (TrapPacket, Option<Error>) + Send + Sync + 'static,
{
    fn decode(&self, data: &[u8]) -> (TrapPacket, Option<Error>) {
        self(data)
    }
}

/// BER decoder for SNMPv1 and SNMPv2c messages.
///
/// Fields are written into the packet as they are decoded, so a failure part
/// way through leaves everything that preceded it in place (version, community,
/// PDU type, leading varbinds). SNMPv3 messages are recognised but not
/// processed: the packet carries `version = V3` and the error is
/// [`DecodeErrorKind::UnsupportedVersion`]. Bytes following the message are
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BerTrapDecoder;

impl BerTrapDecoder {
    /// Create the decoder.
    pub fn new() -> Self {
        Self
    }

    fn decode_into(packet: &mut TrapPacket, data: Bytes) -> Result<()> {
        if data.is_empty() {
            return Err(Error::decode(0, DecodeErrorKind::EmptyMessage));
        }

        let mut decoder = Decoder::new(data);
        let mut msg = decoder.read_sequence()?;

        let version_offset = msg.offset();
        let raw_version = msg.read_integer()?;
        let version = Version::from_i32(raw_version).ok_or_else(|| {
            Error::decode(version_offset, DecodeErrorKind::UnknownVersion(raw_version))
        })?;
        packet.version = Some(version);

        if !version.is_community_based() {
            return Err(Error::decode(
                version_offset,
                DecodeErrorKind::UnsupportedVersion(raw_version),
            ));
        }

        packet.community = msg.read_octet_string()?;

        let pdu_offset = msg.offset();
        let pdu_tag = msg
            .peek_tag()
            .ok_or_else(|| Error::decode(pdu_offset, DecodeErrorKind::MissingPdu))?;
        let pdu_type = PduType::from_tag(pdu_tag)
            .ok_or_else(|| Error::decode(pdu_offset, DecodeErrorKind::UnknownPduType(pdu_tag)))?;
        packet.pdu_type = Some(pdu_type);

        let mut body = msg.read_constructed(pdu_tag)?;
        if pdu_type == PduType::TrapV1 {
            packet.v1 = Some(TrapV1Pdu::decode_header(&mut body)?);
        } else {
            packet.request_id = body.read_integer()?;
            // error-status and error-index carry nothing for a notification
            body.read_integer()?;
            body.read_integer()?;
        }

        decode_varbind_list_into(&mut body, &mut packet.varbinds)
    }
}

impl TrapDecoder for BerTrapDecoder {
    fn decode(&self, data: &[u8]) -> (TrapPacket, Option<Error>) {
        let mut packet = TrapPacket::default();
        let result = Self::decode_into(&mut packet, Bytes::copy_from_slice(data));
        (packet, result.err())
    }
}

/// Whether the first byte of a datagram looks like an SNMP message.
///
/// Cheap pre-filter for callers that share a port with other traffic.
pub fn looks_like_snmp(data: &[u8]) -> bool {
    data.first() == Some(&tag::universal::SEQUENCE)
}
