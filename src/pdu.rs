//! SNMP PDU types.
//!
//! Two PDU layouts can arrive on a trap port: the SNMPv1 Trap-PDU
//! ([`TrapV1Pdu`], RFC 1157 section 4.1.6) and the common layout shared by
//! every other PDU ([`Pdu`], RFC 3416 section 3), which includes SNMPv2-Trap
//! and InformRequest.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::Result;
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list_into, encode_varbind_list};

/// PDU type, identified by its context-specific constructed tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduType {
    GetRequest,
    GetNextRequest,
    Response,
    SetRequest,
    TrapV1,
    GetBulkRequest,
    InformRequest,
    TrapV2,
    Report,
}

impl PduType {
    /// Map a BER tag to a PDU type.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::TRAP_V1 => Some(Self::TrapV1),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            tag::pdu::INFORM_REQUEST => Some(Self::InformRequest),
            tag::pdu::TRAP_V2 => Some(Self::TrapV2),
            tag::pdu::REPORT => Some(Self::Report),
            _ => None,
        }
    }

    /// The BER tag of this PDU type.
    pub const fn tag(self) -> u8 {
        match self {
            Self::GetRequest => tag::pdu::GET_REQUEST,
            Self::GetNextRequest => tag::pdu::GET_NEXT_REQUEST,
            Self::Response => tag::pdu::RESPONSE,
            Self::SetRequest => tag::pdu::SET_REQUEST,
            Self::TrapV1 => tag::pdu::TRAP_V1,
            Self::GetBulkRequest => tag::pdu::GET_BULK_REQUEST,
            Self::InformRequest => tag::pdu::INFORM_REQUEST,
            Self::TrapV2 => tag::pdu::TRAP_V2,
            Self::Report => tag::pdu::REPORT,
        }
    }

    /// Whether this PDU type is a notification (trap or inform).
    pub const fn is_notification(self) -> bool {
        matches!(self, Self::TrapV1 | Self::TrapV2 | Self::InformRequest)
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GetRequest => "GetRequest",
            Self::GetNextRequest => "GetNextRequest",
            Self::Response => "Response",
            Self::SetRequest => "SetRequest",
            Self::TrapV1 => "Trap",
            Self::GetBulkRequest => "GetBulkRequest",
            Self::InformRequest => "InformRequest",
            Self::TrapV2 => "SNMPv2-Trap",
            Self::Report => "Report",
        };
        f.write_str(name)
    }
}

/// Generic trap codes of SNMPv1 (RFC 1157).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericTrap {
    ColdStart,
    WarmStart,
    LinkDown,
    LinkUp,
    AuthenticationFailure,
    EgpNeighborLoss,
    EnterpriseSpecific,
}

impl GenericTrap {
    /// Create from the wire value.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::ColdStart),
            1 => Some(Self::WarmStart),
            2 => Some(Self::LinkDown),
            3 => Some(Self::LinkUp),
            4 => Some(Self::AuthenticationFailure),
            5 => Some(Self::EgpNeighborLoss),
            6 => Some(Self::EnterpriseSpecific),
            _ => None,
        }
    }

    /// The wire value.
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::ColdStart => 0,
            Self::WarmStart => 1,
            Self::LinkDown => 2,
            Self::LinkUp => 3,
            Self::AuthenticationFailure => 4,
            Self::EgpNeighborLoss => 5,
            Self::EnterpriseSpecific => 6,
        }
    }
}

impl std::fmt::Display for GenericTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ColdStart => "coldStart",
            Self::WarmStart => "warmStart",
            Self::LinkDown => "linkDown",
            Self::LinkUp => "linkUp",
            Self::AuthenticationFailure => "authenticationFailure",
            Self::EgpNeighborLoss => "egpNeighborLoss",
            Self::EnterpriseSpecific => "enterpriseSpecific",
        };
        f.write_str(name)
    }
}

/// SNMPv1 Trap-PDU header fields.
///
/// The varbinds of a v1 trap live on the packet alongside those of other PDUs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapV1Pdu {
    /// Type of object generating the trap (sysObjectID).
    pub enterprise: Oid,
    /// Address of the object generating the trap.
    pub agent_addr: [u8; 4],
    /// Generic trap code (0-6).
    pub generic_trap: i32,
    /// Specific trap code, meaningful when generic is enterpriseSpecific.
    pub specific_trap: i32,
    /// sysUpTime of the agent when the trap was generated.
    pub time_stamp: u32,
}

impl TrapV1Pdu {
    /// The generic trap code as an enum, if it is one of the seven defined codes.
    pub fn generic(&self) -> Option<GenericTrap> {
        GenericTrap::from_i32(self.generic_trap)
    }

    /// Decode the header fields from the contents of a Trap-PDU.
    ///
    /// The decoder is left positioned at the varbind list.
    pub fn decode_header(pdu: &mut Decoder) -> Result<Self> {
        let enterprise = pdu.read_oid()?;
        let agent_addr = pdu.read_ip_address()?;
        let generic_trap = pdu.read_integer()?;
        let specific_trap = pdu.read_integer()?;
        let time_stamp = pdu.read_unsigned32(tag::application::TIMETICKS)?;
        Ok(Self {
            enterprise,
            agent_addr,
            generic_trap,
            specific_trap,
            time_stamp,
        })
    }

    /// Encode a complete Trap-PDU with the given varbinds.
    pub fn encode(&self, buf: &mut EncodeBuf, varbinds: &[VarBind]) {
        buf.push_constructed(tag::pdu::TRAP_V1, |buf| {
            encode_varbind_list(buf, varbinds);
            buf.push_unsigned32(tag::application::TIMETICKS, self.time_stamp);
            buf.push_integer(self.specific_trap);
            buf.push_integer(self.generic_trap);
            buf.push_ip_address(self.agent_addr);
            buf.push_oid(&self.enterprise);
        });
    }
}

/// A PDU in the common RFC 3416 layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    /// error-status (non-repeaters for GetBulkRequest).
    pub error_status: i32,
    /// error-index (max-repetitions for GetBulkRequest).
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Create a notification PDU of the given type with no error fields set.
    pub fn notification(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Decode a PDU, returning `None` for the v1 Trap-PDU tag (different layout).
    pub fn decode(decoder: &mut Decoder) -> Result<Option<Self>> {
        let tag = decoder.peek_tag();
        let Some(pdu_type) = tag.and_then(PduType::from_tag) else {
            return Ok(None);
        };
        if pdu_type == PduType::TrapV1 {
            return Ok(None);
        }
        let mut body = decoder.read_constructed(pdu_type.tag())?;
        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let mut varbinds = Vec::new();
        decode_varbind_list_into(&mut body, &mut varbinds)?;
        Ok(Some(Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        }))
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }
}
