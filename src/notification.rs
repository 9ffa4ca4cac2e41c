//! Received notification packets.
//!
//! A [`TrapPacket`] is what a [`TrapHandler`](crate::TrapHandler) receives for
//! every datagram. It is filled in by a [`TrapDecoder`](crate::TrapDecoder) as
//! far as the datagram allows, so on a decode failure it may be partially
//! populated or equal to [`TrapPacket::default()`].
//!
//! # Notification varbinds
//!
//! Per RFC 3416, SNMPv2-Trap and InformRequest PDUs start with two well-known
//! varbinds:
//! 1. sysUpTime.0 (1.3.6.1.2.1.1.3.0) with a TimeTicks value
//! 2. snmpTrapOID.0 (1.3.6.1.6.3.1.1.4.1.0) with an OID value
//!
//! SNMPv1 traps carry the same information in the Trap-PDU header instead.
//! [`TrapPacket::uptime`] and [`TrapPacket::trap_oid`] hide the difference.

use crate::ber::EncodeBuf;
use crate::oid::Oid;
use crate::pdu::{GenericTrap, Pdu, PduType, TrapV1Pdu};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;

/// Well-known notification OIDs.
pub mod oids {
    use crate::oid;
    use crate::oid::Oid;

    /// sysUpTime.0
    pub fn sys_uptime() -> Oid {
        oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
    }

    /// snmpTrapOID.0
    pub fn snmp_trap_oid() -> Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0)
    }

    /// snmpTrapEnterprise.0
    pub fn snmp_trap_enterprise() -> Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 3, 0)
    }

    /// snmpTraps, the prefix of the generic trap notification OIDs.
    pub fn snmp_traps() -> Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5)
    }
}

/// A notification packet decoded from one datagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrapPacket {
    /// Message version, `None` if decoding stopped before it.
    pub version: Option<Version>,
    /// Community string (v1/v2c).
    pub community: Bytes,
    /// PDU type, `None` if decoding stopped before the PDU tag.
    pub pdu_type: Option<PduType>,
    /// request-id (zero for v1 traps, which have none).
    pub request_id: i32,
    /// Variable bindings, in wire order.
    pub varbinds: Vec<VarBind>,
    /// Trap-PDU header, present for SNMPv1 traps only.
    pub v1: Option<TrapV1Pdu>,
}

impl TrapPacket {
    /// Whether nothing at all was decoded into this packet.
    pub fn is_empty(&self) -> bool {
        *self == TrapPacket::default()
    }

    /// Whether this packet is an InformRequest (the sender expects a Response).
    pub fn is_inform(&self) -> bool {
        self.pdu_type == Some(PduType::InformRequest)
    }

    /// Agent uptime in hundredths of a second.
    ///
    /// Taken from the v1 time-stamp, or from the sysUpTime.0 varbind.
    pub fn uptime(&self) -> Option<u32> {
        if let Some(v1) = &self.v1 {
            return Some(v1.time_stamp);
        }
        let uptime_oid = oids::sys_uptime();
        self.varbinds
            .iter()
            .find(|vb| vb.oid == uptime_oid)
            .and_then(|vb| match vb.value {
                Value::TimeTicks(t) => Some(t),
                _ => None,
            })
    }

    /// The notification OID identifying the trap.
    ///
    /// For v2c this is the value of snmpTrapOID.0. For v1 it is derived from
    /// the Trap-PDU header following RFC 3584 section 3.1: generic traps map to
    /// `snmpTraps.(generic + 1)`, enterprise-specific traps to
    /// `enterprise.0.specific`.
    pub fn trap_oid(&self) -> Option<Oid> {
        if let Some(v1) = &self.v1 {
            return Some(v1_trap_oid(v1));
        }
        let trap_oid = oids::snmp_trap_oid();
        self.varbinds
            .iter()
            .find(|vb| vb.oid == trap_oid)
            .and_then(|vb| vb.value.as_oid().cloned())
    }

    /// Varbinds other than sysUpTime.0 and snmpTrapOID.0.
    pub fn payload(&self) -> impl Iterator<Item = &VarBind> {
        let uptime = oids::sys_uptime();
        let trap_oid = oids::snmp_trap_oid();
        self.varbinds
            .iter()
            .filter(move |vb| vb.oid != uptime && vb.oid != trap_oid)
    }

    /// Encode this packet as a v1/v2c message.
    ///
    /// A packet with a v1 header is encoded as a Trap-PDU; anything else as a
    /// PDU of `pdu_type` (SNMPv2-Trap when unset). SNMPv3 packets are encoded
    /// with the v2c envelope since no security parameters are retained.
    pub fn encode(&self) -> Bytes {
        let version = match self.version {
            Some(Version::V1) => Version::V1,
            _ => Version::V2c,
        };
        let mut buf = EncodeBuf::new();
        buf.push_community_message(version.as_i32(), &self.community, |buf| match &self.v1 {
            Some(header) => header.encode(buf, &self.varbinds),
            None => {
                let pdu_type = self.pdu_type.unwrap_or(PduType::TrapV2);
                Pdu::notification(pdu_type, self.request_id, self.varbinds.clone()).encode(buf)
            }
        });
        buf.finish()
    }
}

fn v1_trap_oid(v1: &TrapV1Pdu) -> Oid {
    match v1.generic() {
        Some(GenericTrap::EnterpriseSpecific) | None => {
            v1.enterprise.child(0).child(v1.specific_trap as u32)
        }
        Some(generic) => oids::snmp_traps().child(generic.as_i32() as u32 + 1),
    }
}

impl std::fmt::Display for TrapPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "<empty packet>");
        }
        match self.version {
            Some(version) => write!(f, "{}", version)?,
            None => write!(f, "<no version>")?,
        }
        if self.version.is_some_and(Version::is_community_based) {
            write!(f, " community={}", String::from_utf8_lossy(&self.community))?;
        }
        match self.pdu_type {
            Some(pdu_type) => write!(f, " {}", pdu_type)?,
            None => write!(f, " <no PDU>")?,
        }
        if let Some(v1) = &self.v1 {
            write!(
                f,
                " enterprise={} agent={}.{}.{}.{} generic={} specific={}",
                v1.enterprise,
                v1.agent_addr[0],
                v1.agent_addr[1],
                v1.agent_addr[2],
                v1.agent_addr[3],
                v1.generic_trap,
                v1.specific_trap
            )?;
        }
        if let Some(uptime) = self.uptime() {
            write!(f, " uptime={}", uptime)?;
        }
        if let Some(trap_oid) = self.trap_oid() {
            write!(f, " trap={}", trap_oid)?;
        }
        write!(f, " varbinds=[")?;
        for (i, vb) in self.varbinds.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", vb)?;
        }
        write!(f, "]")
    }
}
