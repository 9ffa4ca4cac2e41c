//! Output formatting for received traps.
//!
//! Supports human-readable and JSON (one object per line) output.

use crate::cli::args::OutputFormat;
use crate::value::format_timeticks;
use crate::{Oid, TrapPacket, Value, VarBind, Version};
use serde::Serialize;
use std::io::{self, Write};
use std::net::SocketAddr;

/// A received trap, ready for output.
#[derive(Debug, Serialize)]
pub struct TrapOutput {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdu_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trap_oid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v1: Option<TrapV1Output>,
    pub varbinds: Vec<VarBindResult>,
    /// True when nothing could be decoded from the datagram.
    pub undecodable: bool,
}

/// SNMPv1 Trap-PDU header fields.
#[derive(Debug, Serialize)]
pub struct TrapV1Output {
    pub enterprise: String,
    pub agent_addr: String,
    pub generic_trap: i32,
    pub specific_trap: i32,
}

/// A single varbind.
#[derive(Debug, Serialize)]
pub struct VarBindResult {
    pub oid: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl TrapOutput {
    /// Collect the printable fields of a packet.
    pub fn new(packet: &TrapPacket, source: SocketAddr) -> Self {
        let source = source.to_string();
        if packet.is_empty() {
            return Self {
                source,
                version: None,
                community: None,
                pdu_type: None,
                request_id: None,
                uptime: None,
                trap_oid: None,
                v1: None,
                varbinds: Vec::new(),
                undecodable: true,
            };
        }

        let v1 = packet.v1.as_ref().map(|h| TrapV1Output {
            enterprise: h.enterprise.to_string(),
            agent_addr: format_ip(&h.agent_addr),
            generic_trap: h.generic_trap,
            specific_trap: h.specific_trap,
        });

        Self {
            source,
            version: packet.version.map(|v| v.to_string()),
            community: packet
                .version
                .is_some_and(Version::is_community_based)
                .then(|| String::from_utf8_lossy(&packet.community).into_owned()),
            pdu_type: packet.pdu_type.map(|t| t.to_string()),
            request_id: packet.v1.is_none().then_some(packet.request_id),
            uptime: packet.uptime(),
            trap_oid: packet.trap_oid().map(|o| o.to_string()),
            v1,
            varbinds: packet.varbinds.iter().map(format_varbind).collect(),
            undecodable: false,
        }
    }
}

/// Writes traps to a sink in the selected format.
pub struct TrapPrinter {
    pub format: OutputFormat,
}

impl TrapPrinter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write one trap to stdout.
    pub fn print(&self, packet: &TrapPacket, source: SocketAddr) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.write(&mut stdout, packet, source)?;
        stdout.flush()
    }

    /// Write one trap to `w`.
    pub fn write<W: Write>(
        &self,
        w: &mut W,
        packet: &TrapPacket,
        source: SocketAddr,
    ) -> io::Result<()> {
        let output = TrapOutput::new(packet, source);
        match self.format {
            OutputFormat::Human => write_human(w, &output),
            OutputFormat::Json => write_json(w, &output),
        }
    }
}

fn write_human<W: Write>(w: &mut W, trap: &TrapOutput) -> io::Result<()> {
    if trap.undecodable {
        return writeln!(w, "{}: <undecodable datagram>", trap.source);
    }

    write!(w, "{}:", trap.source)?;
    if let Some(ref version) = trap.version {
        write!(w, " {}", version)?;
    }
    if let Some(ref pdu_type) = trap.pdu_type {
        write!(w, " {}", pdu_type)?;
    }
    if let Some(ref community) = trap.community {
        write!(w, " community={:?}", community)?;
    }
    writeln!(w)?;

    if let Some(ref v1) = trap.v1 {
        writeln!(w, "  Enterprise: {}", v1.enterprise)?;
        writeln!(w, "  Agent:      {}", v1.agent_addr)?;
        writeln!(
            w,
            "  Generic:    {}  Specific: {}",
            v1.generic_trap, v1.specific_trap
        )?;
    }
    if let Some(uptime) = trap.uptime {
        writeln!(w, "  Uptime:     ({}) {}", uptime, format_timeticks(uptime))?;
    }
    if let Some(ref trap_oid) = trap.trap_oid {
        writeln!(w, "  Trap:       {}", trap_oid)?;
    }

    for vb in &trap.varbinds {
        write!(w, "  {} = {}: ", vb.oid, vb.value_type)?;
        if let Some(ref formatted) = vb.formatted {
            writeln!(w, "{}", formatted)?;
        } else {
            match &vb.value {
                serde_json::Value::String(s) => writeln!(w, "\"{}\"", s)?,
                serde_json::Value::Null => writeln!(w)?,
                other => writeln!(w, "{}", other)?,
            }
        }
    }
    Ok(())
}

fn write_json<W: Write>(w: &mut W, trap: &TrapOutput) -> io::Result<()> {
    let json = serde_json::to_string(trap).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

fn format_varbind(vb: &VarBind) -> VarBindResult {
    let (value_type, value, formatted) = format_value(&vb.value);
    VarBindResult {
        oid: format_oid(&vb.oid),
        value_type,
        value,
        formatted,
    }
}

fn format_oid(oid: &Oid) -> String {
    oid.to_string()
}

fn format_ip(bytes: &[u8; 4]) -> String {
    format!("{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
}

/// Format a value, returning (type_name, json_value, formatted_string).
fn format_value(value: &Value) -> (String, serde_json::Value, Option<String>) {
    match value {
        Value::Integer(v) => ("INTEGER".into(), (*v).into(), None),

        Value::OctetString(bytes) => {
            if is_printable(bytes) {
                let s = String::from_utf8_lossy(bytes);
                ("STRING".into(), serde_json::Value::String(s.into_owned()), None)
            } else {
                (
                    "Hex-STRING".into(),
                    serde_json::Value::String(hex_string(bytes)),
                    Some(format_hex_string(bytes)),
                )
            }
        }

        Value::Null => ("NULL".into(), serde_json::Value::Null, None),

        Value::ObjectIdentifier(oid) => (
            "OID".into(),
            serde_json::Value::String(format_oid(oid)),
            None,
        ),

        Value::IpAddress(bytes) => (
            "IpAddress".into(),
            serde_json::Value::String(format_ip(bytes)),
            None,
        ),

        Value::Counter32(v) => ("Counter32".into(), (*v).into(), None),

        Value::Gauge32(v) => ("Gauge32".into(), (*v).into(), None),

        Value::TimeTicks(v) => (
            "TimeTicks".into(),
            (*v).into(),
            Some(format!("({}) {}", v, format_timeticks(*v))),
        ),

        Value::Opaque(bytes) => (
            "Opaque".into(),
            serde_json::Value::String(hex_string(bytes)),
            Some(format_hex_string(bytes)),
        ),

        Value::Counter64(v) => ("Counter64".into(), (*v).into(), None),

        Value::NoSuchObject => (
            "NoSuchObject".into(),
            serde_json::Value::Null,
            Some("No Such Object available".into()),
        ),

        Value::NoSuchInstance => (
            "NoSuchInstance".into(),
            serde_json::Value::Null,
            Some("No Such Instance currently exists".into()),
        ),

        Value::EndOfMibView => (
            "EndOfMibView".into(),
            serde_json::Value::Null,
            Some("No more variables left in this MIB View".into()),
        ),

        Value::Unknown { tag, data } => (
            format!("Unknown(0x{:02X})", tag),
            serde_json::Value::String(hex_string(data)),
            Some(format_hex_string(data)),
        ),
    }
}

/// Check if bytes are printable ASCII/UTF-8.
fn is_printable(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(s) => s
            .chars()
            .all(|c| c.is_ascii_graphic() || c.is_ascii_whitespace()),
        Err(_) => false,
    }
}

/// Format bytes as hex string (lowercase, no separator).
fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Format bytes as spaced hex for display.
fn format_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::oids;
    use crate::oid;
    use crate::pdu::{PduType, TrapV1Pdu};
    use bytes::Bytes;

    fn source() -> SocketAddr {
        "192.0.2.7:50123".parse().unwrap()
    }

    fn link_down() -> TrapPacket {
        TrapPacket {
            version: Some(Version::V2c),
            community: Bytes::from_static(b"public"),
            pdu_type: Some(PduType::TrapV2),
            request_id: 42,
            varbinds: vec![
                VarBind::new(oids::sys_uptime(), Value::TimeTicks(360000)),
                VarBind::new(
                    oids::snmp_trap_oid(),
                    Value::ObjectIdentifier(oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3)),
                ),
                VarBind::new(
                    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1),
                    Value::OctetString(Bytes::from_static(b"eth0")),
                ),
            ],
            v1: None,
        }
    }

    fn render(format: OutputFormat, packet: &TrapPacket) -> String {
        let mut out = Vec::new();
        TrapPrinter::new(format)
            .write(&mut out, packet, source())
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_human_output() {
        let text = render(OutputFormat::Human, &link_down());
        assert!(text.starts_with("192.0.2.7:50123: SNMPv2c SNMPv2-Trap community=\"public\"\n"));
        assert!(text.contains("  Uptime:     (360000) 0:01:00:00.00\n"));
        assert!(text.contains("  Trap:       1.3.6.1.6.3.1.1.5.3\n"));
        assert!(text.contains("  1.3.6.1.2.1.2.2.1.2.1 = STRING: \"eth0\"\n"));
    }

    #[test]
    fn test_json_output() {
        let text = render(OutputFormat::Json, &link_down());
        assert_eq!(text.lines().count(), 1);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["source"], "192.0.2.7:50123");
        assert_eq!(json["community"], "public");
        assert_eq!(json["request_id"], 42);
        assert_eq!(json["trap_oid"], "1.3.6.1.6.3.1.1.5.3");
        assert_eq!(json["varbinds"][0]["type"], "TimeTicks");
        assert_eq!(json["varbinds"][2]["value"], "eth0");
        assert_eq!(json["undecodable"], false);
    }

    #[test]
    fn test_v1_output_has_header() {
        let packet = TrapPacket {
            version: Some(Version::V1),
            community: Bytes::from_static(b"public"),
            pdu_type: Some(PduType::TrapV1),
            v1: Some(TrapV1Pdu {
                enterprise: oid!(1, 3, 6, 1, 4, 1, 9),
                agent_addr: [10, 1, 2, 3],
                generic_trap: 0,
                specific_trap: 0,
                time_stamp: 5,
            }),
            ..Default::default()
        };
        let output = TrapOutput::new(&packet, source());
        assert_eq!(output.request_id, None);
        assert_eq!(output.trap_oid.as_deref(), Some("1.3.6.1.6.3.1.1.5.1"));
        let v1 = output.v1.unwrap();
        assert_eq!(v1.agent_addr, "10.1.2.3");
        assert_eq!(v1.enterprise, "1.3.6.1.4.1.9");
    }

    #[test]
    fn test_empty_packet_is_undecodable() {
        let text = render(OutputFormat::Human, &TrapPacket::default());
        assert_eq!(text, "192.0.2.7:50123: <undecodable datagram>\n");
        let json: serde_json::Value =
            serde_json::from_str(&render(OutputFormat::Json, &TrapPacket::default())).unwrap();
        assert_eq!(json["undecodable"], true);
        assert!(json.get("version").is_none());
    }

    #[test]
    fn test_is_printable() {
        assert!(is_printable(b"Hello World"));
        assert!(is_printable(b""));
        assert!(!is_printable(&[0x00, 0x01, 0x02]));
        assert!(!is_printable(&[0x80, 0x81]));
    }

    #[test]
    fn test_hex_formats() {
        assert_eq!(hex_string(&[0x00, 0x1A, 0x2B]), "001a2b");
        assert_eq!(format_hex_string(&[0x00, 0x1A, 0x2B]), "00 1A 2B");
    }
}
