//! Variable bindings.
//!
//! A notification's payload is a SEQUENCE OF `SEQUENCE { name OID, value }`.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;

/// One `name = value` pair from a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Read one varbind SEQUENCE. Content after the value is ignored.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut pair = decoder.read_sequence()?;
        Ok(Self {
            oid: pair.read_oid()?,
            value: Value::decode(&mut pair)?,
        })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| varbinds.iter().rev().for_each(|vb| vb.encode(buf)));
}

pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut varbinds = Vec::new();
    decode_varbind_list_into(decoder, &mut varbinds)?;
    Ok(varbinds)
}

/// Like [`decode_varbind_list`], but appends to `out` as it goes, so a
/// malformed entry leaves the ones before it in place.
pub fn decode_varbind_list_into(decoder: &mut Decoder, out: &mut Vec<VarBind>) -> Result<()> {
    let mut seq = decoder.read_sequence()?;
    while !seq.is_empty() {
        out.push(VarBind::decode(&mut seq)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;
    use crate::oid;
    use bytes::Bytes;

    #[test]
    fn list_with_every_common_type_survives_reencoding() {
        let varbinds = vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(99999)),
            VarBind::new(
                oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0),
                Value::ObjectIdentifier(oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3)),
            ),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 2), Value::Integer(2)),
            VarBind::new(
                oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 2),
                Value::OctetString(Bytes::from_static(b"eth1")),
            ),
            VarBind::new(oid!(1, 3, 6, 1, 4, 1, 99999, 1), Value::Counter64(u64::MAX)),
            VarBind::new(
                oid!(1, 3, 6, 1, 4, 1, 99999, 2),
                Value::IpAddress([192, 168, 1, 1]),
            ),
        ];

        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &varbinds);
        let bytes = buf.finish();

        let mut decoder = Decoder::new(bytes);
        let decoded = decode_varbind_list(&mut decoder).unwrap();

        assert_eq!(varbinds, decoded);
    }

    #[test]
    fn empty_list() {
        let mut decoder = Decoder::new(Bytes::from_static(&[0x30, 0x00]));
        assert!(decode_varbind_list(&mut decoder).unwrap().is_empty());
    }

    #[test]
    fn malformed_entry_keeps_leading_varbinds() {
        let good = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(5));
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            // Second varbind: SEQUENCE { OID 1.3, INTEGER with zero length }
            buf.push_sequence(|buf| {
                buf.push_length(0);
                buf.push_tag(crate::ber::tag::universal::INTEGER);
                buf.push_oid(&oid!(1, 3));
            });
            good.encode(buf);
        });
        let bytes = buf.finish();

        let mut out = Vec::new();
        let err = decode_varbind_list_into(&mut Decoder::new(bytes), &mut out).unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::ZeroLengthInteger));
        assert_eq!(out, vec![good]);
    }

    #[test]
    fn display_is_name_equals_value() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(42));
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.1.0 = 42");

        let vb = VarBind::new(oid!(1, 3, 6, 1), Value::NoSuchObject);
        assert!(vb.to_string().contains("noSuchObject"));
    }
}
