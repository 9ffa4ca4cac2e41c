//! Object Identifier (OID) type.
//!
//! OIDs are stored as a `SmallVec` of arcs so that typical notification OIDs
//! (well under 16 arcs) never allocate.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Maximum number of arcs accepted when decoding or parsing.
pub const MAX_OID_LEN: usize = 128;

/// Object identifier.
///
/// Ordering is lexicographic by arc, compared as unsigned integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// The empty OID.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an OID from any iterator of arcs.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Whether the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Whether `prefix` is a prefix of this OID (or equal to it).
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Return a new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Parse dotted notation, e.g. `"1.3.6.1.2.1.1.3.0"`.
    ///
    /// A single leading dot is accepted (`".1.3.6"`), as printed by net-snmp.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in trimmed.split('.') {
            let arc = part
                .parse::<u32>()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::TooManyArcs {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                },
                s,
            ));
        }

        let oid = Oid { arcs };
        oid.validate()
            .map_err(|kind| Error::invalid_oid_with_input(kind, s))?;
        Ok(oid)
    }

    /// Check the X.660 constraints on the first two arcs.
    fn validate(&self) -> std::result::Result<(), OidErrorKind> {
        match self.arcs.as_slice() {
            [first, ..] if *first > 2 => Err(OidErrorKind::InvalidFirstArc(*first)),
            [first, second, ..] if *first < 2 && *second >= 40 => {
                Err(OidErrorKind::InvalidSecondArc {
                    first: *first,
                    second: *second,
                })
            }
            _ => Ok(()),
        }
    }

    /// Decode OID content octets (without tag and length).
    ///
    /// Error offsets are relative to the start of `data`. Empty content
    /// decodes to the empty OID.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        let mut arcs: SmallVec<[u32; 16]> = SmallVec::new();
        let mut value: u64 = 0;
        let mut start = 0;
        let mut in_subid = false;

        for (i, &byte) in data.iter().enumerate() {
            if !in_subid {
                start = i;
                in_subid = true;
                // Leading 0x80 is a non-minimal encoding (X.690 8.19.2)
                if byte == 0x80 {
                    return Err(Error::decode(i, DecodeErrorKind::InvalidOidEncoding));
                }
            }

            value = (value << 7) | (byte & 0x7F) as u64;
            if value > u32::MAX as u64 + 80 {
                return Err(Error::decode(start, DecodeErrorKind::InvalidOidEncoding));
            }

            if byte & 0x80 == 0 {
                if arcs.is_empty() {
                    let (first, second) = match value {
                        0..40 => (0, value),
                        40..80 => (1, value - 40),
                        _ => (2, value - 80),
                    };
                    arcs.push(first);
                    arcs.push(second as u32);
                } else {
                    if value > u32::MAX as u64 {
                        return Err(Error::decode(start, DecodeErrorKind::InvalidOidEncoding));
                    }
                    arcs.push(value as u32);
                }

                if arcs.len() > MAX_OID_LEN {
                    return Err(Error::decode(
                        start,
                        DecodeErrorKind::OidTooLong {
                            count: arcs.len(),
                            max: MAX_OID_LEN,
                        },
                    ));
                }

                value = 0;
                in_subid = false;
            }
        }

        if in_subid {
            return Err(Error::decode(start, DecodeErrorKind::InvalidOidEncoding));
        }

        Ok(Oid { arcs })
    }

    /// Encode to BER content octets.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut out = SmallVec::new();
        let (first, rest) = match self.arcs.as_slice() {
            [] => return out,
            [a] => (*a as u64 * 40, &[][..]),
            [a, b, rest @ ..] => (*a as u64 * 40 + *b as u64, rest),
        };

        push_subid(&mut out, first);
        for &arc in rest {
            push_subid(&mut out, arc as u64);
        }
        out
    }
}

fn push_subid(out: &mut SmallVec<[u8; 64]>, value: u64) {
    let mut tmp = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    loop {
        tmp[n] = (v & 0x7F) as u8;
        v >>= 7;
        n += 1;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(tmp[i] | continuation);
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Oid::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Oid::from_slice(arcs)
    }
}

/// Build an [`Oid`] from a list of arcs.
///
/// ```
/// use async_snmp_trap::oid;
///
/// let sys_uptime = oid!(1, 3, 6, 1, 2, 1, 1, 3, 0);
/// assert_eq!(sys_uptime.to_string(), "1.3.6.1.2.1.1.3.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc as u32),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let oid = Oid::parse("1.3.6.1.6.3.1.1.4.1.0").unwrap();
        assert_eq!(oid.len(), 11);
        assert_eq!(oid.to_string(), "1.3.6.1.6.3.1.1.4.1.0");
        assert_eq!(Oid::parse(".1.3.6").unwrap(), oid!(1, 3, 6));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Oid::parse(""),
            Err(Error::InvalidOid {
                kind: OidErrorKind::Empty,
                ..
            })
        ));
        assert!(matches!(
            Oid::parse("1.3.x"),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidArc,
                ..
            })
        ));
        assert!(matches!(
            Oid::parse("3.1"),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidFirstArc(3),
                ..
            })
        ));
        assert!(matches!(
            Oid::parse("1.40"),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidSecondArc { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_from_ber_basic() {
        // 1.3.6.1.4.1.9 (cisco)
        let oid = Oid::from_ber(&[0x2B, 0x06, 0x01, 0x04, 0x01, 0x09]).unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 4, 1, 9));
    }

    #[test]
    fn test_from_ber_multibyte_arc() {
        // 1.3.6.1.4.1.2636 (juniper) - 2636 = 0x94 0x4C
        let oid = Oid::from_ber(&[0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x4C]).unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 4, 1, 2636));
        assert_eq!(&oid.to_ber_smallvec()[..], &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x4C]);
    }

    #[test]
    fn test_from_ber_large_second_arc() {
        // 2.999 encodes as a single subidentifier 1079
        let oid = Oid::from_ber(&[0x88, 0x37]).unwrap();
        assert_eq!(oid, oid!(2, 999));
        assert_eq!(&oid.to_ber_smallvec()[..], &[0x88, 0x37]);
    }

    #[test]
    fn test_from_ber_truncated_subid() {
        let err = Oid::from_ber(&[0x2B, 0x86]).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 1,
                kind: DecodeErrorKind::InvalidOidEncoding
            }
        ));
    }

    #[test]
    fn test_from_ber_non_minimal() {
        let err = Oid::from_ber(&[0x2B, 0x80, 0x01]).unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::InvalidOidEncoding));
    }

    #[test]
    fn test_from_ber_arc_overflow() {
        let err = Oid::from_ber(&[0x2B, 0x90, 0x80, 0x80, 0x80, 0x00]).unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::InvalidOidEncoding));
    }

    #[test]
    fn test_from_ber_too_long() {
        let mut data = vec![0x2B];
        data.extend(std::iter::repeat_n(0x01, MAX_OID_LEN));
        let err = Oid::from_ber(&data).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::OidTooLong { .. })
        ));
    }

    #[test]
    fn test_from_ber_empty() {
        assert!(Oid::from_ber(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_ordering_and_prefix() {
        let a = oid!(1, 3, 6, 1, 2);
        let b = oid!(1, 3, 6, 1, 2, 1);
        let c = oid!(1, 3, 6, 1, 3);
        assert!(a < b && b < c);
        assert!(b.starts_with(&a));
        assert!(!c.starts_with(&b));
        assert_eq!(a.child(1), b);
    }
}
