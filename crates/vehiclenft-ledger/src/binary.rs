//! Canonical binary serialization for the handful of field types an
//! `NFTokenMint` needs.
//!
//! Fields are written in canonical order: by type code, then field code.

/// Type code and field code of a serialized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    /// Serialized type code.
    pub type_code: u8,
    /// Field code within the type.
    pub field_code: u8,
}

impl FieldId {
    const fn new(type_code: u8, field_code: u8) -> Self {
        Self {
            type_code,
            field_code,
        }
    }

    /// Encode the field header (one to three bytes).
    #[must_use]
    pub fn header(self) -> Vec<u8> {
        let (t, f) = (self.type_code, self.field_code);
        match (t < 16, f < 16) {
            (true, true) => vec![(t << 4) | f],
            (true, false) => vec![t << 4, f],
            (false, true) => vec![f, t],
            (false, false) => vec![0, t, f],
        }
    }
}

// Field ids used by NFTokenMint.
pub const TRANSACTION_TYPE: FieldId = FieldId::new(1, 2);
pub const FLAGS: FieldId = FieldId::new(2, 2);
pub const SEQUENCE: FieldId = FieldId::new(2, 4);
pub const LAST_LEDGER_SEQUENCE: FieldId = FieldId::new(2, 27);
pub const NFTOKEN_TAXON: FieldId = FieldId::new(2, 42);
pub const FEE: FieldId = FieldId::new(6, 8);
pub const SIGNING_PUB_KEY: FieldId = FieldId::new(7, 3);
pub const TXN_SIGNATURE: FieldId = FieldId::new(7, 4);
pub const URI: FieldId = FieldId::new(7, 5);
pub const ACCOUNT: FieldId = FieldId::new(8, 1);

/// Largest length a variable-length prefix can describe.
pub const MAX_VL_LEN: usize = 918_744;

/// Bit marking a native (XRP) amount as positive.
const XRP_POSITIVE: u64 = 0x4000_0000_0000_0000;

/// Largest drop amount that fits the native amount encoding.
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// Native amount in drops.
    Drops(u64),
    /// Length-prefixed bytes.
    Blob(Vec<u8>),
    /// Length-prefixed 20-byte account id.
    AccountId([u8; 20]),
}

/// Encode a variable-length prefix.
///
/// Returns `None` when `len` exceeds [`MAX_VL_LEN`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_vl_length(len: usize) -> Option<Vec<u8>> {
    // Each arm bounds `len`, so the narrowing casts cannot truncate.
    match len {
        0..=192 => Some(vec![len as u8]),
        193..=12_480 => {
            let l = len - 193;
            Some(vec![193 + (l >> 8) as u8, (l & 0xff) as u8])
        }
        12_481..=MAX_VL_LEN => {
            let l = len - 12_481;
            Some(vec![
                241 + (l >> 16) as u8,
                ((l >> 8) & 0xff) as u8,
                (l & 0xff) as u8,
            ])
        }
        _ => None,
    }
}

impl FieldValue {
    fn write(&self, out: &mut Vec<u8>) -> Option<()> {
        match self {
            Self::UInt16(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::UInt32(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Drops(drops) => {
                if *drops > MAX_DROPS {
                    return None;
                }
                out.extend_from_slice(&(XRP_POSITIVE | drops).to_be_bytes());
            }
            Self::Blob(bytes) => {
                out.extend(encode_vl_length(bytes.len())?);
                out.extend_from_slice(bytes);
            }
            Self::AccountId(id) => {
                out.extend(encode_vl_length(id.len())?);
                out.extend_from_slice(id);
            }
        }
        Some(())
    }
}

/// Serialize fields in canonical order.
///
/// Returns `None` if a value cannot be encoded (oversized blob or amount).
#[must_use]
pub fn serialize(fields: &[(FieldId, FieldValue)]) -> Option<Vec<u8>> {
    let mut sorted: Vec<&(FieldId, FieldValue)> = fields.iter().collect();
    sorted.sort_by_key(|(id, _)| *id);

    let mut out = Vec::new();
    for (id, value) in sorted {
        out.extend(id.header());
        value.write(&mut out)?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_headers() {
        assert_eq!(TRANSACTION_TYPE.header(), vec![0x12]);
        assert_eq!(FLAGS.header(), vec![0x22]);
        assert_eq!(LAST_LEDGER_SEQUENCE.header(), vec![0x20, 0x1B]);
        assert_eq!(NFTOKEN_TAXON.header(), vec![0x20, 0x2A]);
        assert_eq!(FEE.header(), vec![0x68]);
        assert_eq!(URI.header(), vec![0x75]);
        assert_eq!(ACCOUNT.header(), vec![0x81]);
        assert_eq!(FieldId::new(16, 1).header(), vec![0x01, 16]);
        assert_eq!(FieldId::new(16, 17).header(), vec![0, 16, 17]);
    }

    #[test]
    fn test_vl_length_boundaries() {
        assert_eq!(encode_vl_length(0), Some(vec![0]));
        assert_eq!(encode_vl_length(192), Some(vec![192]));
        assert_eq!(encode_vl_length(193), Some(vec![193, 0]));
        assert_eq!(encode_vl_length(12_480), Some(vec![240, 255]));
        assert_eq!(encode_vl_length(12_481), Some(vec![241, 0, 0]));
        assert_eq!(encode_vl_length(MAX_VL_LEN), Some(vec![254, 212, 23]));
        assert_eq!(encode_vl_length(MAX_VL_LEN + 1), None);
    }

    #[test]
    fn test_fee_amount_encoding() {
        let bytes = serialize(&[(FEE, FieldValue::Drops(12))]).unwrap();
        assert_eq!(hex::encode_upper(bytes), "68400000000000000C");
    }

    #[test]
    fn test_amount_over_limit_rejected() {
        assert!(serialize(&[(FEE, FieldValue::Drops(MAX_DROPS + 1))]).is_none());
    }

    #[test]
    fn test_canonical_ordering() {
        let fields = vec![
            (ACCOUNT, FieldValue::AccountId([0u8; 20])),
            (URI, FieldValue::Blob(vec![0xAB])),
            (FLAGS, FieldValue::UInt32(8)),
            (TRANSACTION_TYPE, FieldValue::UInt16(25)),
        ];
        let bytes = serialize(&fields).unwrap();
        let hex = hex::encode_upper(bytes);
        assert!(hex.starts_with("12001922000000087501AB8114"), "got {hex}");
        assert!(hex.ends_with(&"00".repeat(20)));
    }
}
