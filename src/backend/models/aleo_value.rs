// src/backend/models/aleo_value.rs
//! Typed Aleo program inputs and their literal wire form (`5u64`, `12field`,
//! `aleo1...`). Business code builds `AleoValue`s; only `Display`/`FromStr`
//! know the suffix syntax.

use crate::error::VaultError;
use num::BigUint;
use std::fmt;
use std::str::FromStr;

/// Largest byte length that always fits below the Aleo base field modulus.
const MAX_FIELD_BYTES: usize = 31;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AleoValue {
    Address(String),
    Field(BigUint),
    U8(u8),
    U64(u64),
}

impl fmt::Display for AleoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AleoValue::Address(addr) => write!(f, "{}", addr),
            AleoValue::Field(value) => write!(f, "{}field", value),
            AleoValue::U8(value) => write!(f, "{}u8", value),
            AleoValue::U64(value) => write!(f, "{}u64", value),
        }
    }
}

impl FromStr for AleoValue {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || VaultError::InvalidInput(format!("Not an Aleo literal: {}", s));

        if s.starts_with("aleo1") {
            return Ok(AleoValue::Address(s.to_string()));
        }
        if let Some(digits) = s.strip_suffix("field") {
            return digits.parse::<BigUint>().map(AleoValue::Field).map_err(|_| invalid());
        }
        if let Some(digits) = s.strip_suffix("u64") {
            return digits.parse::<u64>().map(AleoValue::U64).map_err(|_| invalid());
        }
        if let Some(digits) = s.strip_suffix("u8") {
            return digits.parse::<u8>().map(AleoValue::U8).map_err(|_| invalid());
        }
        Err(invalid())
    }
}

/// Splits a content identifier into two field elements, halves cut on a
/// byte boundary (first half takes the extra byte). An empty half encodes as 0.
pub fn encode_cid(cid: &str) -> Result<(AleoValue, AleoValue), VaultError> {
    let bytes = cid.as_bytes();
    if bytes.is_empty() || !cid.is_ascii() {
        return Err(VaultError::InvalidInput(format!("Invalid content identifier: {:?}", cid)));
    }
    let mid = (bytes.len() + 1) / 2;
    if mid > MAX_FIELD_BYTES {
        return Err(VaultError::InvalidInput(format!(
            "Content identifier too long for two fields: {} bytes",
            bytes.len()
        )));
    }
    let (first, second) = bytes.split_at(mid);
    Ok((
        AleoValue::Field(BigUint::from_bytes_be(first)),
        AleoValue::Field(BigUint::from_bytes_be(second)),
    ))
}

/// Inverse of `encode_cid`.
#[cfg(test)]
pub fn decode_cid(part1: &AleoValue, part2: &AleoValue) -> Result<String, VaultError> {
    let to_bytes = |value: &AleoValue| match value {
        AleoValue::Field(n) if num::Zero::is_zero(n) => Ok(Vec::new()),
        AleoValue::Field(n) => Ok(n.to_bytes_be()),
        other => Err(VaultError::InvalidInput(format!("Expected a field, got {}", other))),
    };
    let mut bytes = to_bytes(part1)?;
    bytes.extend(to_bytes(part2)?);
    String::from_utf8(bytes)
        .map_err(|_| VaultError::InvalidInput("Fields do not decode to a content identifier".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_type_suffixes() {
        assert_eq!(AleoValue::U64(1_700_000_000).to_string(), "1700000000u64");
        assert_eq!(AleoValue::U8(2).to_string(), "2u8");
        assert_eq!(AleoValue::Field(BigUint::from(97u32)).to_string(), "97field");
    }

    #[test]
    fn parses_literals() {
        assert_eq!("42u64".parse::<AleoValue>().unwrap(), AleoValue::U64(42));
        assert_eq!("3u8".parse::<AleoValue>().unwrap(), AleoValue::U8(3));
        assert_eq!(
            "12345field".parse::<AleoValue>().unwrap(),
            AleoValue::Field(BigUint::from(12345u32))
        );
        assert_eq!(
            "aleo1xyz".parse::<AleoValue>().unwrap(),
            AleoValue::Address("aleo1xyz".into())
        );
        assert!("300u8".parse::<AleoValue>().is_err());
        assert!("12".parse::<AleoValue>().is_err());
        assert!("fieldfield".parse::<AleoValue>().is_err());
    }

    #[test]
    fn cid_survives_the_field_split() {
        let cid = "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku";
        let (p1, p2) = encode_cid(cid).unwrap();
        assert_eq!(decode_cid(&p1, &p2).unwrap(), cid);

        let v0 = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
        let (p1, p2) = encode_cid(v0).unwrap();
        let reparsed = (
            p1.to_string().parse::<AleoValue>().unwrap(),
            p2.to_string().parse::<AleoValue>().unwrap(),
        );
        assert_eq!(decode_cid(&reparsed.0, &reparsed.1).unwrap(), v0);
    }

    #[test]
    fn one_byte_cid_has_zero_second_half() {
        let (p1, p2) = encode_cid("a").unwrap();
        assert_eq!(p2, AleoValue::Field(BigUint::from(0u8)));
        assert_eq!(decode_cid(&p1, &p2).unwrap(), "a");
    }

    #[test]
    fn rejects_oversized_or_empty_cids() {
        assert!(encode_cid("").is_err());
        assert!(encode_cid(&"x".repeat(63)).is_err());
        assert!(encode_cid(&"x".repeat(62)).is_ok());
    }
}
