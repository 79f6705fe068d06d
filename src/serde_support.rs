//! `serde` support for [`BigInt`] and [`BigDecimal`], serialized as decimal
//! strings (`to_radix_string(10)` / `str::parse`) rather than a hex variant.
//! Kept behind the crate's default-enabled `serde` feature.

use crate::bigint::BigInt;
use crate::decimal::BigDecimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

impl Serialize for BigInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_radix_string(10))
    }
}

struct BigIntVisitor;

impl<'de> Visitor<'de> for BigIntVisitor {
    type Value = BigInt;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal-string-encoded bigint")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<BigInt, E> {
        BigInt::from_str(s).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(BigIntVisitor)
    }
}

impl Serialize for BigDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_plain_string())
    }
}

struct BigDecimalVisitor;

impl<'de> Visitor<'de> for BigDecimalVisitor {
    type Value = BigDecimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal-string-encoded BigDecimal")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<BigDecimal, E> {
        BigDecimal::from_str(s).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for BigDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(BigDecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct DummyContainer {
        a: BigInt,
        b: BigDecimal,
    }

    #[test]
    fn round_trips_through_json() {
        let a = BigInt::from_str("123456789012345678901234567890").unwrap();
        let b = BigDecimal::from_str("3.1415926535").unwrap();
        let c = DummyContainer { a, b };

        let serialized = serde_json::to_string(&c).unwrap();
        assert_eq!(
            serialized,
            "{\"a\":\"123456789012345678901234567890\",\"b\":\"3.1415926535\"}"
        );

        let d: DummyContainer = serde_json::from_str(&serialized).unwrap();
        assert_eq!(d, c);
    }

    #[test]
    fn rejects_non_numeric_string() {
        let bad = "{\"a\":\"not-a-number\",\"b\":\"1.0\"}";
        let result: Result<DummyContainer, _> = serde_json::from_str(bad);
        assert!(result.is_err());
    }
}
