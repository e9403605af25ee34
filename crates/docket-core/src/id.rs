//! Issue identifiers.
//!
//! Issues are addressed externally as `DKT-<n>` and internally as a bare
//! positive integer. [`IssueId`] is the bridge: it parses either form and
//! always renders the prefixed one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The prefix used on every user-facing issue identifier.
pub const ID_PREFIX: &str = "DKT";

/// A validated issue identifier (always positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId(i64);

impl IssueId {
    /// Wraps a raw database id. Returns `None` for zero or negative values.
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// The raw integer used in storage and joins.
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ID_PREFIX}-{}", self.0)
    }
}

/// Error returned when an issue id cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid issue id {value:?}: expected {ID_PREFIX}-<n> or a positive integer")]
pub struct ParseIdError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for IssueId {
    type Err = ParseIdError;

    /// Accepts `DKT-7` (prefix case-insensitive) or a bare `7`.
    ///
    /// Zero, negative numbers, and anything non-numeric are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError {
            value: s.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err());
        }

        let digits = match trimmed.split_once('-') {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case(ID_PREFIX) => rest,
            Some(_) => return Err(err()),
            None => trimmed,
        };

        let raw: i64 = digits.parse().map_err(|_| err())?;
        Self::new(raw).ok_or_else(err)
    }
}

impl Serialize for IssueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IssueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = IssueId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an issue id string like \"{ID_PREFIX}-7\" or a positive integer")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<IssueId, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<IssueId, E> {
                IssueId::new(v).ok_or_else(|| E::custom(format!("issue id must be positive, got {v}")))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<IssueId, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(IssueId::new)
                    .ok_or_else(|| E::custom(format!("issue id out of range: {v}")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefixed() {
        assert_eq!("DKT-7".parse::<IssueId>().unwrap().raw(), 7);
        assert_eq!("dkt-42".parse::<IssueId>().unwrap().raw(), 42);
    }

    #[test]
    fn parse_bare() {
        assert_eq!("7".parse::<IssueId>().unwrap().raw(), 7);
    }

    #[test]
    fn rejects_bad_input() {
        assert!("".parse::<IssueId>().is_err());
        assert!("0".parse::<IssueId>().is_err());
        assert!("-3".parse::<IssueId>().is_err());
        assert!("DKT-0".parse::<IssueId>().is_err());
        assert!("DKT-".parse::<IssueId>().is_err());
        assert!("ABC-7".parse::<IssueId>().is_err());
        assert!("seven".parse::<IssueId>().is_err());
    }

    #[test]
    fn display_is_prefixed() {
        let id: IssueId = "13".parse().unwrap();
        assert_eq!(id.to_string(), "DKT-13");
    }

    #[test]
    fn serde_roundtrip() {
        let id: IssueId = "DKT-5".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""DKT-5""#);
        let back: IssueId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn deserialize_accepts_integer() {
        let id: IssueId = serde_json::from_str("5").unwrap();
        assert_eq!(id.raw(), 5);
        assert!(serde_json::from_str::<IssueId>("0").is_err());
    }
}
