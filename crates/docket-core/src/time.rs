//! Timestamp formatting shared by storage and serialization.
//!
//! Every timestamp in docket is UTC and crosses a boundary as an RFC 3339
//! string at second precision (`2024-05-01T12:00:00Z`). The database stores
//! the same form as TEXT so that string comparison matches time order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp for storage or the wire.
pub fn format_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a stored timestamp, tolerating legacy sub-second precision.
pub fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
                .unwrap_or_else(|_| Utc::now())
        })
}

/// Returns the current time truncated to second precision.
///
/// Truncating at the source keeps `created_at == updated_at` comparisons
/// exact after a round trip through the database.
pub fn now() -> DateTime<Utc> {
    parse_ts(&format_ts(&Utc::now()))
}

/// Serde adapter serializing `DateTime<Utc>` as the canonical string form.
pub mod timestamp {
    use super::{format_ts, parse_ts};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_ts(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(parse_ts(&s))
    }
}
