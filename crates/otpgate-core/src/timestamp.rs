use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// `serialize_with` helper for response timestamps: UTC, millisecond
/// precision, `Z` suffix (`2024-10-01T08:30:00.000Z`).
pub fn rfc3339_millis<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
