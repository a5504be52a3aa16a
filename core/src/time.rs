//! Time related utils.

use crate::Error;
use chrono::Utc;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into the timestamp Chef expects: "2024-01-01T00:00:00Z"
///
/// The formatter is built per call, so this is safe to use from many tasks at once.
pub fn format_chef_timestamp(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a Chef timestamp back into DateTime.
pub fn parse_chef_timestamp(s: &str) -> crate::Result<DateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")
        .map(|v| v.and_utc())
        .map_err(|e| Error::unexpected(format!("invalid timestamp: {s}")).with_source(e))
}
