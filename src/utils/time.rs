use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp (e.g. `--as-of 2025-07-29T00:00:00Z`) into UTC
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .with_context(|| format!("Failed to parse timestamp '{}'", ts))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format an activity timestamp for export: `YYYY-MM-DD HH:MM:SS`, UTC, no suffix
pub fn format_activity_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_with_offset() {
        let dt = parse_timestamp("2025-07-24T11:15:42+02:00").unwrap();
        assert_eq!((dt.day(), dt.hour()), (24, 9));
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        let err = parse_timestamp("last tuesday").unwrap_err();
        assert!(err.to_string().contains("last tuesday"));
    }

    #[test]
    fn test_format_truncates_fractional_seconds() {
        let dt = parse_timestamp("2025-07-24T09:15:42.999Z").unwrap();
        assert_eq!(format_activity_time(&dt), "2025-07-24 09:15:42");
    }
}
