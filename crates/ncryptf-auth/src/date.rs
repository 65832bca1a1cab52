//! RFC 1123 dates as used in signatures and headers, always rendered in GMT.

use chrono::{DateTime, Utc};

use crate::error::AuthError;

const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Render `date` as `"Fri, 03 Aug 2018 15:27:48 +0000"`.
pub fn format_rfc1123(date: &DateTime<Utc>) -> String {
    date.format(RFC1123_FORMAT).to_string()
}

/// Parse an RFC 1123 date with a numeric offset, normalising to UTC.
pub fn parse_rfc1123(value: &str) -> Result<DateTime<Utc>, AuthError> {
    DateTime::parse_from_str(value.trim(), RFC1123_FORMAT)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| AuthError::InvalidArgument(format!("Invalid date {:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fixture_date() {
        let date = DateTime::from_timestamp(1533310068, 0).unwrap();
        assert_eq!(format_rfc1123(&date), "Fri, 03 Aug 2018 15:27:48 +0000");
    }

    #[test]
    fn pads_single_digit_day() {
        let date = DateTime::from_timestamp(1533254400, 0).unwrap();
        assert_eq!(format_rfc1123(&date), "Fri, 03 Aug 2018 00:00:00 +0000");
    }

    #[test]
    fn parse_round_trip() {
        let date = DateTime::from_timestamp(1533310068, 0).unwrap();
        assert_eq!(parse_rfc1123(&format_rfc1123(&date)).unwrap(), date);
    }

    #[test]
    fn parse_normalises_offset() {
        let parsed = parse_rfc1123("Fri, 03 Aug 2018 17:27:48 +0200").unwrap();
        assert_eq!(parsed.timestamp(), 1533310068);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_rfc1123("yesterday").is_err());
    }
}
