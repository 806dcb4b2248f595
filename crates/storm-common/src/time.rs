//! Timestamp parsing for manifests and CAPPI file names.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parse a timestamp as written by the tracking database or a manifest.
///
/// Accepts RFC 3339, `YYYY-mm-ddTHH:MM:SS`, `YYYY-mm-dd HH:MM:SS` (assumed
/// UTC) and the compact `YYYYmmddHHMM` used in CAPPI file names.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y%m%d%H%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Extract the timestamp from a CAPPI file name like `cappi_201401151230.dat.gz`.
pub fn timestamp_from_filename(name: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let digits: String = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.len() != 12 {
        return Err(TimeParseError::NoTimestamp(name.to_string()));
    }
    parse_timestamp(&digits)
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("No YYYYmmddHHMM timestamp in file name: {0}")]
    NoTimestamp(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2014-02-01T18:12:00Z").unwrap();
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.minute(), 12);
    }

    #[test]
    fn test_parse_database_style() {
        let a = parse_timestamp("2014-02-01 18:12:00").unwrap();
        let b = parse_timestamp("2014-02-01T18:12:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_compact() {
        let dt = parse_timestamp("201402011812").unwrap();
        assert_eq!(dt, parse_timestamp("2014-02-01T18:12:00Z").unwrap());
    }

    #[test]
    fn test_timestamp_from_filename() {
        let dt = timestamp_from_filename("/data/2014/02/cappi_201402011812.dat.gz").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 18);
        assert!(matches!(
            timestamp_from_filename("cappi_latest.dat.gz"),
            Err(TimeParseError::NoTimestamp(_))
        ));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
