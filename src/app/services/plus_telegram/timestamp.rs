//! Plus-telegram timestamp layouts
//!
//! Two layouts appear on the wire. The slash form `YYYY/MM/DD,HH:MM:SS` (or with a
//! two-digit year) is sent by the full variants; the colon form `YY:MM:DD:HH:MM:SS`
//! by the compact ones. Both are station-local time at a fixed UTC offset.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

const SLASH_FORMAT_4: &str = "%Y/%m/%d,%H:%M:%S";
const SLASH_FORMAT_2: &str = "%y/%m/%d,%H:%M:%S";
const COLON_FORMAT: &str = "%y:%m:%d:%H:%M:%S";

/// Timestamp layout written by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    Slash,
    Colon,
}

/// Parse a telegram timestamp token in station-local time
pub fn parse_timestamp(token: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let trimmed = token.trim();

    let format = if trimmed.contains('/') {
        let year_digits = trimmed.split('/').next().map(str::len).unwrap_or(0);
        match year_digits {
            4 => SLASH_FORMAT_4,
            2 => SLASH_FORMAT_2,
            _ => {
                return Err(Error::format(format!(
                    "Unrecognised year in timestamp '{}'",
                    trimmed
                )));
            }
        }
    } else {
        COLON_FORMAT
    };

    let naive = NaiveDateTime::parse_from_str(trimmed, format).map_err(|e| {
        Error::format(format!("Invalid timestamp '{}': {}", trimmed, e))
    })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::format(format!("Ambiguous local timestamp '{}'", trimmed)))
}

/// Render a timestamp in station-local time using the given layout
pub fn format_timestamp(timestamp: DateTime<Utc>, offset: FixedOffset, style: TimestampStyle) -> String {
    let local = timestamp.with_timezone(&offset);
    match style {
        TimestampStyle::Slash => local.format(SLASH_FORMAT_4).to_string(),
        TimestampStyle::Colon => local.format(COLON_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_parse_slash_four_digit_year() {
        let ts = parse_timestamp("2024/03/05,14:30:00", offset()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_slash_two_digit_year() {
        let ts = parse_timestamp("24/03/05,14:30:00", offset()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_colon_form() {
        let ts = parse_timestamp(" 24:03:05:14:30:00 ", offset()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("not-a-time", offset()),
            Err(Error::Format { .. })
        ));
        assert!(parse_timestamp("024/03/05,14:30:00", offset()).is_err());
        assert!(parse_timestamp("", offset()).is_err());
    }

    #[test]
    fn test_format_both_styles() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 6, 30, 0).unwrap();
        assert_eq!(
            format_timestamp(ts, offset(), TimestampStyle::Slash),
            "2024/03/05,14:30:00"
        );
        assert_eq!(
            format_timestamp(ts, offset(), TimestampStyle::Colon),
            "24:03:05:14:30:00"
        );
    }
}
