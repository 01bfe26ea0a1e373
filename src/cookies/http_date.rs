//! HTTP-date (`Tue, 15 Nov 1994 08:12:31 GMT`) conversion for cookie expiry.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Formats `millis` since the epoch as an HTTP-date, or `None` if out of range.
pub fn format_http_date(millis: i64) -> Option<String> {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()?;
    at.format(&format).ok()
}

/// Parses an HTTP-date into milliseconds since the epoch.
pub fn parse_http_date(raw: &str) -> Option<i64> {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let at = PrimitiveDateTime::parse(raw.trim(), &format).ok()?.assume_utc();
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_to_utc_string() {
        // 1994-11-15T08:12:31Z
        assert_eq!(
            format_http_date(784_887_151_000).as_deref(),
            Some("Tue, 15 Nov 1994 08:12:31 GMT")
        );
        assert_eq!(format_http_date(0).as_deref(), Some("Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn parses_its_own_output_at_second_precision() {
        let formatted = format_http_date(1_700_000_000_999).unwrap();
        assert_eq!(parse_http_date(&formatted), Some(1_700_000_000_000));
        assert_eq!(parse_http_date(" Thu, 01 Jan 1970 00:00:00 GMT "), Some(0));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(parse_http_date("1994-11-15T08:12:31Z").is_none());
        assert!(parse_http_date("").is_none());
    }
}
