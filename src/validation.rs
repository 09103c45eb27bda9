//! Field checks shared by the reservation forms.
//!
//! Everything here is pure: the forms read field values out of the DOM and
//! hand them over as strings, together with the page clock for date checks.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use fancy_regex::Regex;

use crate::messages;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

const LOCAL_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Whitespace only, counting U+FEFF as whitespace the way browsers trim.
pub fn is_blank(value: &str) -> bool {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .is_empty()
}

/// One `@`, at least one `.` after it, and no whitespace anywhere.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value).unwrap_or(false)
}

/// Parses a date or datetime input value into epoch milliseconds.
///
/// A bare `YYYY-MM-DD` is midnight UTC. A `YYYY-MM-DDTHH:MM[:SS[.fff]]`
/// value without an offset is read in the page's local zone, given as
/// minutes east of UTC. Values carrying `Z` or an offset are absolute,
/// with or without seconds. `T24:00` (seconds and fraction all zero) is
/// midnight at the end of that day.
pub fn parse_requested_time(value: &str, utc_offset_minutes: i32) -> Option<i64> {
    let value = value.trim();

    if let Some(rolled) = roll_over_end_of_day(value) {
        return parse_requested_time(&rolled, utc_offset_minutes);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).timestamp_millis());
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.timestamp_millis());
    }

    if let Some(instant) = parse_zoned_without_seconds(value) {
        return Some(instant.timestamp_millis());
    }

    let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
    LOCAL_DATE_TIME_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(value, format).ok()?;
        offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.timestamp_millis())
    })
}

// `YYYY-MM-DDTHH:MMZ` and `YYYY-MM-DDTHH:MM+hh:mm`, which RFC 3339 rejects.
fn parse_zoned_without_seconds(value: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = match value.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => value.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z").ok()
}

// Rewrites `YYYY-MM-DDT24:00[:00[.000]][zone]` as the next day's `T00:00[zone]`.
fn roll_over_end_of_day(value: &str) -> Option<String> {
    let (date, time) = value.split_once('T')?;
    let mut rest = time.strip_prefix("24:00")?;
    if let Some(after_seconds) = rest.strip_prefix(":00") {
        rest = after_seconds;
        if let Some(fraction) = rest.strip_prefix('.') {
            let zeros = fraction.len() - fraction.trim_start_matches('0').len();
            if zeros == 0 {
                return None;
            }
            rest = &fraction[zeros..];
        }
    }
    if !(rest.is_empty() || rest == "Z" || rest.starts_with(['+', '-'])) {
        return None;
    }
    let next_day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?.succ_opt()?;
    Some(format!("{}T00:00{rest}", next_day.format("%Y-%m-%d")))
}

/// First problem with a quick reservation, checked name first.
pub fn validate_quick(name: &str, date: &str) -> Option<&'static str> {
    if is_blank(name) {
        return Some(messages::NAME_REQUIRED);
    }
    if date.is_empty() {
        return Some(messages::QUICK_DATE_REQUIRED);
    }
    None
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub date: Option<&'static str>,
}

impl ContactErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.date.is_none()
    }
}

/// Checks every contact field. Unlike [`validate_quick`] all three fields
/// are reported in one pass.
pub fn validate_contact(
    name: &str,
    email: &str,
    date: &str,
    now_ms: i64,
    utc_offset_minutes: i32,
) -> ContactErrors {
    let date_error = if date.is_empty() {
        Some(messages::CONTACT_DATE_REQUIRED)
    } else {
        match parse_requested_time(date, utc_offset_minutes) {
            Some(requested) if requested >= now_ms => None,
            _ => Some(messages::DATE_NOT_FUTURE),
        }
    };

    ContactErrors {
        name: is_blank(name).then_some(messages::NAME_REQUIRED),
        email: (!is_valid_email(email)).then_some(messages::EMAIL_INVALID),
        date: date_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2024-05-01T00:00:00Z
    const MAY_FIRST: i64 = 1_714_521_600_000;

    #[test]
    fn email_pattern_matches_simple_addresses_only() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("taro.yamada@example.co.jp"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn blank_covers_ideographic_space() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(is_blank("\u{3000}"));
        assert!(!is_blank(" 山田 "));
    }

    #[test]
    fn blank_covers_byte_order_mark() {
        assert!(is_blank("\u{feff}"));
        assert!(is_blank(" \u{feff}\u{3000} "));
        assert!(!is_blank("\u{feff}山田"));
    }

    #[test]
    fn email_pattern_compiles_eagerly() {
        assert_eq!(LazyLock::force(&EMAIL).as_str(), EMAIL_PATTERN);
    }

    #[test]
    fn date_only_values_are_utc_midnight() {
        assert_eq!(parse_requested_time("2024-05-01", 540), Some(MAY_FIRST));
    }

    #[test]
    fn local_datetimes_use_the_page_offset() {
        assert_eq!(parse_requested_time("2024-05-01T09:00", 540), Some(MAY_FIRST));
        assert_eq!(
            parse_requested_time("2024-05-01T00:00:30", 0),
            Some(MAY_FIRST + 30_000)
        );
        assert_eq!(
            parse_requested_time("2024-05-01T00:00:00.250", 0),
            Some(MAY_FIRST + 250)
        );
    }

    #[test]
    fn explicit_offsets_are_absolute() {
        assert_eq!(
            parse_requested_time("2024-05-01T09:00:00+09:00", 0),
            Some(MAY_FIRST)
        );
        assert_eq!(parse_requested_time("2024-05-01T00:00:00Z", 540), Some(MAY_FIRST));
    }

    #[test]
    fn zoned_values_without_seconds_are_absolute() {
        assert_eq!(parse_requested_time("2024-05-01T00:00Z", 540), Some(MAY_FIRST));
        assert_eq!(
            parse_requested_time("2024-05-01T09:00+09:00", 0),
            Some(MAY_FIRST)
        );
    }

    #[test]
    fn hour_twenty_four_is_the_next_midnight() {
        assert_eq!(parse_requested_time("2024-04-30T24:00", 0), Some(MAY_FIRST));
        assert_eq!(
            parse_requested_time("2024-04-30T24:00", 540),
            Some(MAY_FIRST - 9 * 3_600_000)
        );
        assert_eq!(
            parse_requested_time("2024-04-30T24:00:00.000Z", 540),
            Some(MAY_FIRST)
        );
        assert_eq!(
            parse_requested_time("2024-04-30T24:00:00+09:00", 0),
            Some(MAY_FIRST - 9 * 3_600_000)
        );
        assert_eq!(parse_requested_time("2024-04-30T24:30", 0), None);
        assert_eq!(parse_requested_time("2024-04-30T24:00:01", 0), None);
    }

    #[test]
    fn garbage_dates_do_not_parse() {
        assert_eq!(parse_requested_time("tomorrow", 0), None);
        assert_eq!(parse_requested_time("2024-13-01", 0), None);
    }

    #[test]
    fn quick_validation_short_circuits_on_name() {
        assert_eq!(validate_quick("  ", ""), Some(messages::NAME_REQUIRED));
        assert_eq!(validate_quick("花子", ""), Some(messages::QUICK_DATE_REQUIRED));
        assert_eq!(validate_quick("花子", "2024-05-01"), None);
    }

    #[test]
    fn contact_validation_reports_all_fields_at_once() {
        let errors = validate_contact("", "a@b", "", MAY_FIRST, 0);
        assert_eq!(
            errors,
            ContactErrors {
                name: Some(messages::NAME_REQUIRED),
                email: Some(messages::EMAIL_INVALID),
                date: Some(messages::CONTACT_DATE_REQUIRED),
            }
        );
    }

    #[test]
    fn contact_date_must_not_be_in_the_past() {
        let past = validate_contact("花子", "a@b.co", "2024-04-30", MAY_FIRST, 0);
        assert_eq!(past.date, Some(messages::DATE_NOT_FUTURE));
        assert!(past.name.is_none() && past.email.is_none());

        assert!(validate_contact("花子", "a@b.co", "2024-05-01", MAY_FIRST, 0).is_empty());
        let next_day = validate_contact("花子", "a@b.co", "2024-05-02", MAY_FIRST + DAY_MS / 2, 0);
        assert!(next_day.is_empty());
        assert_eq!(
            validate_contact("花子", "a@b.co", "soon", MAY_FIRST, 0).date,
            Some(messages::DATE_NOT_FUTURE)
        );
    }
}
