//! Date parsing and localized formatting for the `date` template helper.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt::Write;

/// Format token for an ISO-8601 timestamp (case-insensitive).
pub const ISO: &str = "ISO";
/// Format token for the long localized date, the default.
pub const LONG: &str = "LL";

/// Requested output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat<'a> {
    /// `2024-01-02T03:04:05.000Z`
    Iso,
    /// `January 2, 2024`
    Long,
    /// Any `strftime` pattern
    Pattern(&'a str),
}

impl<'a> DateFormat<'a> {
    pub fn parse(format: &'a str) -> Self {
        if format.eq_ignore_ascii_case(ISO) {
            Self::Iso
        } else if format == LONG {
            Self::Long
        } else {
            Self::Pattern(format)
        }
    }
}

/// Interpret a template value as a UTC date.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`,
/// millisecond Unix timestamps, and null (now).
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Null => Some(Utc::now()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Resolve a language tag like `en`, `fr-FR` or `de_DE` to a chrono locale.
///
/// Bare languages map to their main territory; unknown tags fall back to POSIX.
pub fn resolve_locale(lang: &str) -> Locale {
    let tag = lang.trim().replace('-', "_");
    if let Ok(locale) = Locale::try_from(tag.as_str()) {
        return locale;
    }
    let language = tag.split('_').next().unwrap_or_default().to_ascii_lowercase();
    let guess = match language.as_str() {
        "en" => "en_US".to_owned(),
        "" => return Locale::POSIX,
        other => format!("{other}_{}", other.to_ascii_uppercase()),
    };
    Locale::try_from(guess.as_str()).unwrap_or(Locale::POSIX)
}

fn long_pattern(lang: &str) -> &'static str {
    if lang.trim().to_ascii_lowercase().starts_with("en") {
        "%B %-d, %Y"
    } else {
        "%-d %B %Y"
    }
}

/// Format `date` according to `format` in language `lang`.
pub fn format_date(date: DateTime<Utc>, format: &str, lang: &str) -> Result<String> {
    let pattern = match DateFormat::parse(format) {
        DateFormat::Iso => return Ok(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        DateFormat::Long => long_pattern(lang),
        DateFormat::Pattern(pattern) => pattern,
    };

    let mut out = String::new();
    write!(out, "{}", date.format_localized(pattern, resolve_locale(lang)))
        .map_err(|_| anyhow!("invalid date format `{format}`"))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_format_token_parsing() {
        assert_eq!(DateFormat::parse("ISO"), DateFormat::Iso);
        assert_eq!(DateFormat::parse("iso"), DateFormat::Iso);
        assert_eq!(DateFormat::parse("LL"), DateFormat::Long);
        assert_eq!(DateFormat::parse("%Y"), DateFormat::Pattern("%Y"));
    }

    #[test]
    fn test_iso_output() {
        assert_eq!(
            format_date(sample(), "iso", "en").unwrap(),
            "2024-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn test_long_date_english() {
        assert_eq!(format_date(sample(), "LL", "en").unwrap(), "January 2, 2024");
    }

    #[test]
    fn test_long_date_french() {
        let out = format_date(sample(), "LL", "fr").unwrap();
        assert!(out.contains("janvier"), "{out}");
        assert!(out.starts_with("2 "), "{out}");
    }

    #[test]
    fn test_pattern_output() {
        assert_eq!(format_date(sample(), "%Y/%m/%d", "en").unwrap(), "2024/01/02");
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(format_date(sample(), "%Q", "en").is_err());
    }

    #[test]
    fn test_parse_date_inputs() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_date(&json!("2024-01-02")), Some(midnight));
        assert_eq!(parse_date(&json!("2024-01-02 03:04:05")), Some(sample()));
        assert_eq!(parse_date(&json!("2024-01-02T03:04:05Z")), Some(sample()));
        assert_eq!(
            parse_date(&json!("2024-01-02T05:04:05+02:00")),
            Some(sample())
        );
        assert_eq!(
            parse_date(&json!(sample().timestamp_millis())),
            Some(sample())
        );
        assert!(parse_date(&Value::Null).is_some());
        assert_eq!(parse_date(&json!("yesterday")), None);
        assert_eq!(parse_date(&json!([1, 2])), None);
    }

    #[test]
    fn test_resolve_locale() {
        assert!(matches!(resolve_locale("en"), Locale::en_US));
        assert!(matches!(resolve_locale("fr-FR"), Locale::fr_FR));
        assert!(matches!(resolve_locale("de"), Locale::de_DE));
        assert!(matches!(resolve_locale("klingon"), Locale::POSIX));
    }
}
