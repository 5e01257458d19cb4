use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid regex"));

/// Current time as ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
pub(crate) fn timestamp() -> String {
    format_time(Utc::now())
}

/// ISO-8601 rendering of a unix timestamp in (fractional) seconds.
pub(crate) fn iso_from_unix(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis).map(format_time)
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Trim and collapse runs of whitespace, as rendered DOM text tends to carry layout spacing.
pub(crate) fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_from_unix() {
        assert_eq!(
            iso_from_unix(1_700_000_000.0).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
        assert_eq!(iso_from_unix(f64::NAN), None);
    }

    #[test]
    fn test_timestamp_shape() {
        let now = timestamp();
        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Jane \n\t Doe  "), "Jane Doe");
        assert_eq!(clean_text(""), "");
    }
}
