//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// `1 minute`, `15 minutes`.
///
/// Usage in templates: `{{ minutes_remaining|minutes }}`
#[askama::filter_fn]
pub fn minutes(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(minutes_label(&value.to_string()))
}

fn minutes_label(count: &str) -> String {
    if count == "1" {
        "1 minute".to_string()
    } else {
        format!("{count} minutes")
    }
}

#[cfg(test)]
mod tests {
    use super::minutes_label;

    #[test]
    fn pluralizes_minutes() {
        assert_eq!(minutes_label("1"), "1 minute");
        assert_eq!(minutes_label("15"), "15 minutes");
        assert_eq!(minutes_label("0"), "0 minutes");
    }
}
