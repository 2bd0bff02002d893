use chrono::{Datelike, Duration, NaiveDate};

/// This is the standard way of converting a date to a string in waka-heatmap.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses `YYYY-MM-DD`, ignoring anything after the date part. Timestamps such as
/// `2024-01-01T00:00:00Z` are truncated to their day.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let day = value.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Returns the Sunday on or before `date`.
pub fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Returns the Saturday on or after `date`.
pub fn saturday_on_or_after(date: NaiveDate) -> NaiveDate {
    date + Duration::days(6 - date.weekday().num_days_from_sunday() as i64)
}
