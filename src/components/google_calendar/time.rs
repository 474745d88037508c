use super::models::EventStart;
use chrono::{DateTime, Duration, Months, Utc};
use chrono_tz::Tz;

/// Label shown instead of a time for all-day events
pub const ALL_DAY: &str = "All day";

/// Time range a retrieval covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl EventWindow {
    /// The year leading up to `now`
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let time_min = now
            .checked_sub_months(Months::new(12))
            .unwrap_or_else(|| now - Duration::days(365));
        Self {
            time_min,
            time_max: now,
        }
    }
}

/// Format the start date for tables and the detail view
pub fn format_date(start: &EventStart, tz: &Tz) -> String {
    start.date_in(tz).format("%a %d %b %Y").to_string()
}

/// Format the start time, or the all-day label
pub fn format_time(start: &EventStart, tz: &Tz) -> String {
    match start {
        EventStart::Date(_) => ALL_DAY.to_string(),
        EventStart::DateTime(dt) => dt.with_timezone(tz).format("%H:%M").to_string(),
    }
}
