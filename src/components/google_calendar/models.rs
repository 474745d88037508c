use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Start of an event as the calendar API reports it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoogleEventDateTime {
    /// Set for all-day events (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Set for timed events (RFC 3339)
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoogleExtendedProperties {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub private: HashMap<String, String>,
}

/// Raw event record from the events list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<GoogleEventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<GoogleEventDateTime>,
    #[serde(rename = "extendedProperties", skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<GoogleExtendedProperties>,
}

/// Body of an events list response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleEventsPage {
    pub items: Option<Vec<GoogleEvent>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// When an event starts: a whole day, or an exact instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStart {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl EventStart {
    /// Instant used for ordering. A dated event starts at midnight UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventStart::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
            EventStart::DateTime(dt) => dt.with_timezone(&Utc),
        }
    }

    /// Calendar date of the start as seen in `tz`. All-day events keep their date.
    pub fn date_in(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventStart::Date(date) => *date,
            EventStart::DateTime(dt) => dt.with_timezone(tz).date_naive(),
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventStart::Date(_))
    }
}

impl fmt::Display for EventStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStart::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EventStart::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Display category of an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    #[default]
    Other,
}

impl Category {
    /// Parse a category label, falling back to `Other`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "work" => Category::Work,
            "personal" => Category::Personal,
            _ => Category::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Other => "Other",
        }
    }
}

/// Normalized calendar event shown by the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: EventStart,
    pub description: Option<String>,
    pub category: Category,
}
