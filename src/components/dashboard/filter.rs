use crate::components::google_calendar::CalendarEvent;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// What the user narrowed the event list down to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Keep events starting on or after this date, as seen in the display timezone
    pub min_date: Option<NaiveDate>,
    /// Keep events whose title contains this, ignoring case
    pub title_query: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.min_date.is_none() && self.title_query.trim().is_empty()
    }

    /// Whether a single event passes every criterion. Dates are read in `tz`.
    pub fn matches(&self, event: &CalendarEvent, tz: &Tz) -> bool {
        if let Some(min_date) = self.min_date {
            if event.start.date_in(tz) < min_date {
                return false;
            }
        }

        let query = self.title_query.trim();
        if !query.is_empty() && !event.title.to_lowercase().contains(&query.to_lowercase()) {
            return false;
        }

        true
    }
}

/// Events passing the criteria, in their input order
pub fn filter<'a>(events: &'a [CalendarEvent], criteria: &FilterCriteria, tz: &Tz) -> Vec<&'a CalendarEvent> {
    if criteria.is_empty() {
        return events.iter().collect();
    }
    events.iter().filter(|event| criteria.matches(event, tz)).collect()
}
