use super::models::{CalendarEvent, Category, EventStart, GoogleEvent, GoogleEventDateTime};
use chrono::{DateTime, NaiveDate};
use tracing::debug;

/// Private extended property that carries the display category
const KEY_CATEGORY: &str = "category";

/// Convert raw API events into dashboard events, most recent first.
///
/// Events without a usable start are dropped. The sort is stable, so events
/// sharing a start instant keep the order the API returned them in.
pub fn normalize_events(raw: Vec<GoogleEvent>) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = raw.into_iter().filter_map(normalize_event).collect();
    sort_most_recent_first(&mut events);
    events
}

/// Sort events by start instant, descending
pub fn sort_most_recent_first(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| b.start.instant().cmp(&a.start.instant()));
}

/// Convert a single raw event
pub fn normalize_event(event: GoogleEvent) -> Option<CalendarEvent> {
    let id = event.id.unwrap_or_default();

    let Some(start) = event.start.as_ref().and_then(parse_start) else {
        debug!("Dropping event '{}' without a usable start", id);
        return None;
    };

    let category = event
        .extended_properties
        .as_ref()
        .and_then(|props| props.private.get(KEY_CATEGORY))
        .map(|label| Category::from_label(label))
        .unwrap_or_default();

    Some(CalendarEvent {
        id,
        title: event.summary.unwrap_or_default(),
        start,
        description: event.description.filter(|d| !d.trim().is_empty()),
        category,
    })
}

/// Parse a start record, preferring the exact date-time over the bare date
pub fn parse_start(start: &GoogleEventDateTime) -> Option<EventStart> {
    if let Some(date_time) = &start.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(date_time) {
            return Some(EventStart::DateTime(dt));
        }
        debug!("Unparseable start dateTime '{}'", date_time);
    }

    start
        .date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(EventStart::Date)
}
