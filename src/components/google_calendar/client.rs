use super::mapper::normalize_events;
use super::models::{CalendarEvent, GoogleEventsPage};
use super::time::EventWindow;
use crate::config::Config;
use crate::error::{retrieval_error, DashResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

/// Upper bound on events returned by one retrieval
pub const MAX_RESULTS: u32 = 2500;

/// Anything that can produce the signed-in user's events
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Fetch and normalize events for the given window, most recent first
    async fn fetch_events(&self, access_token: &str, window: EventWindow) -> DashResult<Vec<CalendarEvent>>;
}

/// Calendar API client backed by reqwest
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: String,
    calendar_id: String,
}

impl GoogleCalendarClient {
    pub fn new(api_base: &str, calendar_id: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.endpoints.calendar_api_base, &config.google_calendar_id)
    }

    /// Build the events list URL with every query parameter set
    pub fn events_url(&self, window: &EventWindow) -> DashResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| retrieval_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| retrieval_error("Calendar API base URL cannot be a base"))?
            .pop_if_empty()
            .push("calendars")
            .push(&self.calendar_id)
            .push("events");

        url.query_pairs_mut()
            .append_pair("timeMin", &window.time_min.to_rfc3339())
            .append_pair("timeMax", &window.time_max.to_rfc3339())
            .append_pair("maxResults", &MAX_RESULTS.to_string())
            .append_pair("orderBy", "startTime")
            .append_pair("singleEvents", "true");

        Ok(url)
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn fetch_events(&self, access_token: &str, window: EventWindow) -> DashResult<Vec<CalendarEvent>> {
        if access_token.trim().is_empty() {
            return Err(retrieval_error("No access token available"));
        }

        let url = self.events_url(&window)?;
        let started = Utc::now();

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| retrieval_error(&format!("Failed to fetch events: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| retrieval_error(&format!("Failed to read events response: {}", e)))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(retrieval_error("Access token was rejected; sign in again"));
        }
        if !status.is_success() {
            return Err(retrieval_error(&format!("Failed to fetch events: HTTP {} - {}", status, body)));
        }

        let page: GoogleEventsPage = serde_json::from_str(&body)
            .map_err(|e| retrieval_error(&format!("Failed to parse events response: {}", e)))?;

        if page.next_page_token.is_some() {
            debug!("Event list capped at {} results", MAX_RESULTS);
        }

        let events = normalize_events(page.items.unwrap_or_default());
        info!(
            "Fetched {} events in {} ms",
            events.len(),
            (Utc::now() - started).num_milliseconds()
        );

        Ok(events)
    }
}
