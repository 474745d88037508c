#![allow(dead_code)]

use async_trait::async_trait;
use calendar_dashboard::components::google_calendar::{
    CalendarEvent, Category, EventSource, EventStart, EventWindow, GoogleCalendarHandle,
};
use calendar_dashboard::components::identity::pkce::PkceChallenge;
use calendar_dashboard::components::identity::{AccessToken, IdentityProvider, UserProfile};
use calendar_dashboard::components::session::SessionStore;
use calendar_dashboard::config::{Config, FileConfig};
use calendar_dashboard::error::{auth_error, retrieval_error, DashResult};
use calendar_dashboard::web::AppState;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const AUTH_CODE: &str = "test-code";

/// Config pointing every Google endpoint at `base`
pub fn test_config(base: &str) -> Config {
    let vars = [
        ("GOOGLE_CLIENT_ID", "test-client".to_string()),
        ("GOOGLE_AUTH_URL", format!("{}/auth", base)),
        ("GOOGLE_TOKEN_URL", format!("{}/token", base)),
        ("GOOGLE_USERINFO_URL", format!("{}/userinfo", base)),
        ("GOOGLE_CALENDAR_API_BASE", format!("{}/calendar/v3", base)),
    ];
    Config::from_sources(
        |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone()),
        FileConfig::default(),
    )
    .unwrap()
}

pub fn timed(id: &str, title: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        start: EventStart::DateTime(DateTime::parse_from_rfc3339(start).unwrap()),
        description: None,
        category: Category::Other,
    }
}

pub fn all_day(id: &str, title: &str, y: i32, m: u32, d: u32) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        start: EventStart::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        description: None,
        category: Category::Other,
    }
}

/// `count` events one day apart, most recent first
pub fn numbered_events(count: usize) -> Vec<CalendarEvent> {
    let newest = Utc::now() - Duration::days(1);
    (0..count)
        .map(|i| {
            let start = (newest - Duration::days(i as i64)).fixed_offset();
            CalendarEvent {
                id: format!("event-{}", i),
                title: format!("Event {}", i),
                start: EventStart::DateTime(start),
                description: Some(format!("Details for event {}", i)),
                category: Category::Work,
            }
        })
        .collect()
}

/// Event source returning a fixed list, or failing on demand
pub struct MockEventSource {
    events: Vec<CalendarEvent>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockEventSource {
    pub fn new(events: Vec<CalendarEvent>) -> Arc<Self> {
        Arc::new(Self {
            events,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_events(&self, access_token: &str, _window: EventWindow) -> DashResult<Vec<CalendarEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if access_token != ACCESS_TOKEN {
            return Err(retrieval_error("Access token was rejected; sign in again"));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(retrieval_error("Failed to fetch events: HTTP 500"));
        }
        Ok(self.events.clone())
    }
}

/// Identity provider that accepts exactly one code
pub struct MockIdentity {
    pub expires_in: Option<Duration>,
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    fn authorization_url(&self, state: &str, challenge: &PkceChallenge) -> DashResult<Url> {
        let mut url = Url::parse("https://accounts.example.com/auth").unwrap();
        url.query_pairs_mut()
            .append_pair("state", state)
            .append_pair("code_challenge", &challenge.code_challenge);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _code_verifier: &str) -> DashResult<AccessToken> {
        if code != AUTH_CODE {
            return Err(auth_error("invalid_grant"));
        }
        Ok(AccessToken::new(
            ACCESS_TOKEN,
            self.expires_in.map(|after| Utc::now() + after),
        ))
    }

    async fn user_info(&self, _access_token: &AccessToken) -> DashResult<UserProfile> {
        Ok(UserProfile {
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        })
    }
}

pub fn app_state(source: Arc<MockEventSource>, identity: MockIdentity) -> AppState {
    let config = test_config("http://127.0.0.1:9");
    AppState {
        store: Arc::new(SessionStore::with_timezone(config.timezone)),
        config: Arc::new(config),
        calendar: GoogleCalendarHandle::new(source),
        identity: Arc::new(identity),
    }
}
