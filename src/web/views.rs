use crate::components::dashboard::{EventDetail, RetrievalStatus};
use crate::components::google_calendar::time::{format_date, format_time};
use crate::components::google_calendar::CalendarEvent;
use crate::components::session::Tab;
use askama::Template;
use chrono_tz::Tz;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginView<'a> {
    pub error: Option<&'a str>,
}

/// One line of the event table
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub category: &'static str,
}

impl EventRow {
    fn new(event: &CalendarEvent, tz: &Tz) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            date: format_date(&event.start, tz),
            time: format_time(&event.start, tz),
            category: event.category.as_str(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardView {
    pub user_name: String,
    pub theme: &'static str,
    pub rows: Vec<EventRow>,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub filtered_count: usize,
    pub total_count: usize,
    pub title_query: String,
    pub min_date: String,
    pub loading: bool,
    pub error: Option<String>,
    pub loaded_at: Option<String>,
    pub detail: Option<EventDetail>,
}

impl DashboardView {
    pub fn from_tab(tab: &Tab, tz: &Tz) -> Self {
        let dashboard = &tab.dashboard;
        let page = dashboard.page_view();
        let criteria = dashboard.criteria();

        let (loading, error, loaded_at) = match dashboard.retrieval() {
            RetrievalStatus::Idle => (false, None, None),
            RetrievalStatus::Loading => (true, None, None),
            RetrievalStatus::Loaded { at, .. } => (
                false,
                None,
                Some(at.with_timezone(tz).format("%H:%M").to_string()),
            ),
            RetrievalStatus::Failed { message } => (false, Some(message.clone()), None),
        };

        Self {
            user_name: tab
                .session
                .profile()
                .map(|profile| profile.display_name().to_string())
                .unwrap_or_default(),
            theme: dashboard.theme().as_str(),
            rows: page.items.iter().map(|event| EventRow::new(event, tz)).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            filtered_count: page.filtered_count,
            total_count: page.total_count,
            title_query: criteria.title_query.clone(),
            min_date: criteria
                .min_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            loading,
            error,
            loaded_at,
            detail: dashboard
                .selected_event()
                .map(|event| EventDetail::from_event(event, tz)),
        }
    }
}
