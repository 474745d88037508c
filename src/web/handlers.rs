use super::guard::{session_cookie, tab_id, CurrentTab, SESSION_COOKIE};
use super::views::{DashboardView, LoginView};
use super::AppState;
use crate::components::dashboard::{
    refresh_events, to_csv, DashboardAction, FilterCriteria, RetrievalStatus, EXPORT_FILE_NAME,
};
use crate::components::identity::pkce::random_token;
use crate::components::identity::PkceChallenge;
use crate::components::session::SessionStore;
use crate::error::{auth_error, DashResult};
use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub const LOGIN_CANCELLED: &str = "Sign-in was cancelled";
pub const LOGIN_EXPIRED: &str = "Sign-in took too long, please try again";
pub const LOGIN_FAILED: &str = "Could not sign in with Google";

/// The only messages the login page will display
const ALLOWED_ERROR_MESSAGES: [&str; 3] = [LOGIN_CANCELLED, LOGIN_EXPIRED, LOGIN_FAILED];

/// Redirect to the login page carrying one of the allowed messages
pub fn login_redirect(message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("/login?error={}", encoded))
}

fn back_to_dashboard() -> Redirect {
    Redirect::to("/")
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Handler for the login page
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> DashResult<Response> {
    if let Some(id) = tab_id(&jar) {
        if state.store.check_authenticated(&id, Utc::now()).await {
            return Ok(back_to_dashboard().into_response());
        }
    }

    // Anything outside the allowed list is not echoed back
    let error = query
        .error
        .as_deref()
        .and_then(|message| ALLOWED_ERROR_MESSAGES.iter().copied().find(|allowed| *allowed == message));

    let view = LoginView { error };
    Ok(Html(view.render()?).into_response())
}

/// Start the authorization-code flow
pub async fn start_login(State(state): State<AppState>, jar: CookieJar) -> DashResult<(CookieJar, Redirect)> {
    let id = tab_id(&jar).unwrap_or_else(SessionStore::new_tab_id);
    let challenge = PkceChallenge::generate();
    let login_state = random_token();

    let url = state.identity.authorization_url(&login_state, &challenge)?;
    state
        .store
        .insert_pending(&login_state, challenge.code_verifier, Utc::now())
        .await;

    debug!("Redirecting to identity provider");
    Ok((jar.add(session_cookie(id)), Redirect::to(url.as_str())))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Where the identity provider sends the browser back
pub async fn auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        info!("Identity provider returned an error: {}", error);
        return login_redirect(LOGIN_CANCELLED).into_response();
    }

    let (Some(code), Some(login_state)) = (query.code, query.state) else {
        warn!("Callback without code or state");
        return login_redirect(LOGIN_FAILED).into_response();
    };

    let Some(pending) = state.store.take_pending(&login_state, Utc::now()).await else {
        warn!("Callback with unknown or expired state");
        return login_redirect(LOGIN_EXPIRED).into_response();
    };

    let token = match state.identity.exchange_code(&code, &pending.code_verifier).await {
        Ok(token) => token,
        Err(e) => {
            warn!("Code exchange failed: {}", e);
            return login_redirect(LOGIN_FAILED).into_response();
        }
    };

    let profile = match state.identity.user_info(&token).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Fetching the user profile failed: {}", e);
            return login_redirect(LOGIN_FAILED).into_response();
        }
    };

    let id = tab_id(&jar).unwrap_or_else(SessionStore::new_tab_id);
    info!("Signed in as {}", profile.display_name());
    state.store.login(&id, profile, token, Utc::now()).await;

    (jar.add(session_cookie(id)), back_to_dashboard()).into_response()
}

/// Sign out and forget the tab cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(id) = tab_id(&jar) {
        state.store.logout(&id).await;
        info!("Signed out");
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}

/// Handler for health checks
pub async fn health() -> &'static str {
    "OK"
}

/// The dashboard page. The first visit after login loads the events.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(CurrentTab(id)): Extension<CurrentTab>,
) -> DashResult<Html<String>> {
    let needs_load = state
        .store
        .snapshot(&id)
        .await
        .is_some_and(|tab| tab.dashboard.retrieval() == &RetrievalStatus::Idle);

    if needs_load {
        refresh_events(&state.store, &id, &state.calendar).await?;
    }

    let tab = state
        .store
        .snapshot(&id)
        .await
        .ok_or_else(|| auth_error("Tab disappeared"))?;

    let view = DashboardView::from_tab(&tab, &state.config.timezone);
    Ok(Html(view.render()?))
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub min_date: String,
}

/// Blank or malformed dates mean no date filter
fn parse_min_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("Ignoring invalid min date '{}': {}", raw, e);
            None
        }
    }
}

pub async fn apply_filter(
    State(state): State<AppState>,
    Extension(CurrentTab(id)): Extension<CurrentTab>,
    Form(form): Form<FilterForm>,
) -> Redirect {
    let criteria = FilterCriteria {
        min_date: parse_min_date(&form.min_date),
        title_query: form.title,
    };
    state.store.dispatch(&id, DashboardAction::SetFilter(criteria)).await;
    back_to_dashboard()
}

pub async fn clear_filter(State(state): State<AppState>, Extension(CurrentTab(id)): Extension<CurrentTab>) -> Redirect {
    state.store.dispatch(&id, DashboardAction::ClearFilters).await;
    back_to_dashboard()
}

#[derive(Debug, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub page: String,
}

/// Anything that is not a page number leaves the page alone
fn parse_page(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(page) => Some(page),
        Err(e) => {
            debug!("Ignoring invalid page '{}': {}", raw, e);
            None
        }
    }
}

pub async fn go_to_page(
    State(state): State<AppState>,
    Extension(CurrentTab(id)): Extension<CurrentTab>,
    Form(form): Form<PageForm>,
) -> Redirect {
    if let Some(page) = parse_page(&form.page) {
        state.store.dispatch(&id, DashboardAction::GoToPage(page)).await;
    }
    back_to_dashboard()
}

pub async fn next_page(State(state): State<AppState>, Extension(CurrentTab(id)): Extension<CurrentTab>) -> Redirect {
    state.store.dispatch(&id, DashboardAction::NextPage).await;
    back_to_dashboard()
}

pub async fn prev_page(State(state): State<AppState>, Extension(CurrentTab(id)): Extension<CurrentTab>) -> Redirect {
    state.store.dispatch(&id, DashboardAction::PrevPage).await;
    back_to_dashboard()
}

/// Open the detail overlay for one event
pub async fn show_event(
    State(state): State<AppState>,
    Extension(CurrentTab(id)): Extension<CurrentTab>,
    Path(event_id): Path<String>,
) -> Redirect {
    state.store.dispatch(&id, DashboardAction::SelectEvent(event_id)).await;
    back_to_dashboard()
}

pub async fn close_detail(State(state): State<AppState>, Extension(CurrentTab(id)): Extension<CurrentTab>) -> Redirect {
    state.store.dispatch(&id, DashboardAction::CloseDetail).await;
    back_to_dashboard()
}

pub async fn toggle_theme(State(state): State<AppState>, Extension(CurrentTab(id)): Extension<CurrentTab>) -> Redirect {
    state.store.dispatch(&id, DashboardAction::ToggleTheme).await;
    back_to_dashboard()
}

/// Load the events again, also used as the retry after a failure
pub async fn refresh(
    State(state): State<AppState>,
    Extension(CurrentTab(id)): Extension<CurrentTab>,
) -> DashResult<Redirect> {
    refresh_events(&state.store, &id, &state.calendar).await?;
    Ok(back_to_dashboard())
}

/// Download the filtered events as CSV
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(CurrentTab(id)): Extension<CurrentTab>,
) -> DashResult<Response> {
    let tab = state
        .store
        .snapshot(&id)
        .await
        .ok_or_else(|| auth_error("Tab disappeared"))?;

    let filtered = tab.dashboard.filtered();
    let csv = to_csv(filtered.iter().copied());
    info!("Exporting {} events", filtered.len());

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
        ),
    ];
    Ok((headers, csv).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_min_date() {
        assert_eq!(parse_min_date(""), None);
        assert_eq!(parse_min_date("  "), None);
        assert_eq!(parse_min_date("2024-01-07"), NaiveDate::from_ymd_opt(2024, 1, 7));
        assert_eq!(parse_min_date("07/01/2024"), None);
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("2"), Some(2));
        assert_eq!(parse_page(" 3 "), Some(3));
        assert_eq!(parse_page(""), None);
        assert_eq!(parse_page("abc"), None);
        assert_eq!(parse_page("-2"), None);
        assert_eq!(parse_page("1.5"), None);
    }

    #[test]
    fn test_login_redirect_is_encoded() {
        let response = login_redirect(LOGIN_EXPIRED).into_response();
        let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "/login?error=Sign-in+took+too+long%2C+please+try+again");
    }
}
