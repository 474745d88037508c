use super::AppState;
use crate::components::session::TabId;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::debug;

/// Name of the cookie identifying a tab
pub const SESSION_COOKIE: &str = "dashboard_session";

/// The signed-in tab a guarded request belongs to
#[derive(Debug, Clone)]
pub struct CurrentTab(pub TabId);

/// Tab id carried by the request, if any
pub fn tab_id(jar: &CookieJar) -> Option<TabId> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: TabId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Let a request through only for a signed-in tab with a live token.
///
/// Everyone else is sent to the login page before any handler runs.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(id) = tab_id(&jar) else {
        debug!("No session cookie, redirecting to login");
        return Redirect::to("/login").into_response();
    };

    if !state.store.check_authenticated(&id, Utc::now()).await {
        debug!("Tab is not signed in, redirecting to login");
        return Redirect::to("/login").into_response();
    }

    req.extensions_mut().insert(CurrentTab(id));
    next.run(req).await
}
