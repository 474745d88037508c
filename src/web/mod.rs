//! HTTP surface of the dashboard: routes, the session guard and page rendering.

mod guard;
pub mod handlers;
mod views;

pub use guard::{require_session, CurrentTab, SESSION_COOKIE};
pub use handlers::{LOGIN_CANCELLED, LOGIN_EXPIRED, LOGIN_FAILED};

use crate::components::google_calendar::GoogleCalendarHandle;
use crate::components::identity::IdentityProvider;
use crate::components::session::SessionStore;
use crate::config::Config;
use crate::error::Error;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SessionStore>,
    pub calendar: GoogleCalendarHandle,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Build the full router. Dashboard routes sit behind the session guard.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/filter", post(handlers::apply_filter))
        .route("/filter/clear", post(handlers::clear_filter))
        .route("/page", post(handlers::go_to_page))
        .route("/page/next", post(handlers::next_page))
        .route("/page/prev", post(handlers::prev_page))
        .route("/events/{id}", get(handlers::show_event))
        .route("/detail/close", post(handlers::close_detail))
        .route("/theme", post(handlers::toggle_theme))
        .route("/refresh", post(handlers::refresh))
        .route("/export.csv", get(handlers::export_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/login", get(handlers::login_page))
        .route("/auth/google", get(handlers::start_login))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/logout", post(handlers::logout))
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Authentication(message) => {
                // Back to the login page; the reason is logged, not shown
                warn!("Authentication required: {}", message);
                handlers::login_redirect(LOGIN_FAILED).into_response()
            }
            err => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
