use crate::components::google_calendar::{GoogleCalendarClient, GoogleCalendarHandle};
use crate::components::identity::GoogleIdentityClient;
use crate::components::session::{start_pruner, SessionStore};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use crate::web::{build_router, AppState};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the Google clients, the calendar actor and the tab registry together
pub fn build_state(config: Arc<Config>) -> AppState {
    let calendar = GoogleCalendarHandle::new(Arc::new(GoogleCalendarClient::from_config(&config)));
    let identity = Arc::new(GoogleIdentityClient::from_config(&config));
    let store = Arc::new(SessionStore::with_timezone(config.timezone));

    AppState {
        config,
        store,
        calendar,
        identity,
    }
}

/// Serve the dashboard until a shutdown signal arrives
pub async fn run(config: Arc<Config>) -> miette::Result<()> {
    let addr = config.bind_addr()?;
    let state = build_state(Arc::clone(&config));
    let pruner = start_pruner(Arc::clone(&state.store), config.session_idle_hours);
    let calendar = state.calendar.clone();

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;
    let url = config.public_url();
    info!("Dashboard listening on {}", url);

    if config.open_browser {
        if let Err(e) = webbrowser::open(&url) {
            warn!("Could not open a browser: {}", e);
        }
    }

    let result = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from);

    pruner.abort();
    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down calendar actor: {:?}", e);
    } else {
        info!("Calendar actor shut down successfully");
    }

    result?;
    Ok(())
}
