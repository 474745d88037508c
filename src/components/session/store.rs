use super::Session;
use crate::components::dashboard::{DashboardAction, DashboardState};
use crate::components::identity::{AccessToken, UserProfile};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// How long a started login may take before its `state` is rejected
pub const PENDING_LOGIN_TTL_MINUTES: i64 = 10;

/// Opaque identifier of a browser tab, carried in a cookie
pub type TabId = String;

/// Everything one tab holds
#[derive(Debug, Clone)]
pub struct Tab {
    pub session: Session,
    pub dashboard: DashboardState,
    pub last_seen: DateTime<Utc>,
}

impl Tab {
    fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            session: Session::default(),
            dashboard: DashboardState::new(timezone),
            last_seen: now,
        }
    }
}

/// A login that was sent to the provider and has not come back yet
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub code_verifier: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory registry of tabs and pending logins
#[derive(Debug)]
pub struct SessionStore {
    tabs: RwLock<HashMap<TabId, Tab>>,
    pending: RwLock<HashMap<String, PendingLogin>>,
    /// Display timezone handed to every new dashboard
    timezone: Tz,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_timezone(Tz::UTC)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            tabs: RwLock::new(HashMap::new()),
            pending: RwLock::new(HashMap::new()),
            timezone,
        }
    }

    /// Fresh random tab id
    pub fn new_tab_id() -> TabId {
        uuid::Uuid::new_v4().to_string()
    }

    /// Copy of a tab's current state
    pub async fn snapshot(&self, id: &str) -> Option<Tab> {
        let tabs = self.tabs.read().await;
        tabs.get(id).cloned()
    }

    /// Check that a tab is signed in with a live token, marking it as seen.
    ///
    /// A tab whose token has expired is logged out on the spot.
    pub async fn check_authenticated(&self, id: &str, now: DateTime<Utc>) -> bool {
        let mut tabs = self.tabs.write().await;
        let Some(tab) = tabs.get_mut(id) else {
            return false;
        };
        tab.last_seen = now;

        if tab.session.is_authenticated() && tab.session.is_expired(now) {
            info!("Access token expired, signing tab out");
            tab.session.logout();
            tab.dashboard = std::mem::take(&mut tab.dashboard).apply(DashboardAction::Reset);
        }

        tab.session.is_authenticated()
    }

    /// Sign a tab in, creating it if needed. The dashboard starts over.
    pub async fn login(&self, id: &str, profile: UserProfile, token: AccessToken, now: DateTime<Utc>) {
        let mut tabs = self.tabs.write().await;
        let tab = tabs.entry(id.to_string()).or_insert_with(|| Tab::new(now, self.timezone));

        tab.session.login(profile, token);
        tab.dashboard = std::mem::take(&mut tab.dashboard).apply(DashboardAction::Reset);
        tab.last_seen = now;
    }

    /// Sign a tab out. The tab is kept so its generation keeps counting.
    pub async fn logout(&self, id: &str) {
        let mut tabs = self.tabs.write().await;
        if let Some(tab) = tabs.get_mut(id) {
            tab.session.logout();
            tab.dashboard = std::mem::take(&mut tab.dashboard).apply(DashboardAction::Reset);
        }
    }

    /// Apply a dashboard action to a tab. Returns false if the tab is unknown.
    pub async fn dispatch(&self, id: &str, action: DashboardAction) -> bool {
        let mut tabs = self.tabs.write().await;
        match tabs.get_mut(id) {
            Some(tab) => {
                tab.dashboard = std::mem::take(&mut tab.dashboard).apply(action);
                true
            }
            None => {
                debug!("Dropping dashboard action for unknown tab");
                false
            }
        }
    }

    /// Mark a retrieval as started and hand out what it needs.
    ///
    /// Returns `None` when the tab is not signed in, so no request is made.
    pub async fn begin_retrieval(&self, id: &str) -> Option<(u64, AccessToken)> {
        let mut tabs = self.tabs.write().await;
        let tab = tabs.get_mut(id)?;
        let token = tab.session.access_token()?.clone();

        tab.dashboard = std::mem::take(&mut tab.dashboard).apply(DashboardAction::RetrievalStarted);
        Some((tab.dashboard.generation(), token))
    }

    /// Remember the PKCE verifier for a login identified by its `state`
    pub async fn insert_pending(&self, state: &str, code_verifier: String, now: DateTime<Utc>) {
        let mut pending = self.pending.write().await;
        pending.insert(
            state.to_string(),
            PendingLogin {
                code_verifier,
                created_at: now,
            },
        );
    }

    /// Take a pending login. Each `state` works once and only while fresh.
    pub async fn take_pending(&self, state: &str, now: DateTime<Utc>) -> Option<PendingLogin> {
        let mut pending = self.pending.write().await;
        let login = pending.remove(state)?;

        if now - login.created_at > Duration::minutes(PENDING_LOGIN_TTL_MINUTES) {
            debug!("Pending login expired");
            return None;
        }
        Some(login)
    }

    /// Drop idle tabs and abandoned logins. Returns how many tabs were removed.
    pub async fn prune(&self, now: DateTime<Utc>, idle: Duration) -> usize {
        let removed = {
            let mut tabs = self.tabs.write().await;
            let before = tabs.len();
            tabs.retain(|_, tab| now - tab.last_seen <= idle);
            before - tabs.len()
        };

        let mut pending = self.pending.write().await;
        pending.retain(|_, login| now - login.created_at <= Duration::minutes(PENDING_LOGIN_TTL_MINUTES));

        removed
    }

    pub async fn tab_count(&self) -> usize {
        self.tabs.read().await.len()
    }
}
