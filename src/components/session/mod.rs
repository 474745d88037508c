mod pruner;
mod store;

pub use pruner::start_pruner;
pub use store::{PendingLogin, SessionStore, Tab, TabId, PENDING_LOGIN_TTL_MINUTES};

use crate::components::identity::{AccessToken, UserProfile};
use chrono::{DateTime, Utc};

/// Who is signed in to a tab, held in memory only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    access_token: Option<AccessToken>,
    profile: Option<UserProfile>,
}

impl Session {
    /// Record the identity returned by the provider
    pub fn login(&mut self, profile: UserProfile, access_token: AccessToken) {
        self.profile = Some(profile);
        self.access_token = Some(access_token);
        self.authenticated = true;
    }

    /// Forget the identity and the token
    pub fn logout(&mut self) {
        self.profile = None;
        self.access_token = None;
        self.authenticated = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether the token is known to have run out
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_token
            .as_ref()
            .is_some_and(|token| token.is_expired(now))
    }

    /// The bearer token, only while signed in
    pub fn access_token(&self) -> Option<&AccessToken> {
        if self.authenticated {
            self.access_token.as_ref()
        } else {
            None
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }
}
