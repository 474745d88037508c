use super::DashboardAction;
use crate::components::google_calendar::{EventWindow, GoogleCalendarHandle};
use crate::components::session::SessionStore;
use crate::error::{auth_error, DashResult};
use chrono::Utc;
use tracing::{info, warn};

/// Retrieve the last year of events for a tab and fold the outcome into its dashboard.
///
/// Fails with an authentication error when the tab is not signed in; no request
/// is made in that case. A failed request is not an error here: it is recorded
/// on the dashboard so the page can offer a retry.
pub async fn refresh_events(store: &SessionStore, tab_id: &str, calendar: &GoogleCalendarHandle) -> DashResult<()> {
    let Some((generation, token)) = store.begin_retrieval(tab_id).await else {
        return Err(auth_error("Sign in to load your calendar"));
    };

    let window = EventWindow::ending_at(Utc::now());
    let action = match calendar.fetch_events(token.secret(), window).await {
        Ok(events) => {
            info!("Loaded {} events (retrieval {})", events.len(), generation);
            DashboardAction::EventsLoaded {
                generation,
                events,
                at: Utc::now(),
            }
        }
        Err(e) => {
            warn!("Retrieval {} failed: {}", generation, e);
            DashboardAction::RetrievalFailed {
                generation,
                message: e.to_string(),
            }
        }
    };

    store.dispatch(tab_id, action).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::dashboard::RetrievalStatus;
    use crate::components::google_calendar::{CalendarEvent, Category, EventSource, EventStart};
    use crate::components::identity::{AccessToken, UserProfile};
    use crate::error::{retrieval_error, Error};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl EventSource for FixedSource {
        async fn fetch_events(&self, access_token: &str, _window: EventWindow) -> DashResult<Vec<CalendarEvent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(access_token, "token");
            if self.fail {
                return Err(retrieval_error("Calendar API returned 500"));
            }
            Ok(vec![CalendarEvent {
                id: "gym".to_string(),
                title: "Gym".to_string(),
                start: EventStart::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
                description: None,
                category: Category::Personal,
            }])
        }
    }

    fn source(fail: bool) -> Arc<FixedSource> {
        Arc::new(FixedSource {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn test_refresh_loads_events() {
        let source = source(false);
        let calendar = GoogleCalendarHandle::new(source.clone());
        let store = SessionStore::new();
        store
            .login("tab", UserProfile::default(), AccessToken::new("token", None), Utc::now())
            .await;

        refresh_events(&store, "tab", &calendar).await.unwrap();

        let tab = store.snapshot("tab").await.unwrap();
        assert_eq!(tab.dashboard.events().len(), 1);
        assert!(matches!(tab.dashboard.retrieval(), RetrievalStatus::Loaded { count: 1, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_records_failure() {
        let calendar = GoogleCalendarHandle::new(source(true));
        let store = SessionStore::new();
        store
            .login("tab", UserProfile::default(), AccessToken::new("token", None), Utc::now())
            .await;

        refresh_events(&store, "tab", &calendar).await.unwrap();

        let tab = store.snapshot("tab").await.unwrap();
        assert!(tab.dashboard.events().is_empty());
        assert!(matches!(tab.dashboard.retrieval(), RetrievalStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_refresh_without_login_makes_no_request() {
        let source = source(false);
        let calendar = GoogleCalendarHandle::new(source.clone());
        let store = SessionStore::new();

        let result = refresh_events(&store, "tab", &calendar).await;
        assert!(matches!(result, Err(Error::Authentication(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
