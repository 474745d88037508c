use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::client::EventSource;
use super::models::CalendarEvent;
use super::time::EventWindow;
use crate::error::DashResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(source);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Fetch the signed-in user's events for a window
    pub async fn fetch_events(&self, access_token: &str, window: EventWindow) -> DashResult<Vec<CalendarEvent>> {
        self.actor_handle.fetch_events(access_token, window).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> DashResult<()> {
        self.actor_handle.shutdown().await
    }
}
