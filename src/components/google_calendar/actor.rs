use super::client::EventSource;
use super::models::CalendarEvent;
use super::time::EventWindow;
use crate::error::{retrieval_error, DashResult};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// The Google Calendar actor that runs retrievals one at a time
pub struct GoogleCalendarActor {
    source: Arc<dyn EventSource>,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    FetchEvents {
        access_token: String,
        window: EventWindow,
        respond_to: oneshot::Sender<DashResult<Vec<CalendarEvent>>>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Fetch events for the given window
    pub async fn fetch_events(&self, access_token: &str, window: EventWindow) -> DashResult<Vec<CalendarEvent>> {
        let (respond_to, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::FetchEvents {
                access_token: access_token.to_string(),
                window,
                respond_to,
            })
            .await
            .map_err(|e| retrieval_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| retrieval_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> DashResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(source: Arc<dyn EventSource>) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self { source, command_rx };
        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::FetchEvents {
                    access_token,
                    window,
                    respond_to,
                } => {
                    let result = self.source.fetch_events(&access_token, window).await;
                    // The requester may have gone away; nothing to do then
                    let _ = respond_to.send(result);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }
}
