mod actor;
pub mod client;
mod handle;
pub mod mapper;
pub mod models;
pub mod time;

pub use client::{EventSource, GoogleCalendarClient, MAX_RESULTS};
pub use handle::GoogleCalendarHandle;
pub use models::{CalendarEvent, Category, EventStart};
pub use time::EventWindow;
