pub mod detail;
pub mod export;
pub mod filter;
pub mod pagination;
mod retrieval;
mod state;

pub use detail::{sanitize_description, EventDetail, NO_DESCRIPTION};
pub use export::{to_csv, EXPORT_FILE_NAME};
pub use filter::FilterCriteria;
pub use pagination::PAGE_SIZE;
pub use retrieval::refresh_events;
pub use state::{DashboardAction, DashboardState, PageView, RetrievalStatus, Theme};
