pub mod dashboard;
pub mod google_calendar;
pub mod identity;
pub mod session;
