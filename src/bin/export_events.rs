use calendar_dashboard::components::dashboard::filter::{filter, FilterCriteria};
use calendar_dashboard::components::dashboard::to_csv;
use calendar_dashboard::components::google_calendar::{EventSource, EventWindow, GoogleCalendarClient};
use calendar_dashboard::config::GoogleEndpoints;
use calendar_dashboard::error::{config_error, env_error, DashResult};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::env;
use std::fs;

/// Non-empty value of an environment variable
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[tokio::main]
async fn main() -> DashResult<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let access_token = var("GOOGLE_ACCESS_TOKEN").ok_or_else(|| env_error("GOOGLE_ACCESS_TOKEN"))?;
    let calendar_id = var("GOOGLE_CALENDAR_ID").unwrap_or_else(|| "primary".to_string());
    let api_base = var("GOOGLE_CALENDAR_API_BASE").unwrap_or_else(|| GoogleEndpoints::default().calendar_api_base);

    let min_date = match var("EXPORT_MIN_DATE") {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| config_error(&format!("Invalid EXPORT_MIN_DATE value: {}", raw)))?,
        ),
        None => None,
    };
    let timezone_name = var("TIMEZONE").unwrap_or_else(|| "UTC".to_string());
    let timezone: Tz = timezone_name
        .parse()
        .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone_name)))?;
    let criteria = FilterCriteria {
        min_date,
        title_query: var("EXPORT_TITLE").unwrap_or_default(),
    };

    let client = GoogleCalendarClient::new(&api_base, &calendar_id);
    let events = client
        .fetch_events(&access_token, EventWindow::ending_at(Utc::now()))
        .await?;
    let filtered = filter(&events, &criteria, &timezone);
    let csv = to_csv(filtered.iter().copied());

    match var("EXPORT_OUTPUT") {
        Some(path) => {
            fs::write(&path, csv)?;
            eprintln!("Wrote {} of {} events to {}", filtered.len(), events.len(), path);
        }
        None => print!("{}", csv),
    }

    Ok(())
}
