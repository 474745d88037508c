use crate::error::{config_error, env_error, DashResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Where the optional settings file is looked up when `DASHBOARD_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_SESSION_IDLE_HOURS: i64 = 12;

/// Google endpoints used by the identity client and the event retriever
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub calendar_api_base: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            calendar_api_base: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

/// Main configuration structure for the dashboard
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client ID issued by Google
    pub google_client_id: String,
    /// OAuth client secret, required for "web application" clients only
    pub google_client_secret: Option<String>,
    /// Where Google sends the browser back after consent
    pub google_redirect_url: String,
    /// Calendar to read events from
    pub google_calendar_id: String,
    /// Timezone used to display event dates and times
    pub timezone: Tz,
    /// Interface the local server binds to
    pub host: String,
    /// Port the local server listens on
    pub port: u16,
    /// Open the dashboard in the default browser on startup
    pub open_browser: bool,
    /// Tabs not seen for this many hours are dropped
    pub session_idle_hours: i64,
    pub endpoints: GoogleEndpoints,
}

/// Settings that may come from the TOML file. Secrets are environment only.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub calendar_id: Option<String>,
    pub timezone: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub redirect_url: Option<String>,
    pub open_browser: Option<bool>,
    pub session_idle_hours: Option<i64>,
}

impl FileConfig {
    /// Read the settings file if it exists
    pub fn read(path: &Path) -> DashResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the environment and the settings file
    pub fn load() -> DashResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = FileConfig::read(Path::new(&path))?;

        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Build a config from a variable lookup and file settings. Variables win.
    pub fn from_sources<F>(var: F, file: FileConfig) -> DashResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let google_client_id = lookup("GOOGLE_CLIENT_ID").ok_or_else(|| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret = lookup("GOOGLE_CLIENT_SECRET");

        let host = lookup("HOST")
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid PORT value: {}", raw)))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let google_redirect_url = lookup("GOOGLE_REDIRECT_URL")
            .or(file.redirect_url)
            .unwrap_or_else(|| format!("http://localhost:{}/auth/callback", port));
        url::Url::parse(&google_redirect_url)
            .map_err(|e| config_error(&format!("Invalid redirect URL '{}': {}", google_redirect_url, e)))?;

        let google_calendar_id = lookup("GOOGLE_CALENDAR_ID")
            .or(file.calendar_id)
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let timezone_name = lookup("TIMEZONE")
            .or(file.timezone)
            .unwrap_or_else(|| String::from("UTC"));
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone_name)))?;

        let open_browser = match lookup("OPEN_BROWSER") {
            Some(raw) => parse_flag("OPEN_BROWSER", &raw)?,
            None => file.open_browser.unwrap_or(false),
        };

        let session_idle_hours = match lookup("SESSION_IDLE_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| config_error(&format!("Invalid SESSION_IDLE_HOURS value: {}", raw)))?,
            None => file.session_idle_hours.unwrap_or(DEFAULT_SESSION_IDLE_HOURS),
        };
        if session_idle_hours <= 0 {
            return Err(config_error("SESSION_IDLE_HOURS must be positive"));
        }

        let defaults = GoogleEndpoints::default();
        let endpoints = GoogleEndpoints {
            auth_url: lookup("GOOGLE_AUTH_URL").unwrap_or(defaults.auth_url),
            token_url: lookup("GOOGLE_TOKEN_URL").unwrap_or(defaults.token_url),
            userinfo_url: lookup("GOOGLE_USERINFO_URL").unwrap_or(defaults.userinfo_url),
            calendar_api_base: lookup("GOOGLE_CALENDAR_API_BASE").unwrap_or(defaults.calendar_api_base),
        };

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_redirect_url,
            google_calendar_id,
            timezone,
            host,
            port,
            open_browser,
            session_idle_hours,
            endpoints,
        })
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> DashResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| config_error(&format!("Invalid bind address {}:{}", self.host, self.port)))
    }

    /// URL of the dashboard as seen from this machine.
    ///
    /// Uses the redirect URL's origin so the session cookie survives the login round trip.
    pub fn public_url(&self) -> String {
        match url::Url::parse(&self.google_redirect_url) {
            Ok(url) => format!("{}/", url.origin().ascii_serialization()),
            Err(_) => format!("http://{}:{}/", self.host, self.port),
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> DashResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(config_error(&format!("Invalid {} value: {}", name, raw))),
    }
}
