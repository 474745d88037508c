use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the dashboard
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(calendar_dashboard::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar_dashboard::config))]
    Config(String),

    /// The identity handshake failed or was cancelled
    #[error("Authentication failed: {0}")]
    #[diagnostic(
        code(calendar_dashboard::authentication),
        help("sign in again from the login page")
    )]
    Authentication(String),

    /// The calendar API could not be reached or returned something unusable
    #[error("Calendar retrieval failed: {0}")]
    #[diagnostic(code(calendar_dashboard::retrieval))]
    Retrieval(String),

    #[error("Template error: {0}")]
    #[diagnostic(code(calendar_dashboard::template))]
    Template(#[from] askama::Error),

    #[error(transparent)]
    #[diagnostic(code(calendar_dashboard::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_dashboard::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar_dashboard::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type DashResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create calendar retrieval errors
pub fn retrieval_error(message: &str) -> Error {
    Error::Retrieval(message.to_string())
}
