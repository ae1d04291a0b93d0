//! Error types for the walkthrough

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Driver failed to start: {0}")]
    DriverStartup(String),

    #[error("Driver error during {op}: {reason}")]
    Driver { op: String, reason: String },

    #[error("Driver exited unexpectedly")]
    DriverClosed,

    #[error("Unexpected driver reply for {op}: {value}")]
    UnexpectedReply { op: String, value: serde_json::Value },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("No element matches marker '{0}'")]
    MarkerNotFound(String),

    #[error("Application unreachable at {url} after {attempts} attempts")]
    Unreachable { url: String, attempts: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
