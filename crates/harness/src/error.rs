//! Error types for the regression harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Server at {url} is not healthy: {reason}")]
    Unhealthy { url: String, reason: String },

    #[error("Invalid rule '{kind}': {source}")]
    InvalidRule {
        kind: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Run failed: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
