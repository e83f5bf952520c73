use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the remote sports-data API layer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no API key configured (set API_FOOTBALL_KEY in .env)")]
    NoCredentials,

    #[error("rate limited by remote API")]
    RateLimited,

    #[error("http {status}: {snippet}")]
    Http { status: u16, snippet: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Run-level failures; each maps to a process exit code.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("team not found via API search: {0}")]
    TeamNotFound(String),

    #[error("fallback data file not found at {}", .0.display())]
    FallbackMissing(PathBuf),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Api(_) | RunError::Other(_) => 1,
            RunError::TeamNotFound(_) => 2,
            RunError::FallbackMissing(_) => 3,
        }
    }
}
