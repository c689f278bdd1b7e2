use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("invalid product name: {product}. Choose from: {}", .allowed.join(", "))]
    InvalidProduct {
        product: String,
        allowed: Vec<String>,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("API returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("error parsing JSON response: {0}")]
    UpstreamSchema(#[source] serde_json::Error),

    #[error("retry deadline of {deadline:?} exceeded (next backoff {backoff:?})")]
    RetryDeadline { deadline: Duration, backoff: Duration },

    #[error("error saving reviews to {}: {message}", .path.display())]
    Persist { path: PathBuf, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// Errors confined to a single product fetch. The orchestrator masks these
    /// with fallback records instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::UpstreamStatus { .. }
                | Error::UpstreamSchema(_)
                | Error::RetryDeadline { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
