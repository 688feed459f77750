use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials were rejected (HTTP 401/403).
    #[error("GitHub rejected the credentials (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("GitHub API rate limit exhausted; {}", retry_hint(.retry_after))]
    RateLimit { retry_after: Option<String> },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn retry_hint(retry_after: &Option<String>) -> String {
    match retry_after {
        Some(hint) => format!("retry after {hint}"),
        None => "retry later".to_string(),
    }
}

impl Error {
    /// True when a GitHub lookup failed because the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Http { status: 404, .. })
    }
}
