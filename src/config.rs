use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_TIMEOUT: Duration = Duration::from_secs(30);
/// Local models can take minutes to write a few paragraphs.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for one run, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_endpoint: String,
    pub github_token: String,
    pub github_username: String,
    pub output_dir: PathBuf,
    pub github_api_url: String,
    /// Deadline for each GitHub request, connection through body.
    pub github_timeout: Duration,
    /// Deadline for each completion request.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("environment variable {key} is not set")))
        };

        let llm_endpoint = required("LOCAL_LLM_API")?;
        let github_token = required("GITHUB_TOKEN")?;
        let github_username = required("GITHUB_USERNAME")?;
        let output_dir = expand_home(&required("OUTPUT_DIR")?)?;

        let github_api_url = lookup("GITHUB_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        let github_timeout = timeout(&lookup, "GITHUB_TIMEOUT_SECS", DEFAULT_GITHUB_TIMEOUT)?;
        let llm_timeout = timeout(&lookup, "LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT)?;

        Ok(Self {
            llm_endpoint,
            github_token,
            github_username,
            output_dir,
            github_api_url,
            github_timeout,
            llm_timeout,
        })
    }
}

fn timeout<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::Config(format!(
            "{key} must be a positive number of seconds, got {raw:?}"
        ))),
    }
}

fn expand_home(raw: &str) -> Result<PathBuf> {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(raw)),
    };
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("cannot determine home directory for OUTPUT_DIR".into()))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}
