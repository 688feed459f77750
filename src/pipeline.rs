use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::llm::LlmClient;
use crate::model::EnrichedRepository;
use crate::{output, report};

pub struct Pipeline {
    github: GitHubClient,
    llm: LlmClient,
    username: String,
}

impl Pipeline {
    /// Builds separate HTTP clients so a slow local model gets a longer
    /// deadline than GitHub lookups.
    pub fn new(config: &Config) -> Result<Self> {
        let github_http = Client::builder().timeout(config.github_timeout).build()?;
        let llm_http = Client::builder().timeout(config.llm_timeout).build()?;
        Ok(Self {
            github: GitHubClient::new(github_http, config),
            llm: LlmClient::new(llm_http, config.llm_endpoint.clone()),
            username: config.github_username.clone(),
        })
    }

    /// Lists, enriches and summarizes every repository, one at a time.
    /// Only a listing failure is returned; per-repository failures degrade.
    pub async fn collect(&self) -> Result<Vec<EnrichedRepository>> {
        let repos = self.github.list_repositories(&self.username).await?;
        let total = repos.len();
        let mut enriched = Vec::with_capacity(total);
        for (i, repo) in repos.into_iter().enumerate() {
            info!(repo = %repo.name, "processing repository {}/{}", i + 1, total);
            let repo = self.github.enrich(repo).await;
            enriched.push(self.llm.summarize(repo).await);
        }
        Ok(enriched)
    }

    pub async fn render(&self, generated_at: DateTime<Utc>) -> Result<String> {
        let repos = self.collect().await?;
        Ok(report::render(&self.username, generated_at, &repos))
    }
}

/// One full run: collect, render and write. Returns the written file path.
pub async fn run(config: &Config) -> Result<PathBuf> {
    let generated_at = Utc::now();
    let markdown = Pipeline::new(config)?.render(generated_at).await?;
    let path = output::write_document(&config.output_dir, generated_at, &markdown)?;
    info!(path = %path.display(), "summary saved");
    Ok(path)
}
