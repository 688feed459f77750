use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::github::{GitHubClient, last_page};
use crate::model::{EnrichedRepository, Field, LanguageBreakdown, RepositoryDescriptor};

/// Outcome of a single enrichment lookup: the value, or the field default
/// plus the error that forced it.
#[derive(Debug)]
pub struct Lookup<T> {
    pub value: T,
    pub error: Option<Error>,
}

impl<T: Default> Lookup<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self { value, error: None },
            Err(error) => Self {
                value: T::default(),
                error: Some(error),
            },
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Deserialize)]
struct ReadmePayload {
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitHubClient {
    pub async fn languages(&self, repo: &RepositoryDescriptor) -> Result<LanguageBreakdown> {
        self.get_json(&self.repo_url(&repo.owner.login, &repo.name, "languages"))
            .await
    }

    /// Commit count taken from the `rel="last"` page of a one-per-page
    /// listing, so no commit bodies are enumerated.
    pub async fn commit_count(&self, repo: &RepositoryDescriptor) -> Result<u64> {
        let url = self.repo_url(&repo.owner.login, &repo.name, "commits");
        let resp = self.send(self.get(&url).query(&[("per_page", 1)])).await?;
        if let Some(last) = last_page(resp.headers()) {
            return Ok(last);
        }
        let body = resp.text().await?;
        let commits: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| Error::Decode(format!("{url}: {e}")))?;
        Ok(commits.len() as u64)
    }

    pub async fn readme(&self, repo: &RepositoryDescriptor) -> Result<String> {
        let url = self.repo_url(&repo.owner.login, &repo.name, "readme");
        let payload: ReadmePayload = self.get_json(&url).await?;
        decode_readme(&payload)
    }

    /// Runs the three lookups for `repo`. Never fails: a lookup error
    /// degrades only its own field.
    pub async fn enrich(&self, repo: RepositoryDescriptor) -> EnrichedRepository {
        let languages = Lookup::from_result(self.languages(&repo).await);
        let commits = Lookup::from_result(self.commit_count(&repo).await);
        let readme = Lookup::from_result(self.readme(&repo).await);

        let mut degraded = Vec::new();
        note(&repo.name, Field::Languages, &languages, &mut degraded);
        note(&repo.name, Field::CommitCount, &commits, &mut degraded);
        note(&repo.name, Field::Readme, &readme, &mut degraded);

        EnrichedRepository {
            descriptor: repo,
            languages: languages.value,
            commit_count: commits.value,
            readme: readme.value,
            summary: String::new(),
            degraded,
        }
    }
}

fn note<T>(repo: &str, field: Field, lookup: &Lookup<T>, degraded: &mut Vec<Field>) {
    let Some(err) = &lookup.error else { return };
    degraded.push(field);
    // Missing READMEs are common enough not to warn about.
    if field == Field::Readme && err.is_not_found() {
        debug!(repo, "no README");
    } else {
        warn!(repo, ?field, error = %err, "lookup failed, using default");
    }
}

fn decode_readme(payload: &ReadmePayload) -> Result<String> {
    if !payload.encoding.is_empty() && payload.encoding != "base64" {
        return Err(Error::Decode(format!(
            "unsupported README encoding {:?}",
            payload.encoding
        )));
    }
    let compact: String = payload
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Error::Decode(format!("README base64: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
