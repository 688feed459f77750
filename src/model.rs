use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Language name to byte count, as reported by GitHub.
pub type LanguageBreakdown = BTreeMap<String, u64>;

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// One repository as returned by the user repository listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub owner: Owner,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub fork: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    #[serde(rename = "forks_count")]
    pub forks: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub default_branch: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Enrichment fields that fell back to their default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Languages,
    CommitCount,
    Readme,
    Summary,
}

#[derive(Debug, Clone)]
pub struct EnrichedRepository {
    pub descriptor: RepositoryDescriptor,
    pub languages: LanguageBreakdown,
    pub commit_count: u64,
    pub readme: String,
    pub summary: String,
    pub degraded: Vec<Field>,
}

impl EnrichedRepository {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_degraded(&self, field: Field) -> bool {
        self.degraded.contains(&field)
    }

    /// Per-language share of this repository's bytes, largest first.
    pub fn language_percentages(&self) -> Vec<(String, f64)> {
        percentages(&self.languages)
    }
}

/// Share of each language in `bytes`, ordered by size then name.
/// Empty when there is no data; otherwise the shares sum to 100.
pub fn percentages(bytes: &LanguageBreakdown) -> Vec<(String, f64)> {
    let total: u64 = bytes.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut shares: Vec<(String, u64)> = bytes
        .iter()
        .filter(|(_, b)| **b > 0)
        .map(|(lang, b)| (lang.clone(), *b))
        .collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares
        .into_iter()
        .map(|(lang, b)| (lang, b as f64 * 100.0 / total as f64))
        .collect()
}
