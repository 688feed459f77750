//! Aggregate statistics and the Markdown document built from them.
//!
//! Rendering is pure: the run timestamp is passed in, so two runs over the
//! same repositories differ only in the "Generated on" line.
//!
//! Repository sections are ordered by last update, newest first, with ties
//! broken by name. "Most active" ranks by commit count; repositories whose
//! commit count could not be fetched are left out of that ranking.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{EnrichedRepository, Field, LanguageBreakdown, percentages};

pub const PRIMARY_LANGUAGE_LIMIT: usize = 5;
pub const MOST_ACTIVE_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStatistics {
    pub total_repositories: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    /// Byte share per language across all repositories, largest first.
    pub language_distribution: Vec<(String, f64)>,
    /// Languages used by the most repositories.
    pub primary_languages: Vec<String>,
    /// Names of the repositories with the most commits.
    pub most_active: Vec<String>,
}

impl AggregateStatistics {
    pub fn compute(repos: &[EnrichedRepository]) -> Self {
        let mut combined = LanguageBreakdown::new();
        let mut repo_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for repo in repos {
            for (lang, bytes) in &repo.languages {
                *combined.entry(lang.clone()).or_insert(0) += bytes;
                *repo_counts.entry(lang.as_str()).or_insert(0) += 1;
            }
        }

        let mut by_count: Vec<(&str, usize)> = repo_counts.into_iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let primary_languages = by_count
            .into_iter()
            .take(PRIMARY_LANGUAGE_LIMIT)
            .map(|(lang, _)| lang.to_string())
            .collect();

        let mut ranked: Vec<&EnrichedRepository> = repos
            .iter()
            .filter(|r| !r.is_degraded(Field::CommitCount))
            .collect();
        ranked.sort_by(|a, b| {
            b.commit_count
                .cmp(&a.commit_count)
                .then_with(|| a.name().cmp(b.name()))
        });
        let most_active = ranked
            .into_iter()
            .take(MOST_ACTIVE_LIMIT)
            .map(|r| r.name().to_string())
            .collect();

        Self {
            total_repositories: repos.len(),
            total_stars: repos.iter().map(|r| r.descriptor.stars).sum(),
            total_forks: repos.iter().map(|r| r.descriptor.forks).sum(),
            language_distribution: percentages(&combined),
            primary_languages,
            most_active,
        }
    }
}

/// `80%`, `33.3%`: one decimal, trailing `.0` dropped.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}

pub fn format_languages(shares: &[(String, f64)]) -> String {
    if shares.is_empty() {
        return "None".to_string();
    }
    shares
        .iter()
        .map(|(lang, pct)| format!("{lang}: {}", format_percent(*pct)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

pub fn render(username: &str, generated_at: DateTime<Utc>, repos: &[EnrichedRepository]) -> String {
    let stats = AggregateStatistics::compute(repos);
    let mut md = String::new();

    md.push_str("# GitHub Repository Summary\n\n");
    md.push_str(&format!(
        "*Generated on {}*\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "This document provides an overview of all original repositories created by \
         [{username}](https://github.com/{username}).\n\n"
    ));

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- Total Repositories: {}\n", stats.total_repositories));
    md.push_str(&format!("- Total Stars: {}\n", stats.total_stars));
    md.push_str(&format!("- Total Forks: {}\n", stats.total_forks));
    md.push_str(&format!(
        "- Primary Languages: {}\n",
        list_or(&stats.primary_languages, "None")
    ));
    md.push_str(&format!(
        "- Most Active Repositories: {}\n\n",
        list_or(&stats.most_active, "Unable to determine")
    ));

    md.push_str("## Languages\n\n");
    if stats.language_distribution.is_empty() {
        md.push_str("No language data available.\n\n");
    } else {
        md.push_str("| Language | Share |\n| --- | --- |\n");
        for (lang, pct) in &stats.language_distribution {
            md.push_str(&format!("| {lang} | {} |\n", format_percent(*pct)));
        }
        md.push('\n');
    }

    md.push_str("## Repositories\n\n");
    let mut ordered: Vec<&EnrichedRepository> = repos.iter().collect();
    ordered.sort_by(|a, b| {
        b.descriptor
            .updated_at
            .cmp(&a.descriptor.updated_at)
            .then_with(|| a.name().cmp(b.name()))
    });
    for repo in ordered {
        md.push_str(&render_repository(repo));
    }

    md
}

fn render_repository(repo: &EnrichedRepository) -> String {
    let d = &repo.descriptor;
    let commits = if repo.is_degraded(Field::CommitCount) {
        "Unknown".to_string()
    } else {
        repo.commit_count.to_string()
    };
    let description = if d.description.is_empty() {
        String::new()
    } else {
        format!("> {}\n\n", d.description)
    };

    format!(
        "### [{name}]({url})\n\n\
         - Created: {created}\n\
         - Last Updated: {updated}\n\
         - Stars: {stars}\n\
         - Forks: {forks}\n\
         - Languages: {languages}\n\
         - Commits: {commits}\n\
         - Topics: {topics}\n\n\
         {description}{summary}\n\n\
         ---\n\n",
        name = d.name,
        url = d.url,
        created = d.created_at.format("%Y-%m-%d"),
        updated = d.updated_at.format("%Y-%m-%d"),
        stars = d.stars,
        forks = d.forks,
        languages = format_languages(&repo.language_percentages()),
        topics = list_or(&d.topics, "None"),
        summary = repo.summary,
    )
}
