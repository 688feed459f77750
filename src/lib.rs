//! Summarizes every original (non-fork) repository of a GitHub user into a
//! single Markdown document, with a short description of each repository
//! written by a local LLM.

pub mod config;
pub mod error;
pub mod explorer;
pub mod github;
pub mod llm;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod summarizer;

pub use config::Config;
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use llm::{FALLBACK_SUMMARY, LlmClient};
pub use model::{EnrichedRepository, RepositoryDescriptor};
pub use pipeline::{Pipeline, run};
