use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{EnrichedRepository, Field};
use crate::summarizer;

pub const FALLBACK_SUMMARY: &str = "Summary unavailable.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    mode: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Client for a local chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    endpoint: String,
}

impl LlmClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            mode: "instruct",
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(Error::Llm(format!("status {status}: {body}")));
        }

        let text = resp.text().await.map_err(|e| Error::Llm(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Llm(format!("malformed response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::Llm("response has no choices".to_string()))?;
        if content.is_empty() {
            return Err(Error::Llm("response content is empty".to_string()));
        }
        Ok(content)
    }

    /// Attaches a summary to `repo`, substituting [`FALLBACK_SUMMARY`] if the
    /// endpoint fails.
    pub async fn summarize(&self, mut repo: EnrichedRepository) -> EnrichedRepository {
        info!(repo = repo.name(), "generating summary");
        let prompt = summarizer::build_prompt(&repo);
        match self.complete(&prompt).await {
            Ok(summary) => repo.summary = summary,
            Err(err) => {
                warn!(repo = repo.name(), error = %err, "summary generation failed");
                repo.summary = FALLBACK_SUMMARY.to_string();
                repo.degraded.push(Field::Summary);
            }
        }
        repo
    }
}
