//! LLM-backed intent classification for queries the keywords cannot settle

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::{DomainError, Intent, IntentFallback};

/// Ollama's OpenAI-compatible endpoint
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";

pub const DEFAULT_LLM_MODEL: &str = "llama3";

/// Classifier calling an OpenAI-compatible chat completions endpoint
#[derive(Debug)]
pub struct LlmIntentFallback<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> LlmIntentFallback<C> {
    pub fn new(client: C, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            auth_header: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl AsRef<str>) -> Self {
        let api_key = api_key.as_ref();
        if !api_key.is_empty() {
            self.auth_header = Some(format!("Bearer {}", api_key));
        }
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = &self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }
}

fn classification_prompt(query: &str, history: &str) -> String {
    let history = if history.trim().is_empty() {
        "(New conversation)"
    } else {
        history
    };

    format!(
        "Classify this query into ONE of these categories: KNOWLEDGE, DATA, HYBRID, GENERAL\n\n\
         Query: {query}\n\n\
         Context from conversation:\n{history}\n\n\
         Classification Rules:\n\
         - KNOWLEDGE: Questions about documentation, procedures, deployment guides, configuration, architecture, or how-to instructions\n\
         - DATA: Questions about real-time metrics, current status, live system data, performance, or monitoring\n\
         - HYBRID: Questions that require BOTH documentation AND current data (e.g., comparing current status to guidelines)\n\
         - GENERAL: Casual conversation, greetings, explanations without specific data needs, or general questions\n\n\
         IMPORTANT: Respond with ONLY the classification name (KNOWLEDGE, DATA, HYBRID, or GENERAL). Nothing else."
    )
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl<C: HttpClientTrait> IntentFallback for LlmIntentFallback<C> {
    async fn classify(&self, query: &str, history: &str) -> Result<Intent, DomainError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": classification_prompt(query, history)}
            ],
            "temperature": 0,
        });

        let response = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &body)
            .await?;

        let response: CompletionResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("llm", format!("Failed to parse response: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::provider("llm", "No choices in response"))?;

        debug!(reply = %content.trim(), "LLM intent classification");

        Intent::from_label(&content).ok_or_else(|| {
            DomainError::provider(
                "llm",
                format!("Unrecognised classification '{}'", content.trim()),
            )
        })
    }
}
