use super::Summarizer;
use crate::config::SummaryConfig;
use crate::error::{Error, Result};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SYSTEM_PROMPT: &str = include_str!("./prompts/system.txt");

/// Summarizer backed by an OpenAI-compatible chat completions endpoint
pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    max_input_chars: usize,
    language: String,
}

impl OpenAiSummarizer {
    /// Build a client from configuration
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &SummaryConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.as_ref().filter(|key| !key.trim().is_empty()) else {
            return Ok(None);
        };

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Some(Self {
            client,
            api_key: api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_input_chars: config.max_input_chars,
            language: config.language.clone(),
        }))
    }

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.replace("{language}", &self.language)
    }

    /// Send one chat completion request and return the raw response
    pub async fn send_completion_request(&self, user_content: &str) -> Result<CompletionResponse> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": self.system_prompt()
                },
                {
                    "role": "user",
                    "content": format!("Here is the content of the video to summarize:\n\n{user_content}")
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to reach summary API"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::RemoteApi(format!("status {status}: {message}")));
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, content: &str) -> Result<String> {
        let content = truncate_chars(content, self.max_input_chars);
        tracing::debug!(model = %self.model, chars = content.chars().count(), "requesting summary");

        let response = self.send_completion_request(content).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| Error::RemoteApi("no content in completion response".into()))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Chat completion response (fields we read)
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    /// Generated alternatives
    pub choices: Vec<CompletionChoice>,
}

/// One generated alternative
#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    /// Assistant message
    pub message: CompletionMessage,
}

/// Assistant message of a choice
#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    /// Text, absent for refusals or tool calls
    pub content: Option<String>,
}
