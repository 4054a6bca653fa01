use crate::domain::ports::{ChatMessage, ChatModel};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Client for OpenAI-compatible `chat/completions` APIs.
pub struct OpenAiChatClient {
    client: Client,
    settings: OpenAiSettings,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.url();
        tracing::debug!("Sending {} messages to {}", messages.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&CompletionRequest {
                model: &self.settings.model,
                messages,
                temperature: self.settings.temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("❌ Chat completion failed with status {}: {}", status, body);
            return Err(AppError::upstream(format!(
                "chat completion returned status {}",
                status
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::upstream("chat completion returned no content"))
    }
}

/// Stand-in used when no language model is configured.
#[derive(Debug, Default)]
pub struct DisabledChat;

#[async_trait]
impl ChatModel for DisabledChat {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(AppError::UnavailableError {
            message: "language model is not configured".to_string(),
        })
    }
}
