//! OpenAI-compatible chat completion client.

use std::time::Duration;

use async_trait::async_trait;
use capacity_core::chat::{ChatService, ConversationLog};
use capacity_core::{DesignError, DesignResult};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::OpenAiSettings;

/// Current application version (from Cargo.toml)
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiChat {
    pub fn new(settings: &OpenAiSettings, api_key: impl Into<String>) -> DesignResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("capacity/{}", CURRENT_VERSION))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DesignError::chat_failed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Request body for `/chat/completions`
fn build_payload(model: &str, conversation: &ConversationLog) -> Value {
    let messages: Vec<Value> = conversation
        .turns()
        .iter()
        .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.text }))
        .collect();
    json!({ "model": model, "messages": messages })
}

/// Content of the first choice
fn parse_reply(data: &Value) -> DesignResult<String> {
    data.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| DesignError::chat_failed("No message content in response"))
}

#[async_trait]
impl ChatService for OpenAiChat {
    async fn send(&self, conversation: &ConversationLog) -> DesignResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, turns = conversation.len(), "chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_payload(&self.model, conversation))
            .send()
            .await
            .map_err(|e| DesignError::chat_failed(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DesignError::chat_failed(format!("API returned {}: {}", status, text)));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| DesignError::chat_failed(format!("Failed to parse response: {}", e)))?;
        parse_reply(&data)
    }
}
