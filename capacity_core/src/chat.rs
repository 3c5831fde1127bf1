//! # Chat Boundary
//!
//! The conversation log and the trait the session uses to reach an external
//! chat-completion service. The service is opaque: it receives the whole log
//! and returns reply text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DesignResult;

/// System prompt seeding every conversation
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant capable of not only general conversation, but also structural engineering design calculation.";

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Append-only ordered conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log seeded with a system turn
    pub fn with_system(prompt: impl Into<String>) -> Self {
        let mut log = Self::new();
        log.push(Role::System, prompt);
        log
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(Turn {
            role,
            text: text.into(),
            at: Utc::now(),
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, text);
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, text);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// External chat-completion service.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Reply to the conversation so far. The last turn is the user's input.
    async fn send(&self, conversation: &ConversationLog) -> DesignResult<String>;
}

/// Chat service used when no completion backend is configured.
#[derive(Debug, Clone, Default)]
pub struct OfflineChat;

/// Reply returned by [`OfflineChat`]
pub const OFFLINE_REPLY: &str =
    "General chat is unavailable: no chat service is configured. Use '!mode design' for design commands.";

#[async_trait]
impl ChatService for OfflineChat {
    async fn send(&self, _conversation: &ConversationLog) -> DesignResult<String> {
        Ok(OFFLINE_REPLY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_ordered() {
        let mut log = ConversationLog::with_system(SYSTEM_PROMPT);
        log.push_user("hi");
        log.push_assistant("hello");

        let roles: Vec<_> = log.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(log.last().unwrap().text, "hello");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[tokio::test]
    async fn test_offline_chat_replies() {
        let reply = OfflineChat.send(&ConversationLog::new()).await.unwrap();
        assert_eq!(reply, OFFLINE_REPLY);
    }
}
