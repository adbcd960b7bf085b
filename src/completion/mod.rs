//! Chat-completion client abstraction.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation. Order is chronological and meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a new message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Trait for chat-completion implementations.
///
/// Synchronous request/response: the full text is awaited before returning,
/// bounded by the client's wall-clock timeout. No streaming.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a response for the conversation under the given system prompt.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String>;
}
