//! OpenAI chat-completion implementation.

use super::{ChatModel, Message, Role};
use crate::error::{PaddockError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based chat model.
///
/// The underlying HTTP client carries a 30-second timeout; a request past
/// that bound is abandoned and reported as a failure.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    /// Create a new chat model client.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, system_prompt, messages), fields(count = messages.len()))]
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        let mut request_messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt.to_string())
                .build()
                .map_err(|e| PaddockError::Completion(e.to_string()))?
                .into(),
        ];

        for message in messages {
            let request_message: ChatCompletionRequestMessage = match message.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| PaddockError::Completion(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| PaddockError::Completion(e.to_string()))?
                    .into(),
            };
            request_messages.push(request_message);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(0.7)
            .build()
            .map_err(|e| PaddockError::Completion(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PaddockError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| PaddockError::Completion("Empty response from model".to_string()))?
            .clone();

        debug!("Generated {} characters", answer.chars().count());
        Ok(answer)
    }
}
