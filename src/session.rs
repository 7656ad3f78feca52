//! Conversation state for the single process-wide chat session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::model::{CompletionClient, ProviderError, SamplingParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Default system prompt, stamped with the agent version.
pub fn default_system_prompt() -> String {
    format!(
        "You are a helpful AI assistant deployed on Azure AI Foundry.\n\
         You can answer questions, help with tasks, and engage in friendly conversation.\n\
         Be concise, helpful, and professional.\n\n\
         Agent Version: {}",
        env!("CARGO_PKG_VERSION")
    )
}

/// Fixed configuration of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub system_prompt: String,
    pub model_id: String,
    pub endpoint: String,
    pub sampling: SamplingParams,
    /// Most recent non-system messages sent to the model; `None` sends everything.
    pub max_context_messages: Option<usize>,
}

pub struct Session {
    config: SessionConfig,
    history: Vec<Message>,
    client: Arc<dyn CompletionClient>,
}

impl Session {
    pub fn new(config: SessionConfig, client: Arc<dyn CompletionClient>) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "endpoint must not be empty".to_string(),
            ));
        }
        if config.max_context_messages == Some(0) {
            return Err(GatewayError::Configuration(
                "context window must hold at least one message".to_string(),
            ));
        }

        let history = vec![Message::new(Role::System, config.system_prompt.clone())];
        Ok(Self {
            config,
            history,
            client,
        })
    }

    /// Appends without validation. User content is checked by the gateway.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Message::new(role, content));
    }

    pub fn reset(&mut self) {
        self.history = vec![Message::new(Role::System, self.config.system_prompt.clone())];
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Messages sent to the model for the next turn.
    ///
    /// Without a context window this is the full history. With one, it is the
    /// system message followed by the most recent non-system messages, opening
    /// on a user turn where possible. Stored history is never trimmed.
    pub fn context(&self) -> Vec<Message> {
        let Some(limit) = self.config.max_context_messages else {
            return self.history.clone();
        };

        let turns = &self.history[1..];
        let mut start = turns.len().saturating_sub(limit);
        if start < turns.len() && turns[start].role == Role::Assistant {
            start += 1;
        }

        let mut context = Vec::with_capacity(1 + turns.len() - start);
        context.push(self.history[0].clone());
        context.extend_from_slice(&turns[start..]);
        context
    }

    /// Single call to the remote model; failures are returned unchanged.
    pub async fn call_remote_model(
        &self,
        history: &[Message],
    ) -> std::result::Result<String, ProviderError> {
        self.client
            .complete(history, &self.config.model_id, &self.config.sampling)
            .await
    }

    pub fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn sampling(&self) -> &SamplingParams {
        &self.config.sampling
    }
}
