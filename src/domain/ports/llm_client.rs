//! Port for the external LLM completion interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::DomainResult;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One message of a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request for a free-text completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Model hint; the adapter falls back to its configured default.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Completion output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    /// Provider-reported answer confidence, when the prompt asked for one.
    pub confidence: Option<f64>,
    pub model: String,
}

/// External LLM capability: prompt in, text (or machine-parseable JSON) out.
///
/// Treated as fallible and possibly slow everywhere; the pipeline never
/// retries a failed call within the same request.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One free-text completion call.
    async fn complete(&self, request: CompletionRequest) -> DomainResult<Completion>;

    /// Ask for a machine-parseable JSON classification payload.
    async fn classify(&self, system_prompt: &str, user_prompt: &str) -> DomainResult<Value>;
}
