//! OpenAI-compatible adapter types and provider-agnostic conversion logic.

use crate::{Message, ModelResponse, ProviderFamily, Role, StreamEvent, TokenUsage};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiCompatRequest {
    pub model: String,
    pub messages: Vec<OpenAiCompatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompatMessage {
    pub role: OpenAiCompatRole,
    pub content: String,
}

impl From<Message> for OpenAiCompatMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.into(),
            content: value.content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiCompatRole {
    System,
    User,
    Assistant,
}

impl OpenAiCompatRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Role> for OpenAiCompatRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenAiCompatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<OpenAiCompatUsage> for TokenUsage {
    fn from(value: OpenAiCompatUsage) -> Self {
        Self {
            prompt_tokens: value.prompt_tokens,
            completion_tokens: value.completion_tokens,
            total_tokens: value.total_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiCompatResponse {
    pub model: String,
    pub content: String,
    pub usage: Option<OpenAiCompatUsage>,
}

impl OpenAiCompatResponse {
    pub(crate) fn into_model_response(self) -> ModelResponse {
        ModelResponse {
            family: ProviderFamily::OpenAiCompat,
            model: self.model,
            text: self.content,
            usage: self.usage.map(TokenUsage::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OpenAiCompatStreamChunk {
    TextDelta(String),
    ResponseComplete(OpenAiCompatResponse),
}

impl From<OpenAiCompatStreamChunk> for StreamEvent {
    fn from(value: OpenAiCompatStreamChunk) -> Self {
        match value {
            OpenAiCompatStreamChunk::TextDelta(delta) => Self::TextDelta(delta),
            OpenAiCompatStreamChunk::ResponseComplete(response) => {
                Self::ResponseComplete(response.into_model_response())
            }
        }
    }
}
