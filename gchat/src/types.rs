//! Catalog, conversation, and chat turn domain types.

use std::time::{Duration, SystemTime};

use gcommon::{ConversationId, ModelId, UserId};

/// Title given to conversations created without a usable first message.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// An entry in the admin-managed model catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub id: ModelId,
    /// Display name, e.g. "DeepSeek V3"; unique within the catalog and
    /// normalized to a wire identifier before dispatch.
    pub name: String,
    /// Catalog provider name, e.g. "openai", "deepseek", "baidu".
    pub provider: String,
    /// Wire endpoint for this model. `None` leaves the adapter on its
    /// default URL, which only works for the hosted OpenAI service.
    pub endpoint: Option<String>,
    pub is_active: bool,
    pub max_tokens: u32,
    pub rate_limit_per_minute: u32,
}

impl ModelDescriptor {
    pub fn new(id: ModelId, name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            provider: provider.into(),
            endpoint: None,
            is_active: true,
            max_tokens: 8192,
            rate_limit_per_minute: 60,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// A user's stored key for one catalog model. The secret is held either as
/// plaintext or encrypted, never both; a plaintext secret is used as-is,
/// an encrypted one goes through the cipher at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub user_id: UserId,
    pub model_id: ModelId,
    pub api_key: Option<String>,
    pub api_key_encrypted: Option<String>,
    pub endpoint: Option<String>,
    pub is_enabled: bool,
    pub last_used_at: Option<SystemTime>,
}

impl UserCredential {
    pub fn plaintext(user_id: UserId, model_id: ModelId, api_key: impl Into<String>) -> Self {
        Self {
            user_id,
            model_id,
            api_key: Some(api_key.into()),
            api_key_encrypted: None,
            endpoint: None,
            is_enabled: true,
            last_used_at: None,
        }
    }

    pub fn encrypted(user_id: UserId, model_id: ModelId, ciphertext: impl Into<String>) -> Self {
        Self {
            user_id,
            model_id,
            api_key: None,
            api_key_encrypted: Some(ciphertext.into()),
            endpoint: None,
            is_enabled: true,
            last_used_at: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub tokens_used: u32,
    /// Model that produced an assistant message; `None` for user messages.
    pub model_id: Option<ModelId>,
    pub is_deleted: bool,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub user_id: UserId,
    pub model_id: ModelId,
    pub title: String,
    pub message_count: u32,
    pub total_tokens: u64,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// One durable turn write: both messages, counter bumps, and the optional
/// retitle are applied as a single storage operation. Prompt tokens land on
/// the user message, completion tokens on the assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnWrite {
    pub conversation_id: ConversationId,
    pub model_id: ModelId,
    pub user_text: String,
    pub assistant_text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub retitle: Option<String>,
}

impl TurnWrite {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// One audit trail row. Exactly one is appended per orchestration attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub user_id: UserId,
    pub model_id: ModelId,
    pub conversation_id: Option<ConversationId>,
    /// Endpoint the call was routed to; `None` when the adapter default was
    /// used or the turn failed before an endpoint was resolved.
    pub endpoint: Option<String>,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cost: f64,
    pub latency_ms: u64,
    pub status_code: u16,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: SystemTime,
}

impl CallRecord {
    pub fn new(
        user_id: UserId,
        model_id: ModelId,
        prompt_tokens: u32,
        completion_tokens: u32,
        cost: f64,
        status_code: u16,
        error_message: Option<String>,
    ) -> Self {
        Self {
            user_id,
            model_id,
            conversation_id: None,
            endpoint: None,
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            cost,
            latency_ms: 0,
            status_code,
            success: status_code == 200,
            error_message,
            created_at: SystemTime::now(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = latency.as_millis() as u64;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub user_id: UserId,
    /// Catalog display name; the orchestrator looks the model up by name.
    pub model_name: String,
    pub message: String,
    pub conversation_id: Option<ConversationId>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(
        user_id: UserId,
        model_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            model_name: model_name.into(),
            message: message.into(),
            conversation_id: None,
            temperature: None,
            max_tokens: None,
            stream: false,
        }
    }

    pub fn with_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub response_text: String,
    /// Catalog display name of the model that served the turn.
    pub model_used: String,
    pub tokens_used: u32,
    pub processing_time_ms: u64,
    pub conversation_id: ConversationId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_record_totals_prompt_and_completion() {
        let record = CallRecord::new(UserId::new(1), ModelId::new(2), 120, 30, 0.0003, 200, None)
            .with_conversation(ConversationId::new(4))
            .with_endpoint("https://api.deepseek.com/v1")
            .with_latency(Duration::from_millis(250));
        assert_eq!(record.total_tokens, 150);
        assert_eq!(record.status_code, 200);
        assert!(record.success);
        assert_eq!(record.conversation_id, Some(ConversationId::new(4)));
        assert_eq!(record.endpoint.as_deref(), Some("https://api.deepseek.com/v1"));
        assert_eq!(record.latency_ms, 250);
        assert_eq!(record.error_message, None);
    }

    #[test]
    fn failed_call_records_are_not_successful() {
        let record = CallRecord::new(
            UserId::new(1),
            ModelId::new(2),
            40,
            0,
            0.0,
            500,
            Some("upstream failed".to_string()),
        );
        assert!(!record.success);
        assert_eq!(record.total_tokens, 40);
        assert_eq!(record.conversation_id, None);
    }

    #[test]
    fn chat_request_builders_set_fields() {
        let request = ChatRequest::new(UserId::new(1), "DeepSeek V3", "hi")
            .with_conversation(ConversationId::new(9))
            .with_temperature(0.2)
            .with_max_tokens(64)
            .enable_streaming();

        assert_eq!(request.model_name, "DeepSeek V3");
        assert_eq!(request.conversation_id, Some(ConversationId::new(9)));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(64));
        assert!(request.stream);
    }

    #[test]
    fn credential_constructors_populate_one_secret_variant() {
        let plain = UserCredential::plaintext(UserId::new(1), ModelId::new(2), "sk-plain");
        assert_eq!(plain.api_key.as_deref(), Some("sk-plain"));
        assert_eq!(plain.api_key_encrypted, None);

        let encrypted = UserCredential::encrypted(UserId::new(1), ModelId::new(2), "enc")
            .with_endpoint("https://proxy.example.com/v1")
            .disabled();
        assert_eq!(encrypted.api_key, None);
        assert_eq!(encrypted.api_key_encrypted.as_deref(), Some("enc"));
        assert!(!encrypted.is_enabled);
    }
}
