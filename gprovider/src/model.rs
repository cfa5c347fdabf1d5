//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use gprovider::{Message, ModelRequest, ProviderErrorKind, Role};
//!
//! let ok = ModelRequest::new_validated(
//!     "deepseek-chat",
//!     vec![Message::new(Role::User, "Summarize this diff")],
//! );
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::new_validated("", vec![Message::new(Role::User, "hi")])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use gcommon::GenerationOptions;

use crate::{ProviderError, ProviderErrorKind};

/// Wire-protocol family an adapter speaks. Several catalog provider names
/// collapse onto the OpenAI-compatible family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    OpenAiCompat,
    Wenxin,
}

impl ProviderFamily {
    /// Maps a catalog provider name (case-insensitive) to its wire family.
    /// Unknown names return `None`; the registry decides the fallback.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" | "deepseek" | "anthropic" => Some(Self::OpenAiCompat),
            "baidu" | "wenxin" => Some(Self::Wenxin),
            _ => None,
        }
    }
}

impl Display for ProviderFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::OpenAiCompat => "openai-compat",
            Self::Wenxin => "wenxin",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub family: ProviderFamily,
    pub model: String,
    pub text: String,
    /// `None` when the upstream reply carried no usage block (streaming,
    /// Wenxin); callers fall back to heuristic estimation.
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, messages);
        request.validate()?;
        Ok(request)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.options.stream = true;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && !(1..=8192).contains(&max_tokens)
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be in the inclusive range 1..=8192",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidRequest,
                "temperature must be in the inclusive range 0.0..=2.0",
                false,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_family_display_is_stable() {
        assert_eq!(ProviderFamily::OpenAiCompat.to_string(), "openai-compat");
        assert_eq!(ProviderFamily::Wenxin.to_string(), "wenxin");
    }

    #[test]
    fn provider_family_from_name_is_case_insensitive() {
        assert_eq!(
            ProviderFamily::from_name("OpenAI"),
            Some(ProviderFamily::OpenAiCompat)
        );
        assert_eq!(
            ProviderFamily::from_name("deepseek"),
            Some(ProviderFamily::OpenAiCompat)
        );
        assert_eq!(
            ProviderFamily::from_name(" Baidu "),
            Some(ProviderFamily::Wenxin)
        );
        assert_eq!(ProviderFamily::from_name("mystery"), None);
    }

    #[test]
    fn model_request_validate_enforces_contract() {
        let empty_model = ModelRequest::new("   ", vec![Message::new(Role::User, "hi")]);
        let err = empty_model.validate().expect_err("empty model must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let empty_messages = ModelRequest::new("gpt", Vec::new());
        let err = empty_messages
            .validate()
            .expect_err("empty messages must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let bad_temperature =
            ModelRequest::new("gpt", vec![Message::new(Role::User, "hi")]).with_temperature(2.5);
        let err = bad_temperature
            .validate()
            .expect_err("temperature outside range must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let bad_max_tokens =
            ModelRequest::new("gpt", vec![Message::new(Role::User, "hi")]).with_max_tokens(0);
        let err = bad_max_tokens
            .validate()
            .expect_err("max_tokens=0 must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let oversized =
            ModelRequest::new("gpt", vec![Message::new(Role::User, "hi")]).with_max_tokens(8193);
        assert!(oversized.validate().is_err());

        let valid = ModelRequest::new("gpt", vec![Message::new(Role::User, "hi")])
            .with_temperature(0.4)
            .with_max_tokens(128)
            .enable_streaming();
        assert!(valid.validate().is_ok());
        assert!(valid.options.stream);
    }
}
