//! Chat-layer errors and classification of provider failures.

use std::error::Error;
use std::fmt::{Display, Formatter};

use gprovider::{ProviderError, ProviderErrorKind};

const MAX_UPSTREAM_MESSAGE_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    ModelNotAvailable,
    ModelConfig,
    RateLimited,
    QuotaExhausted,
    Upstream,
    Cancelled,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn model_not_available(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ModelNotAvailable, message)
    }

    pub fn model_config(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ModelConfig, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::RateLimited, message)
    }

    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::QuotaExhausted, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Upstream, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Cancelled, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Storage, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

/// Upstream messages can embed request bodies; cap what we carry around and
/// write to the audit trail.
pub(crate) fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_UPSTREAM_MESSAGE_LEN {
        return message.to_string();
    }

    let mut truncated: String = message.chars().take(MAX_UPSTREAM_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let message = truncate_message(&value.message);
        match value.kind {
            ProviderErrorKind::RateLimited => ChatError::rate_limited(message),
            ProviderErrorKind::QuotaExhausted => ChatError::quota_exhausted(message),
            ProviderErrorKind::Cancelled => ChatError::cancelled(message),
            _ => ChatError::upstream(message),
        }
    }
}
