//! Chat orchestration for the gatehouse model routing platform.
//!
//! The [`ChatOrchestrator`] runs one chat turn end to end: request
//! validation, catalog lookup, credential resolution, rate limiting,
//! provider dispatch with retry, token accounting, conversation
//! persistence, and the audit trail.
//!
//! ```rust
//! use gchat::estimate_tokens;
//!
//! assert_eq!(estimate_tokens("hello world"), 2);
//! ```

mod accounting;
mod audit;
mod credentials;
mod error;
mod hooks;
mod persister;
mod ratelimit;
mod service;
mod store;
mod types;

pub use accounting::{estimate_tokens, resolve_usage};
pub use audit::AuditLogger;
pub use credentials::{
    CredentialResolver, CredentialSource, NoopCipher, ResolvedCredential, SecretCipher,
};
pub use error::{ChatError, ChatErrorKind};
pub(crate) use error::truncate_message;
pub use hooks::{ChatHooks, NoopChatHooks};
pub use persister::{ConversationPersister, derive_title};
pub use ratelimit::RateLimiter;
pub use service::{ChatOrchestrator, ChatOrchestratorBuilder};
pub use store::{
    CallLogStore, ChatFuture, ConversationStore, CredentialStore, InMemoryChatStore, ModelCatalog,
};
pub use types::{
    CallRecord, ChatOutcome, ChatRequest, ConversationRecord, DEFAULT_CONVERSATION_TITLE,
    MessageRole, ModelDescriptor, StoredMessage, TurnWrite, UserCredential,
};
