//! Unified facade over the gatehouse workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core gatehouse crates and provides runtime wiring
//! helpers for common deployments.
//!
//! ```rust
//! use gatehouse::{GatehouseConfig, build_runtime};
//!
//! let runtime = build_runtime(GatehouseConfig::default()).unwrap();
//! let _orchestrator = runtime.orchestrator;
//! ```

pub mod prelude;
pub mod runtime;

pub use gchat;
pub use gcommon;
pub use gobserve;
pub use gprovider;
pub use gstore;

pub use gchat::{
    AuditLogger, CallLogStore, CallRecord, ChatError, ChatErrorKind, ChatHooks, ChatOrchestrator,
    ChatOrchestratorBuilder, ChatOutcome, ChatRequest, ConversationPersister, ConversationRecord,
    ConversationStore, CredentialResolver, CredentialSource, CredentialStore,
    DEFAULT_CONVERSATION_TITLE, InMemoryChatStore, MessageRole, ModelCatalog, ModelDescriptor,
    NoopChatHooks, NoopCipher, RateLimiter, ResolvedCredential, SecretCipher, StoredMessage,
    TurnWrite, UserCredential, derive_title, estimate_tokens, resolve_usage,
};
pub use gcommon::{BoxFuture, ConversationId, GenerationOptions, ModelId, UserId};
pub use gobserve::{
    MetricsObservabilityHooks, SafeChatHooks, SafeProviderHooks, TracingObservabilityHooks,
};
pub use gprovider::{
    BoxedEventStream, CallAuth, CancelToken, IdentifierRule, Message, ModelEventStream,
    ModelIdentifierMap, ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks,
    PricingTable, ProviderError, ProviderErrorKind, ProviderFamily, ProviderFuture,
    ProviderOperationHooks, ProviderRegistry, RetryPolicy, Role, SecretString, StreamEvent,
    TokenUsage, VecEventStream, dispatch_with_retry, execute_with_retry,
};
pub use gstore::SqliteChatStore;

#[cfg(feature = "provider-openai-compat")]
pub use gprovider::adapters::openai_compat::{OpenAiCompatHttpTransport, OpenAiCompatProvider};
#[cfg(feature = "provider-wenxin")]
pub use gprovider::adapters::wenxin::{WenxinHttpTransport, WenxinProvider};

pub use runtime::{
    GatehouseConfig, GatehouseRuntime, build_runtime, default_http_client, in_memory_store,
    orchestrator_with_store, provider_registry, sqlite_store,
};
