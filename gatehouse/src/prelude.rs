//! Common imports for most gatehouse applications.

pub use crate::{
    GatehouseConfig, GatehouseRuntime, build_runtime, default_http_client, in_memory_store,
    orchestrator_with_store, provider_registry, sqlite_store,
};
pub use crate::{
    BoxFuture, CallLogStore, CallRecord, CancelToken, ChatError, ChatErrorKind, ChatHooks,
    ChatOrchestrator, ChatOrchestratorBuilder, ChatOutcome, ChatRequest, ConversationId,
    ConversationRecord, ConversationStore, CredentialStore, InMemoryChatStore, Message,
    MessageRole, ModelCatalog, ModelDescriptor, ModelId, ModelIdentifierMap, ModelProvider,
    ModelRequest, ModelResponse, PricingTable, ProviderError, ProviderFamily, ProviderRegistry,
    RetryPolicy, Role, SafeChatHooks, SafeProviderHooks, SqliteChatStore, TokenUsage,
    TracingObservabilityHooks, UserCredential, UserId,
};
