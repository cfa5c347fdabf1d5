//! Runtime wiring helpers for common deployments.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    CallLogStore, ChatError, ChatOrchestrator, ConversationStore, CredentialStore,
    InMemoryChatStore, ModelCatalog, ProviderRegistry, RetryPolicy, SafeChatHooks,
    SafeProviderHooks, SqliteChatStore, TracingObservabilityHooks,
};

/// Deployment-level settings. A `database_path` of `None` selects the
/// in-memory store, which loses state on restart.
#[derive(Debug, Clone)]
pub struct GatehouseConfig {
    pub database_path: Option<PathBuf>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    /// System default API keys, keyed by catalog provider name.
    pub system_api_keys: HashMap<String, String>,
    pub rate_limit_window: Duration,
}

impl Default for GatehouseConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            system_api_keys: HashMap::new(),
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

pub struct GatehouseRuntime {
    pub orchestrator: ChatOrchestrator,
}

pub fn default_http_client(timeout: Duration) -> Result<reqwest::Client, ChatError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| ChatError::model_config(format!("failed to build http client: {error}")))
}

/// Registry with every feature-enabled adapter over a shared HTTP client.
pub fn provider_registry(client: reqwest::Client) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    register_openai_compat(&mut registry, client.clone());
    register_wenxin(&mut registry, client);
    registry
}

#[cfg(feature = "provider-openai-compat")]
fn register_openai_compat(registry: &mut ProviderRegistry, client: reqwest::Client) {
    use gprovider::adapters::openai_compat::{OpenAiCompatHttpTransport, OpenAiCompatProvider};

    registry.register(OpenAiCompatProvider::new(Arc::new(
        OpenAiCompatHttpTransport::new(client),
    )));
}

#[cfg(not(feature = "provider-openai-compat"))]
fn register_openai_compat(_registry: &mut ProviderRegistry, _client: reqwest::Client) {}

#[cfg(feature = "provider-wenxin")]
fn register_wenxin(registry: &mut ProviderRegistry, client: reqwest::Client) {
    use gprovider::adapters::wenxin::{WenxinHttpTransport, WenxinProvider};

    registry.register(WenxinProvider::new(Arc::new(WenxinHttpTransport::new(
        client,
    ))));
}

#[cfg(not(feature = "provider-wenxin"))]
fn register_wenxin(_registry: &mut ProviderRegistry, _client: reqwest::Client) {}

pub fn in_memory_store() -> Arc<InMemoryChatStore> {
    Arc::new(InMemoryChatStore::new())
}

pub fn sqlite_store(path: impl AsRef<std::path::Path>) -> Result<Arc<SqliteChatStore>, ChatError> {
    Ok(Arc::new(SqliteChatStore::new(path)?))
}

/// Builds the orchestrator around one store that backs every storage
/// contract, with tracing hooks wrapped so a panicking subscriber cannot
/// take a turn down with it.
pub fn orchestrator_with_store<S>(
    store: Arc<S>,
    registry: Arc<ProviderRegistry>,
    config: &GatehouseConfig,
) -> ChatOrchestrator
where
    S: ModelCatalog + CredentialStore + ConversationStore + CallLogStore + 'static,
{
    ChatOrchestrator::builder(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        registry,
    )
    .with_system_keys(config.system_api_keys.clone())
    .with_retry_policy(config.retry.clone())
    .with_rate_limit_window(config.rate_limit_window)
    .with_provider_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)))
    .with_chat_hooks(Arc::new(SafeChatHooks::new(TracingObservabilityHooks)))
    .build()
}

pub fn build_runtime(config: GatehouseConfig) -> Result<GatehouseRuntime, ChatError> {
    let client = default_http_client(config.request_timeout)?;
    let registry = Arc::new(provider_registry(client));

    let orchestrator = match &config.database_path {
        Some(path) => orchestrator_with_store(
            Arc::new(SqliteChatStore::new(path)?),
            registry,
            &config,
        ),
        None => orchestrator_with_store(in_memory_store(), registry, &config),
    };

    Ok(GatehouseRuntime { orchestrator })
}

#[cfg(test)]
mod tests {
    use gcommon::{ModelId, UserId};
    use gprovider::{
        BoxedEventStream, CallAuth, ModelProvider, ModelRequest, ModelResponse, ProviderError,
        ProviderFamily, ProviderFuture, ProviderRegistry, StreamEvent, VecEventStream,
    };

    use crate::{ChatRequest, ModelDescriptor};

    use super::*;

    struct FakeProvider;

    impl ModelProvider for FakeProvider {
        fn family(&self) -> ProviderFamily {
            ProviderFamily::OpenAiCompat
        }

        fn complete<'a>(
            &'a self,
            request: ModelRequest,
            _auth: CallAuth,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                request.validate()?;
                Ok(ModelResponse {
                    family: ProviderFamily::OpenAiCompat,
                    model: request.model,
                    text: "done".to_string(),
                    usage: None,
                })
            })
        }

        fn stream<'a>(
            &'a self,
            request: ModelRequest,
            _auth: CallAuth,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async move {
                request.validate()?;
                let response = ModelResponse {
                    family: ProviderFamily::OpenAiCompat,
                    model: request.model,
                    text: "done".to_string(),
                    usage: None,
                };
                let stream =
                    VecEventStream::new(vec![Ok(StreamEvent::ResponseComplete(response))]);
                Ok(Box::pin(stream) as BoxedEventStream<'a>)
            })
        }
    }

    #[test]
    fn build_runtime_defaults_to_in_memory_store() {
        let runtime = build_runtime(GatehouseConfig::default()).expect("runtime should build");
        let _orchestrator = runtime.orchestrator;
    }

    #[tokio::test]
    async fn orchestrator_with_store_runs_a_turn_end_to_end() {
        let store = in_memory_store();
        store
            .insert_model(ModelDescriptor::new(ModelId::new(1), "GPT-4 Turbo", "openai"))
            .expect("seed model");

        let mut registry = ProviderRegistry::new();
        registry.register(FakeProvider);

        let mut config = GatehouseConfig::default();
        config
            .system_api_keys
            .insert("openai".to_string(), "system-key".to_string());

        let orchestrator = orchestrator_with_store(store.clone(), Arc::new(registry), &config);
        let outcome = orchestrator
            .complete_chat(ChatRequest::new(UserId::new(7), "GPT-4 Turbo", "hello"))
            .await
            .expect("turn should complete");

        assert_eq!(outcome.response_text, "done");
        assert_eq!(outcome.model_used, "GPT-4 Turbo");

        let conversation = store
            .conversation(outcome.conversation_id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(conversation.message_count, 2);

        let records = store.call_records().expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status_code, 200);
    }

    #[tokio::test]
    async fn sqlite_backed_runtime_persists_across_handles() {
        let dir = std::env::temp_dir().join("gatehouse-runtime-test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("chat.sqlite3");

        let store = sqlite_store(&path).expect("open store");
        store
            .insert_model(&ModelDescriptor::new(ModelId::new(1), "GPT-4 Turbo", "openai"))
            .expect("seed model");

        let reopened = sqlite_store(&path).expect("reopen store");
        let model = reopened
            .model(ModelId::new(1))
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(model.name, "GPT-4 Turbo");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
