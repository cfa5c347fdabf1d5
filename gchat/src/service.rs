//! Chat turn orchestration: validation, credential resolution, rate limiting,
//! dispatch with retry, accounting, persistence, and the audit trail.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use gcommon::ModelId;
use gprovider::{
    BoxedEventStream, CancelToken, Message, ModelIdentifierMap, ModelRequest, ModelResponse,
    NoopOperationHooks, PricingTable, ProviderError, ProviderOperationHooks, ProviderRegistry,
    RetryPolicy, Role, StreamEvent, TokenUsage, dispatch_with_retry,
};

use crate::{
    AuditLogger, CallLogStore, CallRecord, ChatError, ChatHooks, ChatOutcome, ChatRequest,
    ConversationPersister, ConversationStore, CredentialResolver, CredentialSource,
    CredentialStore, MessageRole, ModelCatalog, NoopChatHooks, NoopCipher, RateLimiter,
    SecretCipher, estimate_tokens, resolve_usage, truncate_message,
};

const MAX_MESSAGE_CHARS: usize = 10_000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2_000;
const MAX_REQUEST_TOKENS: u32 = 8_192;

/// Audit rows written before the catalog lookup resolves carry this sentinel
/// instead of a real catalog id.
const UNRESOLVED_MODEL: ModelId = ModelId::new(0);

struct TurnSuccess {
    response_text: String,
    model_name: String,
    usage: TokenUsage,
    cost: f64,
    conversation_id: gcommon::ConversationId,
    model_id: ModelId,
    endpoint: Option<String>,
}

struct TurnFailure {
    error: ChatError,
    model_id: ModelId,
    endpoint: Option<String>,
}

/// Single entry point for a chat turn. Owns the full pipeline; callers hand
/// it a [`ChatRequest`] and get back either a completed [`ChatOutcome`] or a
/// classified [`ChatError`]. Every call, successful or not, appends exactly
/// one audit row.
pub struct ChatOrchestrator {
    catalog: Arc<dyn ModelCatalog>,
    credentials: Arc<dyn CredentialStore>,
    conversations: Arc<dyn ConversationStore>,
    resolver: CredentialResolver,
    limiter: RateLimiter,
    persister: ConversationPersister,
    audit: AuditLogger,
    registry: Arc<ProviderRegistry>,
    identifiers: ModelIdentifierMap,
    pricing: PricingTable,
    retry: RetryPolicy,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    chat_hooks: Arc<dyn ChatHooks>,
}

pub struct ChatOrchestratorBuilder {
    catalog: Arc<dyn ModelCatalog>,
    credentials: Arc<dyn CredentialStore>,
    conversations: Arc<dyn ConversationStore>,
    call_log: Arc<dyn CallLogStore>,
    registry: Arc<ProviderRegistry>,
    cipher: Arc<dyn SecretCipher>,
    system_keys: HashMap<String, String>,
    identifiers: ModelIdentifierMap,
    pricing: PricingTable,
    retry: RetryPolicy,
    rate_limit_window: Duration,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    chat_hooks: Arc<dyn ChatHooks>,
}

impl ChatOrchestratorBuilder {
    pub fn new(
        catalog: Arc<dyn ModelCatalog>,
        credentials: Arc<dyn CredentialStore>,
        conversations: Arc<dyn ConversationStore>,
        call_log: Arc<dyn CallLogStore>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            catalog,
            credentials,
            conversations,
            call_log,
            registry,
            cipher: Arc::new(NoopCipher),
            system_keys: HashMap::new(),
            identifiers: ModelIdentifierMap::builtin(),
            pricing: PricingTable::builtin(),
            retry: RetryPolicy::default(),
            rate_limit_window: Duration::from_secs(60),
            provider_hooks: Arc::new(NoopOperationHooks),
            chat_hooks: Arc::new(NoopChatHooks),
        }
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn SecretCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// System default API keys, keyed by catalog provider name.
    pub fn with_system_keys(mut self, system_keys: HashMap<String, String>) -> Self {
        self.system_keys = system_keys;
        self
    }

    pub fn with_identifier_map(mut self, identifiers: ModelIdentifierMap) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn with_pricing_table(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit_window(mut self, window: Duration) -> Self {
        self.rate_limit_window = window;
        self
    }

    pub fn with_provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = hooks;
        self
    }

    pub fn with_chat_hooks(mut self, hooks: Arc<dyn ChatHooks>) -> Self {
        self.chat_hooks = hooks;
        self
    }

    pub fn build(self) -> ChatOrchestrator {
        ChatOrchestrator {
            catalog: self.catalog,
            credentials: Arc::clone(&self.credentials),
            conversations: Arc::clone(&self.conversations),
            resolver: CredentialResolver::new(self.credentials, self.cipher, self.system_keys),
            limiter: RateLimiter::with_window(self.rate_limit_window),
            persister: ConversationPersister::new(self.conversations),
            audit: AuditLogger::new(self.call_log),
            registry: self.registry,
            identifiers: self.identifiers,
            pricing: self.pricing,
            retry: self.retry,
            provider_hooks: self.provider_hooks,
            chat_hooks: self.chat_hooks,
        }
    }
}

impl ChatOrchestrator {
    pub fn builder(
        catalog: Arc<dyn ModelCatalog>,
        credentials: Arc<dyn CredentialStore>,
        conversations: Arc<dyn ConversationStore>,
        call_log: Arc<dyn CallLogStore>,
        registry: Arc<ProviderRegistry>,
    ) -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::new(catalog, credentials, conversations, call_log, registry)
    }

    pub async fn complete_chat(&self, request: ChatRequest) -> Result<ChatOutcome, ChatError> {
        self.complete_chat_with_cancel(request, &CancelToken::new())
            .await
    }

    /// Runs one chat turn under a caller-held cancellation token. Cancelling
    /// aborts before the next dispatch attempt, including mid-backoff.
    pub async fn complete_chat_with_cancel(
        &self,
        request: ChatRequest,
        cancel: &CancelToken,
    ) -> Result<ChatOutcome, ChatError> {
        let started = Instant::now();
        self.chat_hooks
            .on_turn_start(request.user_id, &request.model_name);

        match self.run_turn(&request, cancel).await {
            Ok(success) => {
                let elapsed = started.elapsed();
                let mut record = CallRecord::new(
                    request.user_id,
                    success.model_id,
                    success.usage.prompt_tokens,
                    success.usage.completion_tokens,
                    success.cost,
                    200,
                    None,
                )
                .with_conversation(success.conversation_id)
                .with_latency(elapsed);
                if let Some(endpoint) = success.endpoint {
                    record = record.with_endpoint(endpoint);
                }
                self.audit.record(record, self.chat_hooks.as_ref()).await;

                self.chat_hooks.on_turn_success(
                    request.user_id,
                    success.model_id,
                    success.usage.total_tokens,
                    elapsed,
                );

                Ok(ChatOutcome {
                    response_text: success.response_text,
                    model_used: success.model_name,
                    tokens_used: success.usage.total_tokens,
                    processing_time_ms: elapsed.as_millis() as u64,
                    conversation_id: success.conversation_id,
                })
            }
            Err(failure) => {
                // No completion happened, so the row carries the pre-call
                // estimate for the user message and no completion tokens.
                let mut record = CallRecord::new(
                    request.user_id,
                    failure.model_id,
                    estimate_tokens(request.message.trim()),
                    0,
                    0.0,
                    500,
                    Some(truncate_message(&failure.error.message)),
                )
                .with_latency(started.elapsed());
                if let Some(conversation_id) = request.conversation_id {
                    record = record.with_conversation(conversation_id);
                }
                if let Some(endpoint) = failure.endpoint {
                    record = record.with_endpoint(endpoint);
                }
                self.audit.record(record, self.chat_hooks.as_ref()).await;
                self.chat_hooks.on_turn_failure(
                    request.user_id,
                    &request.model_name,
                    &failure.error,
                );
                Err(failure.error)
            }
        }
    }

    async fn run_turn(
        &self,
        request: &ChatRequest,
        cancel: &CancelToken,
    ) -> Result<TurnSuccess, TurnFailure> {
        let fail_early = |error: ChatError| TurnFailure {
            error,
            model_id: UNRESOLVED_MODEL,
            endpoint: None,
        };

        // Everything a caller can get wrong locally is checked before any
        // credential or network work happens.
        let message = request.message.trim();
        if message.is_empty() {
            return Err(fail_early(ChatError::invalid_request(
                "message must not be empty",
            )));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(fail_early(ChatError::invalid_request(format!(
                "message exceeds {MAX_MESSAGE_CHARS} characters"
            ))));
        }
        let model_name = request.model_name.trim();
        if model_name.is_empty() {
            return Err(fail_early(ChatError::invalid_request(
                "model name must not be empty",
            )));
        }
        if let Some(temperature) = request.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(fail_early(ChatError::invalid_request(format!(
                "temperature {temperature} is outside 0.0..=2.0"
            ))));
        }
        if let Some(max_tokens) = request.max_tokens
            && !(1..=MAX_REQUEST_TOKENS).contains(&max_tokens)
        {
            return Err(fail_early(ChatError::invalid_request(format!(
                "max_tokens {max_tokens} is outside 1..={MAX_REQUEST_TOKENS}"
            ))));
        }

        let model = self
            .catalog
            .model_by_name(model_name)
            .await
            .map_err(fail_early)?
            .ok_or_else(|| {
                fail_early(ChatError::model_not_available(format!(
                    "model '{model_name}' is not in the catalog"
                )))
            })?;
        if !model.is_active {
            return Err(TurnFailure {
                error: ChatError::model_not_available(format!(
                    "model '{}' is disabled",
                    model.name
                )),
                model_id: model.id,
                endpoint: None,
            });
        }

        let model_id = model.id;
        let fail = |error: ChatError| TurnFailure {
            error,
            model_id,
            endpoint: None,
        };

        let resolved = self
            .resolver
            .resolve(request.user_id, &model)
            .await
            .map_err(fail)?;

        // From here on the audit row carries the endpoint the call was
        // headed for, even when a later step fails.
        let call_endpoint = resolved.auth.endpoint.clone();
        let fail = |error: ChatError| TurnFailure {
            error,
            model_id,
            endpoint: call_endpoint.clone(),
        };

        self.limiter
            .check_and_increment(request.user_id, model.id, model.rate_limit_per_minute)
            .map_err(fail)?;

        let conversation = match request.conversation_id {
            Some(conversation_id) => Some(
                self.persister
                    .verify_ownership(conversation_id, request.user_id)
                    .await
                    .map_err(fail)?,
            ),
            None => None,
        };

        // Replay stored history so the upstream model sees the whole
        // conversation, then append the new user message.
        let mut messages = Vec::new();
        if let Some(conversation) = &conversation {
            let history = self
                .conversations
                .messages(conversation.id)
                .await
                .map_err(fail)?;
            for stored in history {
                let role = match stored.role {
                    MessageRole::User => Role::User,
                    MessageRole::Assistant => Role::Assistant,
                };
                messages.push(Message::new(role, stored.content));
            }
        }
        messages.push(Message::new(Role::User, message));

        let prompt_estimate: u32 = messages
            .iter()
            .map(|m| estimate_tokens(&m.content))
            .sum();

        let wire_id = self.identifiers.normalize(&model.name);
        let max_tokens = request
            .max_tokens
            .unwrap_or(DEFAULT_MAX_TOKENS)
            .min(model.max_tokens);
        let mut wire_request = ModelRequest::new(wire_id, messages)
            .with_temperature(request.temperature.unwrap_or(DEFAULT_TEMPERATURE))
            .with_max_tokens(max_tokens);
        if request.stream {
            wire_request = wire_request.enable_streaming();
        }
        wire_request
            .validate()
            .map_err(|err| fail(ChatError::invalid_request(err.message)))?;

        let provider = self.registry.route(&model.provider).ok_or_else(|| {
            fail(ChatError::model_config(format!(
                "no adapter registered for provider '{}'",
                model.provider
            )))
        })?;

        let family = provider.family();
        let auth = resolved.auth;
        let response = dispatch_with_retry(
            family,
            if request.stream { "stream" } else { "complete" },
            &self.retry,
            self.provider_hooks.as_ref(),
            cancel,
            |_attempt| {
                let provider = Arc::clone(&provider);
                let wire_request = wire_request.clone();
                let auth = auth.clone();
                async move {
                    if wire_request.options.stream {
                        let stream = provider.stream(wire_request, auth).await?;
                        drain_stream(stream).await
                    } else {
                        provider.complete(wire_request, auth).await
                    }
                }
            },
        )
        .await
        .map_err(|err| fail(err.into()))?;

        let usage = resolve_usage(response.usage, prompt_estimate, &response.text);
        let cost = self.pricing.cost_for(&model.provider, usage.total_tokens);

        if resolved.source == CredentialSource::User {
            // Usage bookkeeping only; a failed touch never fails the turn.
            let _ = self
                .credentials
                .touch_last_used(request.user_id, model.id)
                .await;
        }

        let conversation_id = self
            .persister
            .persist_turn(
                request.user_id,
                model.id,
                conversation,
                message.to_string(),
                response.text.clone(),
                usage.prompt_tokens,
                usage.completion_tokens,
            )
            .await
            .map_err(fail)?;

        Ok(TurnSuccess {
            response_text: response.text,
            model_name: model.name.clone(),
            usage,
            cost,
            conversation_id,
            model_id,
            endpoint: call_endpoint.clone(),
        })
    }
}

/// Collects a provider event stream into the final response. The terminal
/// `ResponseComplete` event carries the full accumulated text.
async fn drain_stream(mut stream: BoxedEventStream<'_>) -> Result<ModelResponse, ProviderError> {
    let mut complete = None;

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::TextDelta(_) => {}
            StreamEvent::ResponseComplete(response) => complete = Some(response),
        }
    }

    complete.ok_or_else(|| ProviderError::transport("stream ended without a completion event"))
}
