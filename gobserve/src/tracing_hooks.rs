//! Tracing-based observability hooks for provider dispatch and chat turns.
//!
//! ```rust
//! use gobserve::TracingObservabilityHooks;
//! use gchat::ChatHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use gchat::{ChatError, ChatHooks};
use gcommon::{ModelId, UserId};
use gprovider::{ProviderError, ProviderFamily, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, family: ProviderFamily, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            family = %family,
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        family: ProviderFamily,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            family = %family,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, family: ProviderFamily, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            family = %family,
            operation,
            attempts
        );
    }

    fn on_failure(
        &self,
        family: ProviderFamily,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            family = %family,
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ChatHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, user_id: UserId, model_name: &str) {
        tracing::info!(
            phase = "chat",
            event = "turn_start",
            user_id = %user_id,
            model = model_name
        );
    }

    fn on_turn_success(
        &self,
        user_id: UserId,
        model_id: ModelId,
        tokens_used: u32,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "chat",
            event = "turn_success",
            user_id = %user_id,
            model_id = %model_id,
            tokens_used,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, user_id: UserId, model_name: &str, error: &ChatError) {
        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            user_id = %user_id,
            model = model_name,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_audit_error(&self, user_id: UserId, error: &ChatError) {
        tracing::error!(
            phase = "chat",
            event = "audit_error",
            user_id = %user_id,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
