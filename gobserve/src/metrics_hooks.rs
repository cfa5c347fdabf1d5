//! Metrics-based observability hooks for provider dispatch and chat turns.
//!
//! ```rust
//! use gobserve::MetricsObservabilityHooks;
//! use gprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use gchat::{ChatError, ChatHooks};
use gcommon::{ModelId, UserId};
use gprovider::{ProviderError, ProviderFamily, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, family: ProviderFamily, operation: &str, _attempt: u32) {
        metrics::counter!(
            "gatehouse_provider_attempt_start_total",
            "family" => family.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        family: ProviderFamily,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "gatehouse_provider_retry_scheduled_total",
            "family" => family.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gatehouse_provider_retry_delay_seconds",
            "family" => family.to_string(),
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, family: ProviderFamily, operation: &str, attempts: u32) {
        metrics::counter!(
            "gatehouse_provider_success_total",
            "family" => family.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "gatehouse_provider_attempts_per_success",
            "family" => family.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(
        &self,
        family: ProviderFamily,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "gatehouse_provider_failure_total",
            "family" => family.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gatehouse_provider_attempts_per_failure",
            "family" => family.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl ChatHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _user_id: UserId, model_name: &str) {
        metrics::counter!(
            "gatehouse_chat_turn_start_total",
            "model" => model_name.to_string()
        )
        .increment(1);
    }

    fn on_turn_success(
        &self,
        _user_id: UserId,
        model_id: ModelId,
        tokens_used: u32,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "gatehouse_chat_turn_success_total",
            "model_id" => model_id.to_string()
        )
        .increment(1);
        metrics::counter!(
            "gatehouse_chat_tokens_total",
            "model_id" => model_id.to_string()
        )
        .increment(u64::from(tokens_used));
        metrics::histogram!(
            "gatehouse_chat_turn_duration_seconds",
            "model_id" => model_id.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _user_id: UserId, model_name: &str, error: &ChatError) {
        metrics::counter!(
            "gatehouse_chat_turn_failure_total",
            "model" => model_name.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_audit_error(&self, _user_id: UserId, error: &ChatError) {
        metrics::counter!(
            "gatehouse_chat_audit_error_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
