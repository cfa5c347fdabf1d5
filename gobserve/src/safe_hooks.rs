use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use gchat::{ChatError, ChatHooks};
use gcommon::{ModelId, UserId};
use gprovider::{ProviderError, ProviderFamily, ProviderOperationHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, family: ProviderFamily, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(family, operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        family: ProviderFamily,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(family, operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, family: ProviderFamily, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(family, operation, attempts)
        }));
    }

    fn on_failure(
        &self,
        family: ProviderFamily,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(family, operation, attempts, error)
        }));
    }
}

pub struct SafeChatHooks<H> {
    inner: H,
}

impl<H> SafeChatHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatHooks for SafeChatHooks<H>
where
    H: ChatHooks,
{
    fn on_turn_start(&self, user_id: UserId, model_name: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(user_id, model_name)
        }));
    }

    fn on_turn_success(
        &self,
        user_id: UserId,
        model_id: ModelId,
        tokens_used: u32,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_success(user_id, model_id, tokens_used, elapsed)
        }));
    }

    fn on_turn_failure(&self, user_id: UserId, model_name: &str, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(user_id, model_name, error)
        }));
    }

    fn on_audit_error(&self, user_id: UserId, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_audit_error(user_id, error)
        }));
    }
}
