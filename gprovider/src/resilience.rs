//! Retry/backoff policy, cancellation token, and operational hook contracts.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

use crate::{ProviderError, ProviderFamily};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        error.retryable && attempt < self.max_attempts
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _family: ProviderFamily, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _family: ProviderFamily,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _family: ProviderFamily, _operation: &str, _attempts: u32) {}

    fn on_failure(
        &self,
        _family: ProviderFamily,
        _operation: &str,
        _attempts: u32,
        _error: &ProviderError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Cooperative cancellation shared between a caller and in-flight dispatch.
/// Cloning shares the token; cancelling wakes every waiter.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled. Must be re-armed before the
    /// flag check to avoid missing a wake between the two.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    family: ProviderFamily,
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    cancel: &CancelToken,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            let error = ProviderError::cancelled("dispatch cancelled by caller");
            hooks.on_failure(family, operation, attempt, &error);
            return Err(error);
        }

        hooks.on_attempt_start(family, operation, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(family, operation, attempt);
                return Ok(value);
            }
            Err(error) => {
                if policy.should_retry(attempt, &error) {
                    let delay = policy.backoff_for_attempt(attempt);
                    hooks.on_retry_scheduled(family, operation, attempt, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                hooks.on_failure(family, operation, attempt, &error);
                return Err(error);
            }
        }
    }
}

/// Production dispatch entry point: backoff sleeps on the tokio timer, raced
/// against the cancel token so an aborting caller does not sit out a full
/// backoff window before the cancellation is observed.
pub async fn dispatch_with_retry<T, Op, OpFuture>(
    family: ProviderFamily,
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    cancel: &CancelToken,
    execute: Op,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
{
    let sleep_cancel = cancel.clone();
    execute_with_retry(family, operation, policy, hooks, cancel, execute, {
        move |delay| {
            let sleep_cancel = sleep_cancel.clone();
            async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = sleep_cancel.cancelled() => {}
                }
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::{ProviderError, ProviderErrorKind, ProviderFamily};

    #[test]
    fn retry_policy_uses_retryable_flag_and_attempt_limit() {
        let policy = RetryPolicy::new(3);
        let retryable = ProviderError::timeout("timed out");
        let non_retryable = ProviderError::invalid_request("bad request");

        assert!(policy.should_retry(1, &retryable));
        assert!(policy.should_retry(2, &retryable));
        assert!(!policy.should_retry(3, &retryable));
        assert!(!policy.should_retry(1, &non_retryable));
    }

    #[test]
    fn rate_limited_errors_are_not_retried() {
        let policy = RetryPolicy::new(3);
        let rate_limited = ProviderError::rate_limited("try later");
        assert!(!policy.should_retry(1, &rate_limited));
    }

    #[test]
    fn retry_policy_backoff_doubles_from_one_second() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn retry_policy_backoff_caps_at_max() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        };

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(250));
        assert_eq!(policy.backoff_for_attempt(4), Duration::from_millis(250));
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ProviderOperationHooks for RecordingHooks {
        fn on_attempt_start(&self, family: ProviderFamily, operation: &str, attempt: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{family}:{operation}:{attempt}"));
        }

        fn on_retry_scheduled(
            &self,
            family: ProviderFamily,
            operation: &str,
            attempt: u32,
            _delay: Duration,
            _error: &ProviderError,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("retry:{family}:{operation}:{attempt}"));
        }

        fn on_success(&self, family: ProviderFamily, operation: &str, attempts: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{family}:{operation}:{attempts}"));
        }

        fn on_failure(
            &self,
            family: ProviderFamily,
            operation: &str,
            attempts: u32,
            error: &ProviderError,
        ) {
            self.events.lock().expect("events lock").push(format!(
                "failure:{family}:{operation}:{attempts}:{:?}",
                error.kind
            ));
        }
    }

    #[tokio::test]
    async fn execute_with_retry_retries_and_reports_hooks() {
        let policy = RetryPolicy::new(3);
        let hooks = RecordingHooks::default();
        let cancel = CancelToken::new();
        let attempts = Arc::new(Mutex::new(0_u32));
        let sleeps = Arc::new(Mutex::new(Vec::new()));

        let result = execute_with_retry(
            ProviderFamily::OpenAiCompat,
            "complete",
            &policy,
            &hooks,
            &cancel,
            {
                let attempts = Arc::clone(&attempts);
                move |attempt| {
                    let attempts = Arc::clone(&attempts);
                    async move {
                        *attempts.lock().expect("attempts lock") = attempt;
                        if attempt < 3 {
                            Err(ProviderError::new(
                                ProviderErrorKind::Transport,
                                "temporary",
                                true,
                            ))
                        } else {
                            Ok("ok")
                        }
                    }
                }
            },
            {
                let sleeps = Arc::clone(&sleeps);
                move |delay| {
                    let sleeps = Arc::clone(&sleeps);
                    async move {
                        sleeps.lock().expect("sleep lock").push(delay);
                    }
                }
            },
        )
        .await;

        assert_eq!(result.expect("result should succeed"), "ok");
        assert_eq!(*attempts.lock().expect("attempts lock"), 3);

        let recorded = sleeps.lock().expect("sleep lock").clone();
        assert_eq!(
            recorded,
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );

        let events = hooks.events.lock().expect("events lock").clone();
        assert!(events.contains(&"success:openai-compat:complete:3".to_string()));
    }

    #[tokio::test]
    async fn execute_with_retry_stops_on_non_retryable_error() {
        let policy = RetryPolicy::new(5);
        let hooks = RecordingHooks::default();
        let cancel = CancelToken::new();

        let result = execute_with_retry::<(), _, _, _, _>(
            ProviderFamily::OpenAiCompat,
            "complete",
            &policy,
            &hooks,
            &cancel,
            |_| async move { Err(ProviderError::authentication("bad key")) },
            |_| async move {},
        )
        .await;

        let error = result.expect_err("result should fail");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
        let events = hooks.events.lock().expect("events lock").clone();
        assert!(
            events
                .iter()
                .any(|item| item.contains("failure:openai-compat:complete:1"))
        );
    }

    #[tokio::test]
    async fn execute_with_retry_observes_cancellation_before_next_attempt() {
        let policy = RetryPolicy::new(5);
        let hooks = RecordingHooks::default();
        let cancel = CancelToken::new();
        let attempts = Arc::new(Mutex::new(0_u32));

        let result = execute_with_retry::<(), _, _, _, _>(
            ProviderFamily::OpenAiCompat,
            "complete",
            &policy,
            &hooks,
            &cancel,
            {
                let attempts = Arc::clone(&attempts);
                move |attempt| {
                    let attempts = Arc::clone(&attempts);
                    async move {
                        *attempts.lock().expect("attempts lock") = attempt;
                        Err(ProviderError::transport("flaky"))
                    }
                }
            },
            {
                let cancel = cancel.clone();
                move |_| {
                    let cancel = cancel.clone();
                    async move {
                        cancel.cancel();
                    }
                }
            },
        )
        .await;

        let error = result.expect_err("result should fail");
        assert_eq!(error.kind, ProviderErrorKind::Cancelled);
        assert_eq!(*attempts.lock().expect("attempts lock"), 1);
    }

    #[tokio::test]
    async fn dispatch_with_retry_returns_cancelled_when_token_already_fired() {
        let policy = RetryPolicy::new(3);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = dispatch_with_retry::<(), _, _>(
            ProviderFamily::Wenxin,
            "complete",
            &policy,
            &NoopOperationHooks,
            &cancel,
            |_| async move { Ok(()) },
        )
        .await;

        let error = result.expect_err("cancelled token must short-circuit");
        assert_eq!(error.kind, ProviderErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn cancel_token_wakes_pending_waiters() {
        let cancel = CancelToken::new();
        let waiter = cancel.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });

        cancel.cancel();
        assert!(handle.await.expect("waiter task"));
    }
}
