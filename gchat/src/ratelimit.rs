//! Per-user, per-model fixed-window rate limiting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use gcommon::{ModelId, UserId};

use crate::ChatError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window counter. The check and the increment happen under one lock
/// acquisition, so a burst of concurrent calls cannot all read a stale count
/// and slip past the limit together.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<(UserId, ModelId), Window>>,
    window_length: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(60))
    }

    pub fn with_window(window_length: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window_length,
        }
    }

    /// Admits the call and counts it, or rejects with `RateLimited`. Fails
    /// closed: an unavailable counter rejects rather than admitting
    /// unmetered traffic.
    pub fn check_and_increment(
        &self,
        user_id: UserId,
        model_id: ModelId,
        limit_per_window: u32,
    ) -> Result<(), ChatError> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| ChatError::rate_limited("rate limiter unavailable"))?;

        let now = Instant::now();
        let window = windows.entry((user_id, model_id)).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= self.window_length {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= limit_per_window {
            return Err(ChatError::rate_limited(format!(
                "rate limit of {limit_per_window} calls per window exceeded"
            )));
        }

        window.count += 1;
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new();
        let user = UserId::new(1);
        let model = ModelId::new(2);

        for _ in 0..5 {
            limiter
                .check_and_increment(user, model, 5)
                .expect("within limit");
        }

        let error = limiter
            .check_and_increment(user, model, 5)
            .expect_err("over limit");
        assert_eq!(error.kind, ChatErrorKind::RateLimited);
    }

    #[test]
    fn windows_are_scoped_per_user_and_model() {
        let limiter = RateLimiter::new();

        limiter
            .check_and_increment(UserId::new(1), ModelId::new(2), 1)
            .expect("first user");
        limiter
            .check_and_increment(UserId::new(9), ModelId::new(2), 1)
            .expect("other user has own window");
        limiter
            .check_and_increment(UserId::new(1), ModelId::new(3), 1)
            .expect("other model has own window");
    }

    #[test]
    fn expired_window_resets_the_count() {
        let limiter = RateLimiter::with_window(Duration::from_millis(0));
        let user = UserId::new(1);
        let model = ModelId::new(2);

        // Zero-length windows expire immediately, so every call is admitted.
        for _ in 0..10 {
            limiter
                .check_and_increment(user, model, 1)
                .expect("window resets");
        }
    }

    #[test]
    fn concurrent_burst_never_exceeds_limit() {
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new());
        let admitted = Arc::new(Mutex::new(0_u32));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    if limiter
                        .check_and_increment(UserId::new(1), ModelId::new(2), 8)
                        .is_ok()
                    {
                        *admitted.lock().expect("count lock") += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread join");
        }

        assert_eq!(*admitted.lock().expect("count lock"), 8);
    }
}
