//! Observation points for chat turns. The orchestrator stays free of any
//! logging or metrics dependency; implementations live in the observability
//! crate or in tests.

use std::time::Duration;

use gcommon::{ModelId, UserId};

use crate::ChatError;

pub trait ChatHooks: Send + Sync {
    /// Fires before the catalog lookup, so the model is known by name only.
    fn on_turn_start(&self, _user_id: UserId, _model_name: &str) {}

    fn on_turn_success(
        &self,
        _user_id: UserId,
        _model_id: ModelId,
        _tokens_used: u32,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_failure(&self, _user_id: UserId, _model_name: &str, _error: &ChatError) {}

    /// A failed audit write never fails the turn; it is reported here.
    fn on_audit_error(&self, _user_id: UserId, _error: &ChatError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatHooks;

impl ChatHooks for NoopChatHooks {}
