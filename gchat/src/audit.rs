//! Best-effort audit trail writes.

use std::sync::Arc;

use crate::{CallRecord, CallLogStore, ChatHooks};

/// Appends call records without letting a broken audit store fail the turn
/// the record describes. Write errors are surfaced through the hooks only.
pub struct AuditLogger {
    store: Arc<dyn CallLogStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn CallLogStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, record: CallRecord, hooks: &dyn ChatHooks) {
        let user_id = record.user_id;
        if let Err(error) = self.store.append_call(record).await {
            hooks.on_audit_error(user_id, &error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use gcommon::{ModelId, UserId};

    use super::*;
    use crate::{ChatError, ChatFuture, InMemoryChatStore, NoopChatHooks};

    struct FailingCallLog;

    impl CallLogStore for FailingCallLog {
        fn append_call<'a>(&'a self, _record: CallRecord) -> ChatFuture<'a, Result<(), ChatError>> {
            Box::pin(async move { Err(ChatError::storage("disk full")) })
        }
    }

    #[derive(Default)]
    struct CapturingHooks {
        audit_errors: Mutex<Vec<String>>,
    }

    impl ChatHooks for CapturingHooks {
        fn on_audit_error(&self, _user_id: UserId, error: &ChatError) {
            self.audit_errors
                .lock()
                .expect("errors lock")
                .push(error.message.clone());
        }
    }

    fn record() -> CallRecord {
        CallRecord::new(UserId::new(1), ModelId::new(2), 10, 5, 0.0, 200, None)
    }

    #[tokio::test]
    async fn successful_writes_land_in_the_store() {
        let store = Arc::new(InMemoryChatStore::new());
        let logger = AuditLogger::new(store.clone());

        logger.record(record(), &NoopChatHooks).await;

        let records = store.call_records().expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_tokens, 15);
    }

    #[tokio::test]
    async fn failed_writes_are_swallowed_and_reported() {
        let logger = AuditLogger::new(Arc::new(FailingCallLog));
        let hooks = CapturingHooks::default();

        logger.record(record(), &hooks).await;

        let errors = hooks.audit_errors.lock().expect("errors lock");
        assert_eq!(errors.as_slice(), ["disk full"]);
    }
}
