//! Storage contracts for catalog, credentials, conversations, and the audit
//! trail, plus a basic in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use gcommon::{ConversationId, ModelId, UserId};

use crate::{
    CallRecord, ChatError, ConversationRecord, DEFAULT_CONVERSATION_TITLE, MessageRole,
    ModelDescriptor, StoredMessage, TurnWrite, UserCredential,
};

pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ModelCatalog: Send + Sync {
    fn model<'a>(
        &'a self,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<Option<ModelDescriptor>, ChatError>>;

    /// Looks a model up by its unique display name, the key callers use.
    fn model_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<ModelDescriptor>, ChatError>>;
}

pub trait CredentialStore: Send + Sync {
    fn credential_for<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<Option<UserCredential>, ChatError>>;

    fn touch_last_used<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<(), ChatError>>;
}

pub trait ConversationStore: Send + Sync {
    fn conversation<'a>(
        &'a self,
        conversation_id: ConversationId,
    ) -> ChatFuture<'a, Result<Option<ConversationRecord>, ChatError>>;

    fn create_conversation<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
        title: String,
    ) -> ChatFuture<'a, Result<ConversationRecord, ChatError>>;

    /// Applies both messages, the counter bumps, and the optional retitle as
    /// one atomic operation. Message order within a conversation follows the
    /// order in which turn writes land here.
    fn record_turn<'a>(&'a self, write: TurnWrite) -> ChatFuture<'a, Result<(), ChatError>>;

    /// Live messages for a conversation; soft-deleted rows are skipped.
    fn messages<'a>(
        &'a self,
        conversation_id: ConversationId,
    ) -> ChatFuture<'a, Result<Vec<StoredMessage>, ChatError>>;
}

pub trait CallLogStore: Send + Sync {
    fn append_call<'a>(&'a self, record: CallRecord) -> ChatFuture<'a, Result<(), ChatError>>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    models: HashMap<ModelId, ModelDescriptor>,
    credentials: HashMap<(UserId, ModelId), UserCredential>,
    conversations: HashMap<ConversationId, ConversationRecord>,
    messages: HashMap<ConversationId, Vec<StoredMessage>>,
    calls: Vec<CallRecord>,
    next_conversation_id: i64,
}

/// Single-process store used by tests and the facade's in-memory runtime.
#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                next_conversation_id: 1,
                ..InMemoryState::default()
            }),
        }
    }

    pub fn insert_model(&self, model: ModelDescriptor) -> Result<(), ChatError> {
        self.lock_state()?.models.insert(model.id, model);
        Ok(())
    }

    pub fn upsert_credential(&self, credential: UserCredential) -> Result<(), ChatError> {
        self.lock_state()?
            .credentials
            .insert((credential.user_id, credential.model_id), credential);
        Ok(())
    }

    pub fn archive_conversation(&self, conversation_id: ConversationId) -> Result<(), ChatError> {
        let mut state = self.lock_state()?;
        let conversation = state
            .conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| ChatError::storage("conversation not found"))?;
        conversation.is_archived = true;
        Ok(())
    }

    pub fn call_records(&self) -> Result<Vec<CallRecord>, ChatError> {
        Ok(self.lock_state()?.calls.clone())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, ChatError> {
        self.state
            .lock()
            .map_err(|_| ChatError::storage("chat store lock poisoned"))
    }
}

impl ModelCatalog for InMemoryChatStore {
    fn model<'a>(
        &'a self,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<Option<ModelDescriptor>, ChatError>> {
        Box::pin(async move { Ok(self.lock_state()?.models.get(&model_id).cloned()) })
    }

    fn model_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<ModelDescriptor>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .lock_state()?
                .models
                .values()
                .find(|model| model.name == name)
                .cloned())
        })
    }
}

impl CredentialStore for InMemoryChatStore {
    fn credential_for<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<Option<UserCredential>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .lock_state()?
                .credentials
                .get(&(user_id, model_id))
                .cloned())
        })
    }

    fn touch_last_used<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state()?;
            if let Some(credential) = state.credentials.get_mut(&(user_id, model_id)) {
                credential.last_used_at = Some(SystemTime::now());
            }
            Ok(())
        })
    }
}

impl ConversationStore for InMemoryChatStore {
    fn conversation<'a>(
        &'a self,
        conversation_id: ConversationId,
    ) -> ChatFuture<'a, Result<Option<ConversationRecord>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .lock_state()?
                .conversations
                .get(&conversation_id)
                .cloned())
        })
    }

    fn create_conversation<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
        title: String,
    ) -> ChatFuture<'a, Result<ConversationRecord, ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state()?;
            let id = ConversationId::new(state.next_conversation_id);
            state.next_conversation_id += 1;

            let title = if title.trim().is_empty() {
                DEFAULT_CONVERSATION_TITLE.to_string()
            } else {
                title
            };

            let now = SystemTime::now();
            let record = ConversationRecord {
                id,
                user_id,
                model_id,
                title,
                message_count: 0,
                total_tokens: 0,
                is_archived: false,
                is_deleted: false,
                created_at: now,
                updated_at: now,
            };

            state.conversations.insert(id, record.clone());
            state.messages.insert(id, Vec::new());
            Ok(record)
        })
    }

    fn record_turn<'a>(&'a self, write: TurnWrite) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state()?;
            let conversation = state
                .conversations
                .get_mut(&write.conversation_id)
                .ok_or_else(|| ChatError::storage("conversation disappeared during turn"))?;

            conversation.message_count += 2;
            conversation.total_tokens += u64::from(write.total_tokens());
            conversation.updated_at = SystemTime::now();
            if let Some(title) = write.retitle {
                conversation.title = title;
            }

            let now = SystemTime::now();
            // The assistant message is timestamped marginally after the user
            // message so created_at ordering matches insertion order.
            let entries = state.messages.entry(write.conversation_id).or_default();
            entries.push(StoredMessage {
                conversation_id: write.conversation_id,
                role: MessageRole::User,
                content: write.user_text,
                tokens_used: write.prompt_tokens,
                model_id: None,
                is_deleted: false,
                created_at: now,
            });
            entries.push(StoredMessage {
                conversation_id: write.conversation_id,
                role: MessageRole::Assistant,
                content: write.assistant_text,
                tokens_used: write.completion_tokens,
                model_id: Some(write.model_id),
                is_deleted: false,
                created_at: now + Duration::from_nanos(1),
            });

            Ok(())
        })
    }

    fn messages<'a>(
        &'a self,
        conversation_id: ConversationId,
    ) -> ChatFuture<'a, Result<Vec<StoredMessage>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .lock_state()?
                .messages
                .get(&conversation_id)
                .map(|entries| {
                    entries
                        .iter()
                        .filter(|message| !message.is_deleted)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }
}

impl CallLogStore for InMemoryChatStore {
    fn append_call<'a>(&'a self, record: CallRecord) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.lock_state()?.calls.push(record);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_turn_appends_pair_and_bumps_counters() {
        let store = InMemoryChatStore::new();
        let conversation = store
            .create_conversation(UserId::new(1), ModelId::new(2), "First".to_string())
            .await
            .expect("create conversation");

        store
            .record_turn(TurnWrite {
                conversation_id: conversation.id,
                model_id: ModelId::new(2),
                user_text: "question".to_string(),
                assistant_text: "answer".to_string(),
                prompt_tokens: 30,
                completion_tokens: 12,
                retitle: None,
            })
            .await
            .expect("record turn");

        let updated = store
            .conversation(conversation.id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(updated.message_count, 2);
        assert_eq!(updated.total_tokens, 42);

        let messages = store.messages(conversation.id).await.expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].tokens_used, 30);
        assert_eq!(messages[0].model_id, None);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].tokens_used, 12);
        assert_eq!(messages[1].model_id, Some(ModelId::new(2)));
    }

    #[tokio::test]
    async fn record_turn_retitles_when_requested() {
        let store = InMemoryChatStore::new();
        let conversation = store
            .create_conversation(
                UserId::new(1),
                ModelId::new(2),
                DEFAULT_CONVERSATION_TITLE.to_string(),
            )
            .await
            .expect("create conversation");

        store
            .record_turn(TurnWrite {
                conversation_id: conversation.id,
                model_id: ModelId::new(2),
                user_text: "what is rust".to_string(),
                assistant_text: "a language".to_string(),
                prompt_tokens: 6,
                completion_tokens: 4,
                retitle: Some("what is rust".to_string()),
            })
            .await
            .expect("record turn");

        let updated = store
            .conversation(conversation.id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(updated.title, "what is rust");
    }

    #[tokio::test]
    async fn model_by_name_finds_the_matching_entry() {
        let store = InMemoryChatStore::new();
        store
            .insert_model(ModelDescriptor::new(ModelId::new(1), "DeepSeek V3", "deepseek"))
            .expect("seed model");

        let found = store
            .model_by_name("DeepSeek V3")
            .await
            .expect("lookup")
            .expect("exists");
        assert_eq!(found.id, ModelId::new(1));

        assert!(store.model_by_name("GPT-4").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn touch_last_used_sets_timestamp() {
        let store = InMemoryChatStore::new();
        store
            .upsert_credential(UserCredential::encrypted(
                UserId::new(1),
                ModelId::new(2),
                "enc",
            ))
            .expect("seed credential");

        store
            .touch_last_used(UserId::new(1), ModelId::new(2))
            .await
            .expect("touch");

        let credential = store
            .credential_for(UserId::new(1), ModelId::new(2))
            .await
            .expect("load")
            .expect("exists");
        assert!(credential.last_used_at.is_some());
    }
}
