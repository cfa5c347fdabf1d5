//! Conversation persistence: titles, ownership, and turn writes.

use std::sync::Arc;

use gcommon::{ConversationId, ModelId, UserId};

use crate::{
    ChatError, ConversationRecord, ConversationStore, DEFAULT_CONVERSATION_TITLE, TurnWrite,
};

const TITLE_MAX_CHARS: usize = 30;

/// Collapses whitespace runs and truncates to the title limit. Empty input
/// falls back to the default title.
pub fn derive_title(first_message: &str) -> String {
    let collapsed = first_message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return DEFAULT_CONVERSATION_TITLE.to_string();
    }

    if collapsed.chars().count() <= TITLE_MAX_CHARS {
        return collapsed;
    }

    let mut title: String = collapsed.chars().take(TITLE_MAX_CHARS).collect();
    title.push_str("...");
    title
}

pub struct ConversationPersister {
    store: Arc<dyn ConversationStore>,
}

impl ConversationPersister {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Looks up and checks an existing conversation id supplied by a caller.
    /// Missing, foreign, archived, and deleted conversations all read the
    /// same to the caller: the id is not usable.
    pub async fn verify_ownership(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<ConversationRecord, ChatError> {
        let conversation = self
            .store
            .conversation(conversation_id)
            .await?
            .ok_or_else(|| {
                ChatError::invalid_request(format!("conversation {conversation_id} not found"))
            })?;

        if conversation.user_id != user_id || conversation.is_deleted || conversation.is_archived {
            return Err(ChatError::invalid_request(format!(
                "conversation {conversation_id} not found"
            )));
        }

        Ok(conversation)
    }

    /// Writes the completed turn, creating the conversation first if the
    /// request did not name one. A conversation still carrying the default
    /// title is retitled from this turn's user message.
    pub async fn persist_turn(
        &self,
        user_id: UserId,
        model_id: ModelId,
        conversation: Option<ConversationRecord>,
        user_text: String,
        assistant_text: String,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> Result<ConversationId, ChatError> {
        let (conversation_id, retitle) = match conversation {
            Some(existing) => {
                let retitle = if existing.title == DEFAULT_CONVERSATION_TITLE {
                    Some(derive_title(&user_text))
                } else {
                    None
                };
                (existing.id, retitle)
            }
            None => {
                let created = self
                    .store
                    .create_conversation(user_id, model_id, derive_title(&user_text))
                    .await?;
                (created.id, None)
            }
        };

        self.store
            .record_turn(TurnWrite {
                conversation_id,
                model_id,
                user_text,
                assistant_text,
                prompt_tokens,
                completion_tokens,
                retitle,
            })
            .await?;

        Ok(conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryChatStore;

    #[test]
    fn derive_title_collapses_whitespace_and_truncates() {
        assert_eq!(derive_title("  hello   world  "), "hello world");
        assert_eq!(derive_title(""), DEFAULT_CONVERSATION_TITLE);
        assert_eq!(derive_title(" \t\n "), DEFAULT_CONVERSATION_TITLE);

        let long = "a".repeat(64);
        let title = derive_title(&long);
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));

        let exact = "b".repeat(30);
        assert_eq!(derive_title(&exact), exact);
    }

    #[tokio::test]
    async fn persist_turn_creates_conversation_when_missing() {
        let store = Arc::new(InMemoryChatStore::new());
        let persister = ConversationPersister::new(store.clone());

        let id = persister
            .persist_turn(
                UserId::new(1),
                ModelId::new(2),
                None,
                "What is ownership in Rust exactly?".to_string(),
                "A set of rules".to_string(),
                24,
                6,
            )
            .await
            .expect("persist turn");

        let conversation = store
            .conversation(id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(conversation.title, "What is ownership in Rust exac...");
        assert_eq!(conversation.message_count, 2);
    }

    #[tokio::test]
    async fn persist_turn_retitles_only_default_titles() {
        let store = Arc::new(InMemoryChatStore::new());
        let persister = ConversationPersister::new(store.clone());

        let defaulted = store
            .create_conversation(
                UserId::new(1),
                ModelId::new(2),
                DEFAULT_CONVERSATION_TITLE.to_string(),
            )
            .await
            .expect("create");
        let named = store
            .create_conversation(UserId::new(1), ModelId::new(2), "My topic".to_string())
            .await
            .expect("create");

        persister
            .persist_turn(
                UserId::new(1),
                ModelId::new(2),
                Some(defaulted.clone()),
                "first real question".to_string(),
                "answer".to_string(),
                8,
                2,
            )
            .await
            .expect("persist");
        persister
            .persist_turn(
                UserId::new(1),
                ModelId::new(2),
                Some(named.clone()),
                "another question".to_string(),
                "answer".to_string(),
                8,
                2,
            )
            .await
            .expect("persist");

        let defaulted = store
            .conversation(defaulted.id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(defaulted.title, "first real question");

        let named = store
            .conversation(named.id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(named.title, "My topic");
    }

    #[tokio::test]
    async fn verify_ownership_rejects_foreign_and_deleted_conversations() {
        let store = Arc::new(InMemoryChatStore::new());
        let persister = ConversationPersister::new(store.clone());

        let conversation = store
            .create_conversation(UserId::new(1), ModelId::new(2), "t".to_string())
            .await
            .expect("create");

        let owned = persister
            .verify_ownership(conversation.id, UserId::new(1))
            .await
            .expect("owner can access");
        assert_eq!(owned.id, conversation.id);

        let err = persister
            .verify_ownership(conversation.id, UserId::new(9))
            .await
            .expect_err("foreign user rejected");
        assert_eq!(err.kind, crate::ChatErrorKind::InvalidRequest);

        let err = persister
            .verify_ownership(ConversationId::new(999), UserId::new(1))
            .await
            .expect_err("missing conversation rejected");
        assert_eq!(err.kind, crate::ChatErrorKind::InvalidRequest);

        store
            .archive_conversation(conversation.id)
            .expect("archive");
        let err = persister
            .verify_ownership(conversation.id, UserId::new(1))
            .await
            .expect_err("archived conversation rejected");
        assert_eq!(err.kind, crate::ChatErrorKind::InvalidRequest);
    }
}
