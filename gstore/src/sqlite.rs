use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use gcommon::{ConversationId, ModelId, UserId};
use gchat::{
    CallLogStore, CallRecord, ChatError, ChatFuture, ConversationRecord, ConversationStore,
    CredentialStore, DEFAULT_CONVERSATION_TITLE, MessageRole, ModelCatalog, ModelDescriptor,
    StoredMessage, TurnWrite, UserCredential,
};
use rusqlite::{Connection, OptionalExtension, params};

/// SQLite-backed implementation of every chat storage contract. One
/// connection behind a mutex; WAL mode keeps readers from blocking the
/// writer across processes.
#[derive(Debug)]
pub struct SqliteChatStore {
    connection: Mutex<Connection>,
}

impl SqliteChatStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                ChatError::storage(format!("failed to create sqlite parent directory: {error}"))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            ChatError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, ChatError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            ChatError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, ChatError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                ChatError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ChatError> {
        self.connection
            .lock()
            .map_err(|_| ChatError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), ChatError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS models (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                provider TEXT NOT NULL,
                endpoint TEXT,
                is_active INTEGER NOT NULL,
                max_tokens INTEGER NOT NULL,
                rate_limit_per_minute INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                model_id INTEGER NOT NULL,
                api_key TEXT,
                api_key_encrypted TEXT,
                endpoint TEXT,
                is_enabled INTEGER NOT NULL,
                last_used_at_secs INTEGER,
                last_used_at_nanos INTEGER,
                UNIQUE (user_id, model_id),
                CHECK (api_key IS NULL OR api_key_encrypted IS NULL)
            );

            CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                model_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                message_count INTEGER NOT NULL,
                total_tokens INTEGER NOT NULL,
                is_archived INTEGER NOT NULL,
                is_deleted INTEGER NOT NULL,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL,
                updated_at_secs INTEGER NOT NULL,
                updated_at_nanos INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_conversations_user_id
            ON conversations(user_id, id);

            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                tokens_used INTEGER NOT NULL,
                model_id INTEGER,
                is_deleted INTEGER NOT NULL,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_conversation_id
            ON messages(conversation_id, id);

            CREATE TABLE IF NOT EXISTS call_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                model_id INTEGER NOT NULL,
                conversation_id INTEGER,
                endpoint TEXT,
                prompt_tokens INTEGER NOT NULL,
                completion_tokens INTEGER NOT NULL,
                total_tokens INTEGER NOT NULL,
                cost REAL NOT NULL,
                latency_ms INTEGER NOT NULL,
                status_code INTEGER NOT NULL,
                success INTEGER NOT NULL,
                error_message TEXT,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_call_records_user_created
            ON call_records(user_id, created_at_secs, id);
            ",
        )
        .map_err(|error| {
            ChatError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }

    /// Catalog seeding used by deployments and tests.
    pub fn insert_model(&self, model: &ModelDescriptor) -> Result<(), ChatError> {
        let conn = self.connection()?;
        conn.execute(
            "
            INSERT INTO models (
                id, name, provider, endpoint, is_active, max_tokens, rate_limit_per_minute
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                provider = excluded.provider,
                endpoint = excluded.endpoint,
                is_active = excluded.is_active,
                max_tokens = excluded.max_tokens,
                rate_limit_per_minute = excluded.rate_limit_per_minute
            ",
            params![
                model.id.get(),
                &model.name,
                &model.provider,
                model.endpoint.as_deref(),
                if model.is_active { 1_i64 } else { 0_i64 },
                i64::from(model.max_tokens),
                i64::from(model.rate_limit_per_minute),
            ],
        )
        .map_err(|error| ChatError::storage(format!("failed to upsert model row: {error}")))?;
        Ok(())
    }

    pub fn upsert_credential(&self, credential: &UserCredential) -> Result<(), ChatError> {
        let (secs, nanos) = match credential.last_used_at {
            Some(value) => {
                let (secs, nanos) = encode_system_time(value)?;
                (Some(secs), Some(nanos))
            }
            None => (None, None),
        };

        let conn = self.connection()?;
        conn.execute(
            "
            INSERT INTO user_credentials (
                user_id,
                model_id,
                api_key,
                api_key_encrypted,
                endpoint,
                is_enabled,
                last_used_at_secs,
                last_used_at_nanos
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id, model_id) DO UPDATE SET
                api_key = excluded.api_key,
                api_key_encrypted = excluded.api_key_encrypted,
                endpoint = excluded.endpoint,
                is_enabled = excluded.is_enabled,
                last_used_at_secs = excluded.last_used_at_secs,
                last_used_at_nanos = excluded.last_used_at_nanos
            ",
            params![
                credential.user_id.get(),
                credential.model_id.get(),
                credential.api_key.as_deref(),
                credential.api_key_encrypted.as_deref(),
                credential.endpoint.as_deref(),
                if credential.is_enabled { 1_i64 } else { 0_i64 },
                secs,
                nanos,
            ],
        )
        .map_err(|error| ChatError::storage(format!("failed to upsert credential row: {error}")))?;
        Ok(())
    }

    pub fn archive_conversation(&self, conversation_id: ConversationId) -> Result<(), ChatError> {
        let conn = self.connection()?;
        let updated = conn
            .execute(
                "UPDATE conversations SET is_archived = 1 WHERE id = ?1",
                params![conversation_id.get()],
            )
            .map_err(|error| {
                ChatError::storage(format!("failed to archive conversation row: {error}"))
            })?;
        if updated == 0 {
            return Err(ChatError::storage("conversation not found"));
        }
        Ok(())
    }

    /// Audit rows for one user, oldest first. Reporting surface; the
    /// orchestrator itself only appends.
    pub fn call_records_for(&self, user_id: UserId) -> Result<Vec<CallRecord>, ChatError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "
                SELECT
                    model_id,
                    conversation_id,
                    endpoint,
                    prompt_tokens,
                    completion_tokens,
                    cost,
                    latency_ms,
                    status_code,
                    success,
                    error_message,
                    created_at_secs,
                    created_at_nanos
                FROM call_records
                WHERE user_id = ?1
                ORDER BY id ASC
                ",
            )
            .map_err(|error| {
                ChatError::storage(format!("failed to prepare call record query: {error}"))
            })?;
        let rows = stmt
            .query_map(params![user_id.get()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, i64>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, i64>(10)?,
                    row.get::<_, i64>(11)?,
                ))
            })
            .map_err(|error| {
                ChatError::storage(format!("failed to query call record rows: {error}"))
            })?;

        let mut records = Vec::new();
        for row in rows {
            let (
                model_id,
                conversation_id,
                endpoint,
                prompt_tokens,
                completion_tokens,
                cost,
                latency_ms,
                status_code,
                success,
                error_message,
                secs,
                nanos,
            ) = row.map_err(|error| {
                ChatError::storage(format!("failed to read call record row: {error}"))
            })?;
            records.push(CallRecord {
                user_id,
                model_id: ModelId::new(model_id),
                conversation_id: conversation_id.map(ConversationId::new),
                endpoint,
                prompt_tokens: prompt_tokens as u32,
                completion_tokens: completion_tokens as u32,
                total_tokens: (prompt_tokens + completion_tokens) as u32,
                cost,
                latency_ms: latency_ms as u64,
                status_code: status_code as u16,
                success: success != 0,
                error_message,
                created_at: decode_system_time(secs, nanos)?,
            });
        }
        Ok(records)
    }

    fn model_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ModelDescriptor> {
        Ok(ModelDescriptor {
            id: ModelId::new(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            provider: row.get(2)?,
            endpoint: row.get(3)?,
            is_active: row.get::<_, i64>(4)? != 0,
            max_tokens: row.get::<_, i64>(5)? as u32,
            rate_limit_per_minute: row.get::<_, i64>(6)? as u32,
        })
    }
}

const MODEL_COLUMNS: &str = "id, name, provider, endpoint, is_active, max_tokens, rate_limit_per_minute";

impl ModelCatalog for SqliteChatStore {
    fn model<'a>(
        &'a self,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<Option<ModelDescriptor>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.query_row(
                &format!("SELECT {MODEL_COLUMNS} FROM models WHERE id = ?1"),
                params![model_id.get()],
                Self::model_from_row,
            )
            .optional()
            .map_err(|error| ChatError::storage(format!("failed to load model row: {error}")))
        })
    }

    fn model_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<ModelDescriptor>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.query_row(
                &format!("SELECT {MODEL_COLUMNS} FROM models WHERE name = ?1"),
                params![name],
                Self::model_from_row,
            )
            .optional()
            .map_err(|error| ChatError::storage(format!("failed to load model row: {error}")))
        })
    }
}

impl CredentialStore for SqliteChatStore {
    fn credential_for<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<Option<UserCredential>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let row = conn
                .query_row(
                    "
                    SELECT
                        api_key,
                        api_key_encrypted,
                        endpoint,
                        is_enabled,
                        last_used_at_secs,
                        last_used_at_nanos
                    FROM user_credentials
                    WHERE user_id = ?1 AND model_id = ?2
                    ",
                    params![user_id.get(), model_id.get()],
                    |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, Option<String>>(2)?,
                            row.get::<_, i64>(3)?,
                            row.get::<_, Option<i64>>(4)?,
                            row.get::<_, Option<i64>>(5)?,
                        ))
                    },
                )
                .optional()
                .map_err(|error| {
                    ChatError::storage(format!("failed to load credential row: {error}"))
                })?;

            let Some((api_key, api_key_encrypted, endpoint, is_enabled, secs, nanos)) = row
            else {
                return Ok(None);
            };

            let last_used_at = match (secs, nanos) {
                (Some(secs), Some(nanos)) => Some(decode_system_time(secs, nanos)?),
                (None, None) => None,
                _ => {
                    return Err(ChatError::storage(
                        "credential last_used_at must include both seconds and nanos",
                    ));
                }
            };

            Ok(Some(UserCredential {
                user_id,
                model_id,
                api_key,
                api_key_encrypted,
                endpoint,
                is_enabled: is_enabled != 0,
                last_used_at,
            }))
        })
    }

    fn touch_last_used<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let (secs, nanos) = encode_system_time(SystemTime::now())?;
            let conn = self.connection()?;
            conn.execute(
                "
                UPDATE user_credentials
                SET last_used_at_secs = ?1, last_used_at_nanos = ?2
                WHERE user_id = ?3 AND model_id = ?4
                ",
                params![secs, nanos, user_id.get(), model_id.get()],
            )
            .map_err(|error| {
                ChatError::storage(format!("failed to touch credential row: {error}"))
            })?;
            Ok(())
        })
    }
}

impl ConversationStore for SqliteChatStore {
    fn conversation<'a>(
        &'a self,
        conversation_id: ConversationId,
    ) -> ChatFuture<'a, Result<Option<ConversationRecord>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let row = conn
                .query_row(
                    "
                    SELECT
                        user_id,
                        model_id,
                        title,
                        message_count,
                        total_tokens,
                        is_archived,
                        is_deleted,
                        created_at_secs,
                        created_at_nanos,
                        updated_at_secs,
                        updated_at_nanos
                    FROM conversations
                    WHERE id = ?1
                    ",
                    params![conversation_id.get()],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, i64>(5)?,
                            row.get::<_, i64>(6)?,
                            row.get::<_, i64>(7)?,
                            row.get::<_, i64>(8)?,
                            row.get::<_, i64>(9)?,
                            row.get::<_, i64>(10)?,
                        ))
                    },
                )
                .optional()
                .map_err(|error| {
                    ChatError::storage(format!("failed to load conversation row: {error}"))
                })?;

            let Some((
                user_id,
                model_id,
                title,
                message_count,
                total_tokens,
                is_archived,
                is_deleted,
                created_secs,
                created_nanos,
                updated_secs,
                updated_nanos,
            )) = row
            else {
                return Ok(None);
            };

            Ok(Some(ConversationRecord {
                id: conversation_id,
                user_id: UserId::new(user_id),
                model_id: ModelId::new(model_id),
                title,
                message_count: message_count as u32,
                total_tokens: total_tokens as u64,
                is_archived: is_archived != 0,
                is_deleted: is_deleted != 0,
                created_at: decode_system_time(created_secs, created_nanos)?,
                updated_at: decode_system_time(updated_secs, updated_nanos)?,
            }))
        })
    }

    fn create_conversation<'a>(
        &'a self,
        user_id: UserId,
        model_id: ModelId,
        title: String,
    ) -> ChatFuture<'a, Result<ConversationRecord, ChatError>> {
        Box::pin(async move {
            let title = if title.trim().is_empty() {
                DEFAULT_CONVERSATION_TITLE.to_string()
            } else {
                title
            };
            let now = SystemTime::now();
            let (secs, nanos) = encode_system_time(now)?;

            let conn = self.connection()?;
            conn.execute(
                "
                INSERT INTO conversations (
                    user_id,
                    model_id,
                    title,
                    message_count,
                    total_tokens,
                    is_archived,
                    is_deleted,
                    created_at_secs,
                    created_at_nanos,
                    updated_at_secs,
                    updated_at_nanos
                )
                VALUES (?1, ?2, ?3, 0, 0, 0, 0, ?4, ?5, ?4, ?5)
                ",
                params![user_id.get(), model_id.get(), &title, secs, nanos],
            )
            .map_err(|error| {
                ChatError::storage(format!("failed to insert conversation row: {error}"))
            })?;

            Ok(ConversationRecord {
                id: ConversationId::new(conn.last_insert_rowid()),
                user_id,
                model_id,
                title,
                message_count: 0,
                total_tokens: 0,
                is_archived: false,
                is_deleted: false,
                created_at: now,
                updated_at: now,
            })
        })
    }

    fn record_turn<'a>(&'a self, write: TurnWrite) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let now = SystemTime::now();
            let (secs, nanos) = encode_system_time(now)?;

            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                ChatError::storage(format!("failed to begin turn transaction: {error}"))
            })?;

            let updated = tx
                .execute(
                    "
                    UPDATE conversations
                    SET message_count = message_count + 2,
                        total_tokens = total_tokens + ?1,
                        updated_at_secs = ?2,
                        updated_at_nanos = ?3,
                        title = COALESCE(?4, title)
                    WHERE id = ?5
                    ",
                    params![
                        i64::from(write.total_tokens()),
                        secs,
                        nanos,
                        write.retitle.as_deref(),
                        write.conversation_id.get(),
                    ],
                )
                .map_err(|error| {
                    ChatError::storage(format!("failed to update conversation row: {error}"))
                })?;
            if updated == 0 {
                return Err(ChatError::storage("conversation disappeared during turn"));
            }

            for (role, content, tokens, model_id) in [
                (MessageRole::User, &write.user_text, write.prompt_tokens, None),
                (
                    MessageRole::Assistant,
                    &write.assistant_text,
                    write.completion_tokens,
                    Some(write.model_id.get()),
                ),
            ] {
                tx.execute(
                    "
                    INSERT INTO messages (
                        conversation_id,
                        role,
                        content,
                        tokens_used,
                        model_id,
                        is_deleted,
                        created_at_secs,
                        created_at_nanos
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)
                    ",
                    params![
                        write.conversation_id.get(),
                        role_to_str(role),
                        content,
                        i64::from(tokens),
                        model_id,
                        secs,
                        nanos,
                    ],
                )
                .map_err(|error| {
                    ChatError::storage(format!("failed to insert message row: {error}"))
                })?;
            }

            tx.commit().map_err(|error| {
                ChatError::storage(format!("failed to commit turn transaction: {error}"))
            })?;
            Ok(())
        })
    }

    fn messages<'a>(
        &'a self,
        conversation_id: ConversationId,
    ) -> ChatFuture<'a, Result<Vec<StoredMessage>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT role, content, tokens_used, model_id, created_at_secs, created_at_nanos
                    FROM messages
                    WHERE conversation_id = ?1 AND is_deleted = 0
                    ORDER BY id ASC
                    ",
                )
                .map_err(|error| {
                    ChatError::storage(format!("failed to prepare message query: {error}"))
                })?;
            let rows = stmt
                .query_map(params![conversation_id.get()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                })
                .map_err(|error| {
                    ChatError::storage(format!("failed to query message rows: {error}"))
                })?;

            let mut messages = Vec::new();
            for row in rows {
                let (role, content, tokens_used, model_id, secs, nanos) =
                    row.map_err(|error| {
                        ChatError::storage(format!("failed to read message row: {error}"))
                    })?;
                messages.push(StoredMessage {
                    conversation_id,
                    role: role_from_str(&role)?,
                    content,
                    tokens_used: tokens_used as u32,
                    model_id: model_id.map(ModelId::new),
                    is_deleted: false,
                    created_at: decode_system_time(secs, nanos)?,
                });
            }
            Ok(messages)
        })
    }
}

impl CallLogStore for SqliteChatStore {
    fn append_call<'a>(&'a self, record: CallRecord) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let (secs, nanos) = encode_system_time(record.created_at)?;
            let conn = self.connection()?;
            conn.execute(
                "
                INSERT INTO call_records (
                    user_id,
                    model_id,
                    conversation_id,
                    endpoint,
                    prompt_tokens,
                    completion_tokens,
                    total_tokens,
                    cost,
                    latency_ms,
                    status_code,
                    success,
                    error_message,
                    created_at_secs,
                    created_at_nanos
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                ",
                params![
                    record.user_id.get(),
                    record.model_id.get(),
                    record.conversation_id.map(|id| id.get()),
                    record.endpoint.as_deref(),
                    i64::from(record.prompt_tokens),
                    i64::from(record.completion_tokens),
                    i64::from(record.total_tokens),
                    record.cost,
                    record.latency_ms as i64,
                    i64::from(record.status_code),
                    if record.success { 1_i64 } else { 0_i64 },
                    record.error_message.as_deref(),
                    secs,
                    nanos,
                ],
            )
            .map_err(|error| {
                ChatError::storage(format!("failed to append call record: {error}"))
            })?;
            Ok(())
        })
    }
}

fn encode_system_time(value: SystemTime) -> Result<(i64, i64), ChatError> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        ChatError::storage(format!("timestamp predates unix epoch: {error}"))
    })?;
    Ok((
        duration.as_secs() as i64,
        i64::from(duration.subsec_nanos()),
    ))
}

fn decode_system_time(seconds: i64, nanos: i64) -> Result<SystemTime, ChatError> {
    if seconds < 0 {
        return Err(ChatError::storage(format!(
            "timestamp seconds must be non-negative, got {seconds}"
        )));
    }
    if !(0..1_000_000_000).contains(&nanos) {
        return Err(ChatError::storage(format!(
            "timestamp nanos must be in [0, 1_000_000_000), got {nanos}"
        )));
    }
    Ok(UNIX_EPOCH + Duration::new(seconds as u64, nanos as u32))
}

fn role_to_str(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

fn role_from_str(value: &str) -> Result<MessageRole, ChatError> {
    match value {
        "user" => Ok(MessageRole::User),
        "assistant" => Ok(MessageRole::Assistant),
        _ => Err(ChatError::storage(format!(
            "unknown message role value '{value}'"
        ))),
    }
}
