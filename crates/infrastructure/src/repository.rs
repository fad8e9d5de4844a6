use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use application::{ChatRepository, MessageRepository, UserRepository};
use domain::{
    Chat, ChatId, ChatParticipants, Message, MessageBody, MessageId, RepositoryError, User, UserId,
};

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        // 唯一索引冲突单独识别，add_chat 靠它发现并发创建
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::storage(err.to_string()),
    }
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    avatar: Option<String>,
}

impl From<UserRecord> for User {
    fn from(value: UserRecord) -> Self {
        User {
            id: UserId::from(value.id),
            username: value.username,
            avatar: value.avatar,
        }
    }
}

#[derive(Debug, FromRow)]
struct ChatRecord {
    id: Uuid,
    participant_ids: Vec<Uuid>,
    seen_by: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChatRecord> for Chat {
    type Error = RepositoryError;

    fn try_from(value: ChatRecord) -> Result<Self, Self::Error> {
        let [a, b] = value.participant_ids.as_slice() else {
            return Err(invalid_data(format!(
                "chat {} has a malformed participant pair",
                value.id
            )));
        };
        let participants = ChatParticipants::new(UserId::from(*a), UserId::from(*b))
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(Chat {
            id: ChatId::from(value.id),
            participants,
            seen_by: value.seen_by.into_iter().map(UserId::from).collect(),
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    chat_id: Uuid,
    sender_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let body = MessageBody::new(value.body).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Message::new(
            MessageId::from(value.id),
            ChatId::from(value.chat_id),
            UserId::from(value.sender_id),
            body,
            value.created_at,
        ))
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, username, avatar FROM users WHERE id = $1"#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(User::from))
    }
}

#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn list_for_participant(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError> {
        let records = sqlx::query_as::<_, ChatRecord>(
            r#"SELECT id, participant_ids, seen_by, created_at FROM chats WHERE participant_ids @> ARRAY[$1]::uuid[]"#,
        )
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Chat::try_from).collect()
    }

    async fn find_for_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let record = sqlx::query_as::<_, ChatRecord>(
            r#"SELECT id, participant_ids, seen_by, created_at FROM chats WHERE id = $1 AND participant_ids @> ARRAY[$2]::uuid[]"#,
        )
        .bind(Uuid::from(chat_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Chat::try_from).transpose()
    }

    async fn find_by_participants(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let record = sqlx::query_as::<_, ChatRecord>(
            r#"SELECT id, participant_ids, seen_by, created_at FROM chats WHERE participant_ids @> ARRAY[$1, $2]::uuid[] LIMIT 1"#,
        )
        .bind(Uuid::from(a))
        .bind(Uuid::from(b))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Chat::try_from).transpose()
    }

    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError> {
        let participant_ids: Vec<Uuid> = chat
            .participants
            .as_slice()
            .iter()
            .map(|id| Uuid::from(*id))
            .collect();
        let seen_by: Vec<Uuid> = chat.seen_by.iter().map(|id| Uuid::from(*id)).collect();

        let record = sqlx::query_as::<_, ChatRecord>(
            r#"
            INSERT INTO chats (id, participant_ids, seen_by, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, participant_ids, seen_by, created_at
            "#,
        )
        .bind(Uuid::from(chat.id))
        .bind(&participant_ids)
        .bind(&seen_by)
        .bind(chat.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Chat::try_from(record)
    }

    async fn append_seen_by(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        // 已在集合中则谓词不命中，保持集合语义
        sqlx::query(
            r#"
            UPDATE chats
            SET seen_by = array_append(seen_by, $2)
            WHERE id = $1 AND NOT (seen_by @> ARRAY[$2]::uuid[])
            "#,
        )
        .bind(Uuid::from(chat_id))
        .bind(Uuid::from(user_id))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn overwrite_seen_by(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let record = sqlx::query_as::<_, ChatRecord>(
            r#"
            UPDATE chats
            SET seen_by = ARRAY[$2]::uuid[]
            WHERE id = $1 AND participant_ids @> ARRAY[$2]::uuid[]
            RETURNING id, participant_ids, seen_by, created_at
            "#,
        )
        .bind(Uuid::from(chat_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Chat::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, chat_id, sender_id, body, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(Uuid::from(chat_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
    }

    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, chat_id, sender_id, body, created_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(Uuid::from(message.chat_id))
        .bind(Uuid::from(message.sender_id))
        .bind(message.body.as_str())
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
