//! 对外响应的数据传输对象。

use chrono::{DateTime, Utc};
use domain::{Chat, Message, User};
use serde::Serialize;
use uuid::Uuid;

/// list_chats 中附加在每个会话上的对方参与者最小投影。
#[derive(Debug, Clone, Serialize)]
pub struct ReceiverDto {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<&User> for ReceiverDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDto {
    pub id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub seen_by_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Chat> for ChatDto {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.into(),
            participant_ids: chat
                .participants
                .as_slice()
                .iter()
                .map(|id| Uuid::from(*id))
                .collect(),
            seen_by_ids: chat.seen_by.iter().map(|id| Uuid::from(*id)).collect(),
            created_at: chat.created_at,
        }
    }
}

/// 会话加上对方参与者，list_chats 的元素。
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummaryDto {
    pub id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub seen_by_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub receiver: Option<ReceiverDto>,
}

impl ChatSummaryDto {
    pub fn new(chat: &Chat, receiver: Option<&User>) -> Self {
        let base = ChatDto::from(chat);
        Self {
            id: base.id,
            participant_ids: base.participant_ids,
            seen_by_ids: base.seen_by_ids,
            created_at: base.created_at,
            receiver: receiver.map(ReceiverDto::from),
        }
    }
}

/// 会话加上按时间排序的消息，get_chat 的响应。
#[derive(Debug, Clone, Serialize)]
pub struct ChatDetailDto {
    pub id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub seen_by_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageDto>,
}

impl ChatDetailDto {
    pub fn new(chat: &Chat, messages: &[Message]) -> Self {
        let base = ChatDto::from(chat);
        Self {
            id: base.id,
            participant_ids: base.participant_ids,
            seen_by_ids: base.seen_by_ids,
            created_at: base.created_at,
            messages: messages.iter().map(MessageDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.into(),
            chat_id: message.chat_id.into(),
            sender_id: message.sender_id.into(),
            body: message.body.as_str().to_owned(),
            created_at: message.created_at,
        }
    }
}
