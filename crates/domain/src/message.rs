use serde::{Deserialize, Serialize};

use crate::value_objects::{ChatId, MessageBody, MessageId, Timestamp, UserId};

/// 会话内的一条消息，创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        chat_id: ChatId,
        sender_id: UserId,
        body: MessageBody,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            body,
            created_at,
        }
    }
}
