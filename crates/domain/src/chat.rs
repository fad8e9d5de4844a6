use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{ChatId, ChatParticipants, Timestamp, UserId};

/// 两人会话。
///
/// 参与者对在创建后不可变；`seen_by` 记录已查看最新状态的参与者，
/// 查看会话时追加（mark_seen），标记已读时整体重置（reset_seen）。
/// 两种写法语义不同，刻意分开保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub participants: ChatParticipants,
    pub seen_by: Vec<UserId>,
    pub created_at: Timestamp,
}

impl Chat {
    /// 首次联系时开启会话，创建者即视为已读。
    pub fn open(
        id: ChatId,
        participants: ChatParticipants,
        creator: UserId,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        if !participants.contains(creator) {
            return Err(DomainError::invalid_argument(
                "creator",
                "must be a participant",
            ));
        }
        Ok(Self {
            id,
            participants,
            seen_by: vec![creator],
            created_at,
        })
    }

    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// 追加到已读集合；已在集合中则不重复。返回是否发生了变化。
    pub fn mark_seen(&mut self, user_id: UserId) -> bool {
        if self.seen_by.contains(&user_id) {
            return false;
        }
        self.seen_by.push(user_id);
        true
    }

    /// 用单个用户覆盖整个已读集合。
    pub fn reset_seen(&mut self, user_id: UserId) {
        self.seen_by = vec![user_id];
    }
}
