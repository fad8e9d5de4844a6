use std::sync::Arc;

use domain::{ChatId, DomainError, Message, MessageBody, MessageId, UserId};
use uuid::Uuid;

use crate::{
    clock::Clock,
    dto::MessageDto,
    error::ApplicationError,
    repository::{ChatRepository, MessageRepository},
};

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub chat_id: Uuid,
    pub sender_id: Uuid, // 发送者（由上游认证提供）
    pub body: String,
}

pub struct MessageServiceDependencies {
    pub chat_repository: Arc<dyn ChatRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

/// 消息用例服务：向会话发送消息。
pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 向会话写入一条消息。
    ///
    /// 发送者必须是会话参与者，否则等同于会话不存在。写入成功后
    /// 已读集合重置为 {发送者}：对方还没看过最新状态。
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<MessageDto, ApplicationError> {
        let chat_id = ChatId::from(request.chat_id);
        let sender_id = UserId::from(request.sender_id);

        let chat = self
            .deps
            .chat_repository
            .find_for_participant(chat_id, sender_id)
            .await?
            .ok_or(DomainError::ChatNotFound)?;

        let body = MessageBody::new(request.body)?;
        let message = Message::new(
            MessageId::new(Uuid::new_v4()),
            chat.id,
            sender_id,
            body,
            self.deps.clock.now(),
        );

        let stored = self.deps.message_repository.create(message).await?;

        self.deps
            .chat_repository
            .overwrite_seen_by(chat.id, sender_id)
            .await?;

        Ok(MessageDto::from(&stored))
    }
}
