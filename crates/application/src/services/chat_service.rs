use std::sync::Arc;

use domain::{Chat, ChatId, ChatParticipants, DomainError, RepositoryError, UserId};
use uuid::Uuid;

use crate::{
    clock::Clock,
    dto::{ChatDetailDto, ChatDto, ChatSummaryDto},
    error::ApplicationError,
    repository::{ChatRepository, MessageRepository, UserRepository},
};

#[derive(Debug, Clone)]
pub struct AddChatRequest {
    pub requester_id: Uuid, // 请求者（由上游认证提供）
    pub receiver_id: Option<Uuid>,
}

/// add_chat 的结果：复用已有会话或新建会话，HTTP 层据此选 200 / 201。
#[derive(Debug, Clone)]
pub struct AddChatOutcome {
    pub chat: ChatDto,
    pub created: bool,
}

pub struct ChatServiceDependencies {
    pub chat_repository: Arc<dyn ChatRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

/// 会话用例服务。
///
/// 负责会话可见性（只能看到自己参与的会话）、同一对用户的去重，
/// 以及已读集合的追加 / 覆盖两种规则。
pub struct ChatService {
    deps: ChatServiceDependencies,
}

impl ChatService {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        Self { deps }
    }

    /// 列出请求者参与的全部会话，每个会话附上对方参与者的最小投影。
    pub async fn list_chats(
        &self,
        requester_id: UserId,
    ) -> Result<Vec<ChatSummaryDto>, ApplicationError> {
        let chats = self
            .deps
            .chat_repository
            .list_for_participant(requester_id)
            .await?;

        // 逐会话解析 receiver；对方用户已不存在时保持 None
        let mut summaries = Vec::with_capacity(chats.len());
        for chat in &chats {
            let receiver = match chat.participants.other_than(requester_id) {
                Some(receiver_id) => self.deps.user_repository.find_by_id(receiver_id).await?,
                None => None,
            };
            summaries.push(ChatSummaryDto::new(chat, receiver.as_ref()));
        }

        Ok(summaries)
    }

    /// 获取单个会话及其按时间升序的消息。
    ///
    /// 可见性折叠进存在性检查：请求者不是参与者时等同于会话不存在。
    /// 返回的是追加已读之前的快照。
    pub async fn get_chat(
        &self,
        requester_id: UserId,
        chat_id: ChatId,
    ) -> Result<ChatDetailDto, ApplicationError> {
        let chat = self
            .deps
            .chat_repository
            .find_for_participant(chat_id, requester_id)
            .await?
            .ok_or(DomainError::ChatNotFound)?;

        let messages = self
            .deps
            .message_repository
            .list_for_chat(chat_id)
            .await?;

        self.deps
            .chat_repository
            .append_seen_by(chat_id, requester_id)
            .await?;

        Ok(ChatDetailDto::new(&chat, &messages))
    }

    /// 创建或复用两个用户之间的会话。
    ///
    /// 校验顺序：缺 receiver_id → 参数错误；receiver 即请求者本人 →
    /// 参数错误；receiver 不存在 → 未找到。之后先按参与者对查找复用，
    /// 没有再插入；插入撞上唯一索引说明并发请求抢先创建，重查并复用。
    pub async fn add_chat(
        &self,
        request: AddChatRequest,
    ) -> Result<AddChatOutcome, ApplicationError> {
        let requester_id = UserId::from(request.requester_id);
        let receiver_id = request
            .receiver_id
            .map(UserId::from)
            .ok_or_else(|| DomainError::invalid_argument("receiver_id", "is required"))?;

        let participants = ChatParticipants::new(requester_id, receiver_id)?;

        self.deps
            .user_repository
            .find_by_id(receiver_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if let Some(existing) = self
            .deps
            .chat_repository
            .find_by_participants(requester_id, receiver_id)
            .await?
        {
            return Ok(AddChatOutcome {
                chat: ChatDto::from(&existing),
                created: false,
            });
        }

        let chat = Chat::open(
            ChatId::new(Uuid::new_v4()),
            participants,
            requester_id,
            self.deps.clock.now(),
        )?;

        match self.deps.chat_repository.create(chat).await {
            Ok(created) => Ok(AddChatOutcome {
                chat: ChatDto::from(&created),
                created: true,
            }),
            Err(RepositoryError::Conflict) => {
                // 输掉了并发创建的竞争，复用赢家的会话
                tracing::warn!(
                    requester_id = %requester_id,
                    receiver_id = %receiver_id,
                    "并发创建同一对用户的会话，改为复用已有会话"
                );
                let existing = self
                    .deps
                    .chat_repository
                    .find_by_participants(requester_id, receiver_id)
                    .await?
                    .ok_or(ApplicationError::Repository(RepositoryError::Conflict))?;
                Ok(AddChatOutcome {
                    chat: ChatDto::from(&existing),
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// 把会话标记为已读：已读集合整体覆盖为 {请求者}。
    pub async fn read_chat(
        &self,
        requester_id: UserId,
        chat_id: ChatId,
    ) -> Result<ChatDto, ApplicationError> {
        let chat = self
            .deps
            .chat_repository
            .overwrite_seen_by(chat_id, requester_id)
            .await?
            .ok_or(DomainError::ChatNotFound)?;

        Ok(ChatDto::from(&chat))
    }
}
