//! 持久化客户端接口。
//!
//! 每个 trait 只暴露用例实际需要的操作；任何存储引擎实现这组接口
//! 即可替换底层数据库而不触碰服务逻辑。

use async_trait::async_trait;
use domain::{Chat, ChatId, Message, RepositoryError, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// 按成员身份列出会话，顺序由存储决定。
    async fn list_for_participant(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError>;

    /// 按 id 查找会话，但仅当 user_id 是参与者时命中。
    /// 存在但对请求者不可见的会话与不存在的会话不可区分。
    async fn find_for_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<Chat>, RepositoryError>;

    /// 查找同时包含两个用户的会话（顺序无关）。
    async fn find_by_participants(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<Chat>, RepositoryError>;

    /// 插入新会话。同一对参与者已有会话时返回 `RepositoryError::Conflict`。
    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError>;

    /// 把 user_id 追加进已读集合（已存在则不变），不做参与者过滤。
    async fn append_seen_by(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<(), RepositoryError>;

    /// 把已读集合整体覆盖为 {user_id}，仅当 user_id 是参与者时生效；
    /// 未命中任何行时返回 None。
    async fn overwrite_seen_by(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<Chat>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 会话内全部消息，按创建时间升序，时间相同按 id 升序。
    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError>;

    async fn create(&self, message: Message) -> Result<Message, RepositoryError>;
}
