//! 应用层实现。
//!
//! 围绕领域模型的用例服务：输入校验、会话可见性、去重与已读规则，
//! 以及对持久化客户端的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod repository;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use dto::{ChatDetailDto, ChatDto, ChatSummaryDto, MessageDto, ReceiverDto};
pub use error::ApplicationError;
pub use repository::{ChatRepository, MessageRepository, UserRepository};
pub use services::{
    AddChatOutcome, AddChatRequest, ChatService, ChatServiceDependencies, MessageService,
    MessageServiceDependencies, SendMessageRequest,
};
