//! 私聊系统核心领域模型
//!
//! 包含用户投影、会话、消息等核心实体，以及参与者对、已读集合的业务规则。

pub mod chat;
pub mod errors;
pub mod message;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use chat::*;
pub use errors::*;
pub use message::*;
pub use user::*;
pub use value_objects::*;
