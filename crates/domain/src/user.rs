use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 用户只读投影。
///
/// 用户资料归上游子系统所有，本服务只读取 list_chats 所需的最小字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub avatar: Option<String>,
}
