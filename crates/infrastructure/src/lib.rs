//! 基础设施层：持久化客户端的 PostgreSQL 实现。

pub mod repository;

pub use repository::{
    create_pg_pool, PgChatRepository, PgMessageRepository, PgUserRepository,
};
