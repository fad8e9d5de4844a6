//! 主应用程序入口
//!
//! 启动 Axum Web API 服务。

use std::sync::Arc;

use application::{
    ChatRepository, ChatService, ChatServiceDependencies, Clock, MessageRepository,
    MessageService, MessageServiceDependencies, SystemClock, UserRepository,
};
use config::AppConfig;
use infrastructure::{create_pg_pool, PgChatRepository, PgMessageRepository, PgUserRepository};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );

    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    // 创建 repository 实例
    let chat_repository: Arc<dyn ChatRepository> =
        Arc::new(PgChatRepository::new(pg_pool.clone()));
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PgUserRepository::new(pg_pool.clone()));
    let message_repository: Arc<dyn MessageRepository> =
        Arc::new(PgMessageRepository::new(pg_pool));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 创建应用层服务
    let chat_service = ChatService::new(ChatServiceDependencies {
        chat_repository: chat_repository.clone(),
        user_repository,
        message_repository: message_repository.clone(),
        clock: clock.clone(),
    });

    let message_service = MessageService::new(MessageServiceDependencies {
        chat_repository,
        message_repository,
        clock,
    });

    // JWT 只负责校验上游认证服务签发的 token
    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

    let state = AppState::new(
        Arc::new(chat_service),
        Arc::new(message_service),
        jwt_service,
    );

    // 启动 Web 服务器
    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("私聊服务启动在 http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
