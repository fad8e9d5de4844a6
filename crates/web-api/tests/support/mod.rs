//! 集成测试支撑：内存版持久化客户端 + 路由构建。
//!
//! 不依赖外部数据库，行为与 PostgreSQL 实现保持一致
//! （包括同一对参与者的唯一冲突）。

use std::{collections::HashMap, sync::Arc};

use application::{
    ChatRepository, ChatService, ChatServiceDependencies, MessageRepository, MessageService,
    MessageServiceDependencies, SystemClock, UserRepository,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use domain::{Chat, ChatId, Message, RepositoryError, User, UserId};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use web_api::{router, AppState, JwtConfig, JwtService};

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    data: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub async fn insert(&self, user: User) {
        self.data.write().await.insert(Uuid::from(user.id), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.data.read().await.get(&Uuid::from(id)).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryChatRepository {
    data: Arc<RwLock<HashMap<Uuid, Chat>>>,
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn list_for_participant(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError> {
        let guard = self.data.read().await;
        Ok(guard
            .values()
            .filter(|chat| chat.has_participant(user_id))
            .cloned()
            .collect())
    }

    async fn find_for_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let guard = self.data.read().await;
        Ok(guard
            .get(&Uuid::from(chat_id))
            .filter(|chat| chat.has_participant(user_id))
            .cloned())
    }

    async fn find_by_participants(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let guard = self.data.read().await;
        Ok(guard
            .values()
            .find(|chat| chat.has_participant(a) && chat.has_participant(b))
            .cloned())
    }

    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError> {
        let mut guard = self.data.write().await;
        // 与存储层唯一索引一致：同一对参与者只能有一个会话
        if guard
            .values()
            .any(|existing| existing.participants == chat.participants)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(Uuid::from(chat.id), chat.clone());
        Ok(chat)
    }

    async fn append_seen_by(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.data.write().await;
        if let Some(chat) = guard.get_mut(&Uuid::from(chat_id)) {
            chat.mark_seen(user_id);
        }
        Ok(())
    }

    async fn overwrite_seen_by(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let mut guard = self.data.write().await;
        match guard.get_mut(&Uuid::from(chat_id)) {
            Some(chat) if chat.has_participant(user_id) => {
                chat.reset_seen(user_id);
                Ok(Some(chat.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMessageRepository {
    data: Arc<RwLock<Vec<Message>>>,
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError> {
        let guard = self.data.read().await;
        let mut messages: Vec<Message> = guard
            .iter()
            .filter(|message| message.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(Uuid::from(a.id).cmp(&Uuid::from(b.id)))
        });
        Ok(messages)
    }

    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        self.data.write().await.push(message.clone());
        Ok(message)
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: InMemoryUserRepository,
    jwt_service: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        let users = InMemoryUserRepository::default();
        let chats = InMemoryChatRepository::default();
        let messages = InMemoryMessageRepository::default();

        let clock = Arc::new(SystemClock);
        let chat_repository: Arc<dyn ChatRepository> = Arc::new(chats);
        let user_repository: Arc<dyn UserRepository> = Arc::new(users.clone());
        let message_repository: Arc<dyn MessageRepository> = Arc::new(messages);

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

        let jwt_service = JwtService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 24,
        });

        let state = AppState::new(
            Arc::new(chat_service),
            Arc::new(message_service),
            Arc::new(jwt_service.clone()),
        );

        Self {
            router: router(state),
            users,
            jwt_service,
        }
    }

    pub async fn seed_user(&self, id: Uuid, username: &str) {
        self.users
            .insert(User {
                id: UserId::from(id),
                username: username.to_string(),
                avatar: None,
            })
            .await;
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.jwt_service
            .generate_token(user_id)
            .expect("token generation")
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
