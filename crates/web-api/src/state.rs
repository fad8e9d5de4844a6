use std::sync::Arc;

use application::{ChatService, MessageService};

use crate::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub message_service: Arc<MessageService>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        chat_service: Arc<ChatService>,
        message_service: Arc<MessageService>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            chat_service,
            message_service,
            jwt_service,
        }
    }
}
