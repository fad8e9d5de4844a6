mod chat_service;
mod message_service;


pub use chat_service::{AddChatOutcome, AddChatRequest, ChatService, ChatServiceDependencies};
pub use message_service::{MessageService, MessageServiceDependencies, SendMessageRequest};
