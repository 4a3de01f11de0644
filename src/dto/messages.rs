use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{BotIdentifier, ChatMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    User(Uuid),
    Bot(BotIdentifier),
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
    pub receiver_id: Option<Uuid>,
    pub bot_receiver_id: Option<BotIdentifier>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendAiMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageList {
    pub items: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AiExchange {
    pub question: ChatMessage,
    pub reply: ChatMessage,
}
