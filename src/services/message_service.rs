use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::messages::{AiExchange, ChatTarget, MessageList, SendAiMessageRequest, SendMessageRequest},
    entity::{
        messages::{ActiveModel as MessageActive, Column, Entity as Messages},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{BotIdentifier, ChatMessage},
    response::{ApiResponse, Meta},
    routes::params::MessageQuery,
    state::AppState,
};

const MAX_CONTENT_CHARS: usize = 4000;

/// A conversation needs exactly one counterpart: a user or a bot.
pub fn resolve_target(
    receiver_id: Option<Uuid>,
    bot_receiver_id: Option<BotIdentifier>,
) -> AppResult<ChatTarget> {
    match (receiver_id, bot_receiver_id) {
        (Some(id), None) => Ok(ChatTarget::User(id)),
        (None, Some(bot)) => Ok(ChatTarget::Bot(bot)),
        (None, None) => Err(AppError::BadRequest(
            "receiver_id or bot_receiver_id is required".into(),
        )),
        (Some(_), Some(_)) => Err(AppError::BadRequest(
            "Only one of receiver_id and bot_receiver_id may be set".into(),
        )),
    }
}

fn validate_content(content: &str) -> AppResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Message is empty".into()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::BadRequest("Message is too long".into()));
    }
    Ok(content.to_string())
}

fn conversation(me: Uuid, target: ChatTarget) -> Condition {
    match target {
        ChatTarget::User(other) => Condition::any()
            .add(
                Condition::all()
                    .add(Column::SenderId.eq(me))
                    .add(Column::ReceiverId.eq(other)),
            )
            .add(
                Condition::all()
                    .add(Column::SenderId.eq(other))
                    .add(Column::ReceiverId.eq(me)),
            ),
        ChatTarget::Bot(bot) => Condition::any()
            .add(
                Condition::all()
                    .add(Column::SenderId.eq(me))
                    .add(Column::BotReceiverId.eq(bot.as_str())),
            )
            .add(
                Condition::all()
                    .add(Column::BotSenderId.eq(bot.as_str()))
                    .add(Column::ReceiverId.eq(me)),
            ),
    }
}

/// Messages between the caller and one counterpart, newest first.
pub async fn list_messages(
    state: &AppState,
    user: &AuthUser,
    query: MessageQuery,
) -> AppResult<ApiResponse<MessageList>> {
    let target = resolve_target(query.receiver_id, query.bot_receiver_id)?;
    let (page, page_size, offset) = query.window();

    let finder = Messages::find()
        .filter(conversation(user.user_id, target))
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(page_size)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ChatMessage::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        MessageList { items },
        Some(Meta::new(page as i64, page_size as i64, total)),
    ))
}

pub async fn send_message(
    state: &AppState,
    user: &AuthUser,
    payload: SendMessageRequest,
) -> AppResult<ApiResponse<ChatMessage>> {
    let target = resolve_target(payload.receiver_id, payload.bot_receiver_id)?;
    let content = validate_content(&payload.content)?;

    if let ChatTarget::User(receiver) = target {
        if Users::find_by_id(receiver).one(&state.orm).await?.is_none() {
            return Err(AppError::NotFound);
        }
    }

    let message = insert_message(state, user.user_id, target, content).await?;
    Ok(ApiResponse::success("Sent", message, Some(Meta::empty())))
}

/// Store the question for the assistant, then ask the relay for its reply.
pub async fn send_ai_message(
    state: &AppState,
    user: &AuthUser,
    payload: SendAiMessageRequest,
) -> AppResult<ApiResponse<AiExchange>> {
    let content = validate_content(&payload.content)?;
    let question = insert_message(
        state,
        user.user_id,
        ChatTarget::Bot(BotIdentifier::OpenaiVirtualAssistant),
        content,
    )
    .await?;

    let reply = match state.chat.request_reply(&user.token, question.id).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(error = %err, message_id = %question.id, "AI relay failed");
            return Err(err.into());
        }
    };

    Ok(ApiResponse::success(
        "OK",
        AiExchange { question, reply },
        Some(Meta::empty()),
    ))
}

async fn insert_message(
    state: &AppState,
    sender: Uuid,
    target: ChatTarget,
    content: String,
) -> AppResult<ChatMessage> {
    let (receiver_id, bot_receiver_id) = match target {
        ChatTarget::User(id) => (Some(id), None),
        ChatTarget::Bot(bot) => (None, Some(bot.as_str().to_string())),
    };
    let model = MessageActive {
        id: Set(Uuid::new_v4()),
        sender_id: Set(Some(sender)),
        receiver_id: Set(receiver_id),
        bot_sender_id: Set(None),
        bot_receiver_id: Set(bot_receiver_id),
        content: Set(content),
        created_at: NotSet,
        updated_at: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(model.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_requires_exactly_one_counterpart() {
        let id = Uuid::new_v4();
        assert_eq!(resolve_target(Some(id), None).ok(), Some(ChatTarget::User(id)));
        assert_eq!(
            resolve_target(None, Some(BotIdentifier::OpenaiVirtualAssistant)).ok(),
            Some(ChatTarget::Bot(BotIdentifier::OpenaiVirtualAssistant))
        );
        assert!(resolve_target(None, None).is_err());
        assert!(resolve_target(Some(id), Some(BotIdentifier::OpenaiVirtualAssistant)).is_err());
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(validate_content("   ").is_err());
        assert_eq!(validate_content("  xin chào ").ok().as_deref(), Some("xin chào"));
    }
}
