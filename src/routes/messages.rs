use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::messages::{AiExchange, MessageList, SendAiMessageRequest, SendMessageRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ChatMessage,
    response::ApiResponse,
    routes::params::MessageQuery,
    services::message_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages).post(send_message))
        .route("/ai", post(send_ai_message))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    params(
        ("receiver_id" = Option<uuid::Uuid>, Query, description = "Other user in the conversation"),
        ("bot_receiver_id" = Option<String>, Query, description = "Bot in the conversation"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("page_size" = Option<u64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Conversation, newest first", body = ApiResponse<MessageList>),
        (status = 400, description = "No counterpart given")
    ),
    tag = "Messages"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MessageQuery>,
) -> AppResult<Json<ApiResponse<MessageList>>> {
    let resp = message_service::list_messages(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = ApiResponse<ChatMessage>)
    ),
    tag = "Messages"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<ChatMessage>>> {
    let resp = message_service::send_message(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/messages/ai",
    request_body = SendAiMessageRequest,
    responses(
        (status = 200, description = "Question and assistant reply", body = ApiResponse<AiExchange>),
        (status = 502, description = "Assistant unavailable")
    ),
    tag = "Messages"
)]
pub async fn send_ai_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendAiMessageRequest>,
) -> AppResult<Json<ApiResponse<AiExchange>>> {
    let resp = message_service::send_ai_message(&state, &user, payload).await?;
    Ok(Json(resp))
}
