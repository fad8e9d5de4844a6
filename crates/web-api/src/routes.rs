use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use application::{
    AddChatRequest, ChatDetailDto, ChatDto, ChatSummaryDto, MessageDto, SendMessageRequest,
};
use domain::ChatId;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct AddChatPayload {
    receiver_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct SendMessagePayload {
    body: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", get(list_chats).post(add_chat))
        .route("/chats/{chat_id}", get(get_chat).patch(read_chat))
        .route("/messages/{chat_id}", post(send_message))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatSummaryDto>>, ApiError> {
    let requester_id = state.jwt_service.extract_user_from_headers(&headers)?;

    let chats = state
        .chat_service
        .list_chats(requester_id)
        .await
        .map_err(|err| ApiError::from_service(err, "failed to get chats"))?;

    Ok(Json(chats))
}

async fn get_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ChatDetailDto>, ApiError> {
    let requester_id = state.jwt_service.extract_user_from_headers(&headers)?;

    let detail = state
        .chat_service
        .get_chat(requester_id, ChatId::from(chat_id))
        .await
        .map_err(|err| ApiError::from_service(err, "failed to get chat"))?;

    Ok(Json(detail))
}

async fn add_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AddChatPayload>,
) -> Result<(StatusCode, Json<ChatDto>), ApiError> {
    let requester_id = state.jwt_service.extract_user_from_headers(&headers)?;

    let outcome = state
        .chat_service
        .add_chat(AddChatRequest {
            requester_id: requester_id.into(),
            receiver_id: payload.receiver_id,
        })
        .await
        .map_err(|err| ApiError::from_service_with_detail(err, "failed to add chat"))?;

    // 复用已有会话回 200，新建回 201
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(outcome.chat)))
}

async fn read_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ChatDto>, ApiError> {
    let requester_id = state.jwt_service.extract_user_from_headers(&headers)?;

    let chat = state
        .chat_service
        .read_chat(requester_id, ChatId::from(chat_id))
        .await
        .map_err(|err| ApiError::from_service(err, "failed to read chat"))?;

    Ok(Json(chat))
}

async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let sender_id = state.jwt_service.extract_user_from_headers(&headers)?;

    let message = state
        .message_service
        .send_message(SendMessageRequest {
            chat_id,
            sender_id: sender_id.into(),
            body: payload.body,
        })
        .await
        .map_err(|err| ApiError::from_service_with_detail(err, "failed to add message"))?;

    Ok((StatusCode::CREATED, Json(message)))
}
