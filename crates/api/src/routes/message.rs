use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dwellhub_db::models::ChatMessage;
use dwellhub_services::auth::{Entity, Operation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_id, required, rfc3339};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidatedJson},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            sender_id: m.sender_id.to_hex(),
            content: m.content,
            created_at: rfc3339(m.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SentResponse {
    pub conversation_id: String,
    pub message: MessageResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(required)]
    pub receiver_id: Option<String>,
    #[validate(required, length(min = 1, max = 4000))]
    pub content: Option<String>,
}

pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<SentResponse>), ApiError> {
    let principal = auth.authorize(Entity::Conversation, Operation::Create)?;
    let receiver_id = parse_id(&required(body.receiver_id, "receiver_id")?, "receiver")?;

    let (conversation_id, message) = state
        .conversations
        .send(principal.id, receiver_id, required(body.content, "content")?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SentResponse {
            conversation_id: conversation_id.to_hex(),
            message: message.into(),
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let id = parse_id(&conversation_id, "conversation")?;
    let messages = state
        .conversations
        .messages(id, auth.id, auth.is_admin())
        .await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
