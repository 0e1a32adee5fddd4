use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dwellhub_db::models::{Notification, NotificationStatus, NotificationType};
use dwellhub_services::{
    auth::{Entity, Operation},
    dao::notification::{NewNotification, NotificationFilter, NotificationPatch},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DeletedResponse, ensure_access, hex, parse_id, parse_opt_id, required, rfc3339};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidatedJson, query::ApiQuery},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: hex(n.id),
            user_id: n.user_id.to_hex(),
            title: n.title,
            description: n.description,
            notification_type: n.notification_type,
            status: n.status,
            created_at: rfc3339(n.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    #[validate(required, length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(required, length(min = 1, max = 1000))]
    pub description: Option<String>,
    #[validate(required)]
    pub notification_type: Option<NotificationType>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNotificationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub notification_type: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Option<String>,
    pub status: Option<NotificationStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NotificationQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let filter = NotificationFilter {
        user_id: parse_opt_id(query.user_id.as_deref(), "user")?,
        status: query.status,
    };
    let notifications = state.notifications.find_all(filter).await?;
    Ok(Json(notifications.into_iter().map(NotificationResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let id = parse_id(&notification_id, "notification")?;
    Ok(Json(state.notifications.base.find_by_id(id).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), ApiError> {
    let principal = auth.authorize(Entity::Notification, Operation::Create)?;

    let notification = state
        .notifications
        .create(NewNotification {
            user_id: principal.id,
            title: required(body.title, "title")?,
            description: required(body.description, "description")?,
            notification_type: required(body.notification_type, "notification_type")?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(notification.into())))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateNotificationRequest>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let principal = auth.authorize(Entity::Notification, Operation::Update)?;
    let id = parse_id(&notification_id, "notification")?;
    let existing = state.notifications.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(existing.user_id),
        "Not your notification",
    )?;

    let notification = state
        .notifications
        .update(
            id,
            NotificationPatch {
                title: body.title,
                description: body.description,
                notification_type: body.notification_type,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(notification.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Notification, Operation::Delete)?;
    let id = parse_id(&notification_id, "notification")?;
    let existing = state.notifications.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(existing.user_id),
        "Not your notification",
    )?;
    state.notifications.delete(id).await?;
    Ok(Json(DeletedResponse::new("Notification")))
}
