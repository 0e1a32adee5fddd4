use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dwellhub_db::models::{MaintenanceRequest, MaintenanceStatus};
use dwellhub_services::{
    auth::{Entity, Operation},
    dao::maintenance::{MaintenanceFilter, MaintenancePatch, NewMaintenanceRequest},
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
pub struct MaintenanceResponse {
    pub id: String,
    pub property_id: String,
    pub client_id: String,
    pub owner_id: String,
    pub description: String,
    pub status: MaintenanceStatus,
    pub reported_at: String,
}

impl From<MaintenanceRequest> for MaintenanceResponse {
    fn from(m: MaintenanceRequest) -> Self {
        Self {
            id: hex(m.id),
            property_id: m.property_id.to_hex(),
            client_id: m.client_id.to_hex(),
            owner_id: m.owner_id.to_hex(),
            description: m.description,
            status: m.status,
            reported_at: rfc3339(m.reported_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    #[validate(required)]
    pub property_id: Option<String>,
    #[validate(required, length(min = 10, max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 10, max = 500))]
    pub description: Option<String>,
    pub status: Option<MaintenanceStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceQuery {
    pub property_id: Option<String>,
    pub client_id: Option<String>,
    pub owner_id: Option<String>,
    pub status: Option<MaintenanceStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MaintenanceQuery>,
) -> Result<Json<Vec<MaintenanceResponse>>, ApiError> {
    let filter = MaintenanceFilter {
        property_id: parse_opt_id(query.property_id.as_deref(), "property")?,
        client_id: parse_opt_id(query.client_id.as_deref(), "client")?,
        owner_id: parse_opt_id(query.owner_id.as_deref(), "owner")?,
        status: query.status,
    };
    let requests = state.maintenance.find_all(filter).await?;
    Ok(Json(requests.into_iter().map(MaintenanceResponse::from).collect()))
}

pub async fn list_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<MaintenanceResponse>>, ApiError> {
    let filter = MaintenanceFilter {
        owner_id: Some(parse_id(&owner_id, "owner")?),
        ..Default::default()
    };
    let requests = state.maintenance.find_all(filter).await?;
    Ok(Json(requests.into_iter().map(MaintenanceResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let id = parse_id(&request_id, "maintenance request")?;
    Ok(Json(state.maintenance.base.find_by_id(id).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<MaintenanceResponse>), ApiError> {
    let principal = auth.authorize(Entity::Maintenance, Operation::Create)?;
    let property_id = parse_id(&required(body.property_id, "property_id")?, "property")?;

    let request = state
        .maintenance
        .create(NewMaintenanceRequest {
            property_id,
            client_id: principal.id,
            description: required(body.description, "description")?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(request.into())))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateMaintenanceRequest>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let principal = auth.authorize(Entity::Maintenance, Operation::Update)?;
    let id = parse_id(&request_id, "maintenance request")?;
    let existing = state.maintenance.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(existing.owner_id),
        "Only the property owner may update this request",
    )?;

    let request = state
        .maintenance
        .update(
            id,
            MaintenancePatch {
                description: body.description,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(request.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Maintenance, Operation::Delete)?;
    let id = parse_id(&request_id, "maintenance request")?;
    let existing = state.maintenance.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(existing.owner_id) || principal.id == existing.client_id,
        "Only the reporting client or the property owner may delete this request",
    )?;
    state.maintenance.delete(id).await?;
    Ok(Json(DeletedResponse::new("Maintenance request")))
}
