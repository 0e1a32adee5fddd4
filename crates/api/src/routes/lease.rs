use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use dwellhub_db::models::{Lease, LeaseStatus};
use dwellhub_services::{
    auth::{Entity, Operation},
    dao::lease::{LeaseFilter, LeasePatch, NewLease},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    DeletedResponse, ensure_access, hex, parse_id, parse_opt_id, property_owner, required,
    rfc3339, to_bson_date,
};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidatedJson, query::ApiQuery},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct LeaseResponse {
    pub id: String,
    pub property_id: String,
    pub client_id: String,
    pub start_date: String,
    pub end_date: String,
    pub rent_amount: f64,
    pub status: LeaseStatus,
    pub created_at: String,
}

impl From<Lease> for LeaseResponse {
    fn from(l: Lease) -> Self {
        Self {
            id: hex(l.id),
            property_id: l.property_id.to_hex(),
            client_id: l.client_id.to_hex(),
            start_date: rfc3339(l.start_date),
            end_date: rfc3339(l.end_date),
            rent_amount: l.rent_amount,
            status: l.status,
            created_at: rfc3339(l.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeaseRequest {
    #[validate(required)]
    pub property_id: Option<String>,
    /// Tenant of the lease; the caller when omitted.
    pub client_id: Option<String>,
    #[validate(required)]
    pub start_date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub end_date: Option<DateTime<Utc>>,
    #[validate(required, range(exclusive_min = 0.0))]
    pub rent_amount: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLeaseRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(range(exclusive_min = 0.0))]
    pub rent_amount: Option<f64>,
    pub status: Option<LeaseStatus>,
}

#[derive(Debug, Deserialize)]
pub struct LeaseQuery {
    pub property_id: Option<String>,
    pub client_id: Option<String>,
    pub owner_id: Option<String>,
    pub status: Option<LeaseStatus>,
}

async fn find(state: &AppState, filter: LeaseFilter) -> Result<Json<Vec<LeaseResponse>>, ApiError> {
    let leases = state.leases.find_all(filter).await?;
    Ok(Json(leases.into_iter().map(LeaseResponse::from).collect()))
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeaseQuery>,
) -> Result<Json<Vec<LeaseResponse>>, ApiError> {
    let filter = LeaseFilter {
        property_id: parse_opt_id(query.property_id.as_deref(), "property")?,
        client_id: parse_opt_id(query.client_id.as_deref(), "client")?,
        owner_id: parse_opt_id(query.owner_id.as_deref(), "owner")?,
        status: query.status,
    };
    find(&state, filter).await
}

pub async fn list_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<LeaseResponse>>, ApiError> {
    let filter = LeaseFilter {
        owner_id: Some(parse_id(&owner_id, "owner")?),
        ..Default::default()
    };
    find(&state, filter).await
}

pub async fn list_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<LeaseResponse>>, ApiError> {
    let filter = LeaseFilter {
        client_id: Some(parse_id(&client_id, "client")?),
        ..Default::default()
    };
    find(&state, filter).await
}

pub async fn get(
    State(state): State<AppState>,
    Path(lease_id): Path<String>,
) -> Result<Json<LeaseResponse>, ApiError> {
    let id = parse_id(&lease_id, "lease")?;
    Ok(Json(state.leases.base.find_by_id(id).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateLeaseRequest>,
) -> Result<(StatusCode, Json<LeaseResponse>), ApiError> {
    let principal = auth.authorize(Entity::Lease, Operation::Create)?;
    let property_id = parse_id(&required(body.property_id, "property_id")?, "property")?;
    let client_id = parse_opt_id(body.client_id.as_deref(), "client")?.unwrap_or(principal.id);
    if client_id != principal.id {
        // A missing property falls through to the 404 from create.
        let owner = property_owner(&state, property_id).await?;
        ensure_access(
            owner.is_none_or(|owner| principal.owns_or_admin(owner)),
            "Only the property owner may lease it to another client",
        )?;
    }

    let lease = state
        .leases
        .create(NewLease {
            property_id,
            client_id,
            start_date: to_bson_date(required(body.start_date, "start_date")?),
            end_date: to_bson_date(required(body.end_date, "end_date")?),
            rent_amount: required(body.rent_amount, "rent_amount")?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(lease.into())))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(lease_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateLeaseRequest>,
) -> Result<Json<LeaseResponse>, ApiError> {
    let principal = auth.authorize(Entity::Lease, Operation::Update)?;
    let id = parse_id(&lease_id, "lease")?;
    let lease = state.leases.base.find_by_id(id).await?;
    let owner = property_owner(&state, lease.property_id).await?;
    ensure_access(
        principal.is_admin() || owner == Some(principal.id),
        "Only the property owner may update this lease",
    )?;

    let lease = state
        .leases
        .update(
            id,
            LeasePatch {
                start_date: body.start_date.map(to_bson_date),
                end_date: body.end_date.map(to_bson_date),
                rent_amount: body.rent_amount,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(lease.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(lease_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Lease, Operation::Delete)?;
    let id = parse_id(&lease_id, "lease")?;
    let lease = state.leases.base.find_by_id(id).await?;
    if !principal.owns_or_admin(lease.client_id) {
        let owner = property_owner(&state, lease.property_id).await?;
        ensure_access(
            owner == Some(principal.id),
            "Only the lease's client or the property owner may delete it",
        )?;
    }
    state.leases.delete(id).await?;
    Ok(Json(DeletedResponse::new("Lease")))
}
