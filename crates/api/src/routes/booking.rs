use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use dwellhub_db::models::{Booking, BookingStatus};
use dwellhub_services::{
    auth::{Entity, Operation, Principal},
    dao::booking::{BookingFilter, BookingPatch, NewBooking},
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
pub struct BookingResponse {
    pub id: String,
    pub property_id: String,
    pub client_id: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub booked_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: hex(b.id),
            property_id: b.property_id.to_hex(),
            client_id: b.client_id.to_hex(),
            check_in_date: rfc3339(b.check_in_date),
            check_out_date: rfc3339(b.check_out_date),
            total_amount: b.total_amount,
            status: b.status,
            booked_at: rfc3339(b.booked_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(required)]
    pub property_id: Option<String>,
    #[validate(required)]
    pub check_in_date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub check_out_date: Option<DateTime<Utc>>,
    #[validate(required, range(exclusive_min = 0.0))]
    pub total_amount: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    pub check_in_date: Option<DateTime<Utc>>,
    pub check_out_date: Option<DateTime<Utc>>,
    #[validate(range(exclusive_min = 0.0))]
    pub total_amount: Option<f64>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub property_id: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<BookingStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookingQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let filter = BookingFilter {
        property_id: parse_opt_id(query.property_id.as_deref(), "property")?,
        client_id: parse_opt_id(query.client_id.as_deref(), "client")?,
        status: query.status,
    };
    let bookings = state.bookings.find_all(filter).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let id = parse_id(&booking_id, "booking")?;
    Ok(Json(state.bookings.base.find_by_id(id).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let principal = auth.authorize(Entity::Booking, Operation::Create)?;
    let property_id = parse_id(&required(body.property_id, "property_id")?, "property")?;

    let booking = state
        .bookings
        .create(NewBooking {
            property_id,
            client_id: principal.id,
            check_in_date: to_bson_date(required(body.check_in_date, "check_in_date")?),
            check_out_date: to_bson_date(required(body.check_out_date, "check_out_date")?),
            total_amount: required(body.total_amount, "total_amount")?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// The booking's client, the property's owner and admins may change it.
async fn check_access(state: &AppState, principal: &Principal, id: ObjectId) -> Result<(), ApiError> {
    let booking = state.bookings.base.find_by_id(id).await?;
    if principal.owns_or_admin(booking.client_id) {
        return Ok(());
    }
    let owner = property_owner(state, booking.property_id).await?;
    ensure_access(
        owner == Some(principal.id),
        "Only the booking's client or the property owner may change it",
    )
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateBookingRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let principal = auth.authorize(Entity::Booking, Operation::Update)?;
    let id = parse_id(&booking_id, "booking")?;
    check_access(&state, principal, id).await?;

    let booking = state
        .bookings
        .update(
            id,
            BookingPatch {
                check_in_date: body.check_in_date.map(to_bson_date),
                check_out_date: body.check_out_date.map(to_bson_date),
                total_amount: body.total_amount,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(booking.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Booking, Operation::Delete)?;
    let id = parse_id(&booking_id, "booking")?;
    check_access(&state, principal, id).await?;
    state.bookings.delete(id).await?;
    Ok(Json(DeletedResponse::new("Booking")))
}
