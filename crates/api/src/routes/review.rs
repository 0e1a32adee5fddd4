use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dwellhub_db::models::Review;
use dwellhub_services::{
    auth::{Entity, Operation},
    dao::review::{NewReview, ReviewFilter, ReviewPatch},
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
pub struct ReviewResponse {
    pub id: String,
    pub property_id: String,
    pub client_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: hex(r.id),
            property_id: r.property_id.to_hex(),
            client_id: r.client_id.to_hex(),
            rating: r.rating,
            comment: r.comment,
            created_at: rfc3339(r.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(required)]
    pub property_id: Option<String>,
    #[validate(required, range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub property_id: Option<String>,
    pub client_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let filter = ReviewFilter {
        property_id: parse_opt_id(query.property_id.as_deref(), "property")?,
        client_id: parse_opt_id(query.client_id.as_deref(), "client")?,
    };
    let reviews = state.reviews.find_all(filter).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let id = parse_id(&review_id, "review")?;
    Ok(Json(state.reviews.base.find_by_id(id).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let principal = auth.authorize(Entity::Review, Operation::Create)?;
    let property_id = parse_id(&required(body.property_id, "property_id")?, "property")?;

    let review = state
        .reviews
        .create(NewReview {
            property_id,
            client_id: principal.id,
            rating: required(body.rating, "rating")?,
            comment: body.comment,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(review_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let principal = auth.authorize(Entity::Review, Operation::Update)?;
    let id = parse_id(&review_id, "review")?;
    let existing = state.reviews.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(existing.client_id),
        "Only the author may change this review",
    )?;

    let review = state
        .reviews
        .update(
            id,
            ReviewPatch {
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;

    Ok(Json(review.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(review_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Review, Operation::Delete)?;
    let id = parse_id(&review_id, "review")?;
    let existing = state.reviews.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(existing.client_id),
        "Only the author may delete this review",
    )?;
    state.reviews.delete(id).await?;
    Ok(Json(DeletedResponse::new("Review")))
}
