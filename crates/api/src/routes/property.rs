use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use dwellhub_db::models::{LeaseTerm, Property, PropertyStatus, PropertyType};
use dwellhub_services::{
    auth::{Entity, Operation},
    dao::property::{NewProperty, PropertyPatch, PropertySearch},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DeletedResponse, hex, hex_ids, parse_id, parse_opt_id, required, rfc3339};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::{ApiJson, ValidatedJson}, query::ApiQuery},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub images: Vec<String>,
    pub status: PropertyStatus,
    pub property_type: PropertyType,
    pub category: String,
    pub sell_price: Option<f64>,
    pub rent_price: Option<f64>,
    pub lease_term: Option<LeaseTerm>,
    pub room_count: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub year_built: Option<i32>,
    pub living_area_sqft: Option<f64>,
    pub property_tax_rate: Option<f64>,
    pub transaction_ids: Vec<String>,
    pub maintenance_request_ids: Vec<String>,
    pub lease_ids: Vec<String>,
    pub booking_ids: Vec<String>,
    pub review_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Property> for PropertyResponse {
    fn from(p: Property) -> Self {
        Self {
            id: hex(p.id),
            owner_id: p.owner_id.to_hex(),
            name: p.name,
            description: p.description,
            country: p.country,
            state: p.state,
            city: p.city,
            images: p.images,
            status: p.status,
            property_type: p.property_type,
            category: p.category,
            sell_price: p.sell_price,
            rent_price: p.rent_price,
            lease_term: p.lease_term,
            room_count: p.room_count,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            year_built: p.year_built,
            living_area_sqft: p.living_area_sqft,
            property_tax_rate: p.property_tax_rate,
            transaction_ids: hex_ids(&p.transaction_ids),
            maintenance_request_ids: hex_ids(&p.maintenance_request_ids),
            lease_ids: hex_ids(&p.lease_ids),
            booking_ids: hex_ids(&p.booking_ids),
            review_ids: hex_ids(&p.review_ids),
            created_at: rfc3339(p.created_at),
            updated_at: rfc3339(p.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    #[validate(required, length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub images: Vec<String>,
    pub status: Option<PropertyStatus>,
    #[validate(required)]
    pub property_type: Option<PropertyType>,
    #[validate(required, length(min = 2, max = 50))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub sell_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub rent_price: Option<f64>,
    pub lease_term: Option<LeaseTerm>,
    #[validate(range(min = 0, max = 1000))]
    pub room_count: Option<i32>,
    #[validate(range(min = 0, max = 1000))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 1000))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 1000, max = 3000))]
    pub year_built: Option<i32>,
    #[validate(range(min = 0.0))]
    pub living_area_sqft: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub property_tax_rate: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 30))]
    pub images: Option<Vec<String>>,
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
    #[validate(length(min = 2, max = 50))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub sell_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub rent_price: Option<f64>,
    pub lease_term: Option<LeaseTerm>,
    #[validate(range(min = 0, max = 1000))]
    pub room_count: Option<i32>,
    #[validate(range(min = 0, max = 1000))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 1000))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 1000, max = 3000))]
    pub year_built: Option<i32>,
    #[validate(range(min = 0.0))]
    pub living_area_sqft: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub property_tax_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PropertyQuery {
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
    pub category: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PropertyQuery>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    let owner_id = parse_opt_id(query.owner_id.as_deref(), "owner")?;
    let properties = state.properties.find_all(owner_id).await?;
    Ok(Json(properties.into_iter().map(PropertyResponse::from).collect()))
}

pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    let search = PropertySearch {
        country: query.country,
        state: query.state,
        city: query.city,
        status: query.status,
        property_type: query.property_type,
        category: query.category,
    };
    let properties = state.properties.search(&search).await?;
    Ok(Json(properties.into_iter().map(PropertyResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let id = parse_id(&property_id, "property")?;
    let property = state.properties.base.find_by_id(id).await?;
    Ok(Json(property.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
    let principal = auth.authorize(Entity::Property, Operation::Create)?;

    let property = state
        .properties
        .create(NewProperty {
            owner_id: principal.id,
            name: required(body.name, "name")?,
            description: body.description,
            country: required(body.country, "country")?,
            state: required(body.state, "state")?,
            city: required(body.city, "city")?,
            images: body.images,
            status: body.status.unwrap_or_default(),
            property_type: required(body.property_type, "property_type")?,
            category: required(body.category, "category")?,
            sell_price: body.sell_price,
            rent_price: body.rent_price,
            lease_term: body.lease_term,
            room_count: body.room_count,
            bedrooms: body.bedrooms,
            bathrooms: body.bathrooms,
            year_built: body.year_built,
            living_area_sqft: body.living_area_sqft,
            property_tax_rate: body.property_tax_rate,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(property.into())))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(property_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdatePropertyRequest>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let principal = auth.authorize(Entity::Property, Operation::Update)?;
    let id = parse_id(&property_id, "property")?;
    state
        .properties
        .find_owned(id, |owner| principal.owns_or_admin(owner))
        .await?;

    let property = state
        .properties
        .update(
            id,
            PropertyPatch {
                name: body.name,
                description: body.description,
                country: body.country,
                state: body.state,
                city: body.city,
                images: body.images,
                status: body.status,
                property_type: body.property_type,
                category: body.category,
                sell_price: body.sell_price,
                rent_price: body.rent_price,
                lease_term: body.lease_term,
                room_count: body.room_count,
                bedrooms: body.bedrooms,
                bathrooms: body.bathrooms,
                year_built: body.year_built,
                living_area_sqft: body.living_area_sqft,
                property_tax_rate: body.property_tax_rate,
            },
        )
        .await?;

    Ok(Json(property.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(property_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Property, Operation::Delete)?;
    let id = parse_id(&property_id, "property")?;
    state
        .properties
        .find_owned(id, |owner| principal.owns_or_admin(owner))
        .await?;

    state.properties.delete(id).await?;
    Ok(Json(DeletedResponse::new("Property")))
}

/// Forwards the feature object to the price model and relays its answer.
pub async fn predict(
    State(state): State<AppState>,
    ApiJson(features): ApiJson<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !features.is_object() {
        return Err(ApiError::Validation(
            "Prediction input must be a JSON object".to_string(),
        ));
    }
    let verdict = state.prediction.predict(&features).await?;
    Ok(Json(verdict))
}
