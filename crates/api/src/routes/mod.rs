pub mod auth;
pub mod booking;
pub mod lease;
pub mod maintenance;
pub mod message;
pub mod notification;
pub mod property;
pub mod review;
pub mod transaction;
pub mod user;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use dwellhub_services::dao::base::DaoError;
use serde::Serialize;

use crate::{
    error::{ApiError, FieldErrors},
    state::AppState,
};

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::invalid_id(what))
}

pub(crate) fn parse_opt_id(raw: Option<&str>, what: &str) -> Result<Option<ObjectId>, ApiError> {
    raw.map(|raw| parse_id(raw, what)).transpose()
}

/// Unwraps a field the validator already marked as required.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec!["required".to_string()]);
        ApiError::InvalidFields(fields)
    })
}

/// 403 with `message` unless the record-level check passed.
pub(crate) fn ensure_access(allowed: bool, message: &str) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message.to_string()))
    }
}

/// Owner of the property, or `None` once the property is gone.
pub(crate) async fn property_owner(
    state: &AppState,
    property_id: ObjectId,
) -> Result<Option<ObjectId>, ApiError> {
    match state.properties.base.find_by_id(property_id).await {
        Ok(property) => Ok(Some(property.owner_id)),
        Err(DaoError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn to_bson_date(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(dt)
}

pub(crate) fn rfc3339(dt: bson::DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

pub(crate) fn hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

pub(crate) fn hex_ids(ids: &[ObjectId]) -> Vec<String> {
    ids.iter().map(|id| id.to_hex()).collect()
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(entity: &str) -> Self {
        Self {
            message: format!("{entity} deleted successfully"),
            deleted: true,
        }
    }
}
