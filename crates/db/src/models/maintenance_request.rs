use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub owner_id: ObjectId,
    pub description: String,
    #[serde(default)]
    pub status: MaintenanceStatus,
    pub reported_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

impl MaintenanceRequest {
    pub const COLLECTION: &'static str = "maintenance_requests";
}
