use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lease {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub rent_amount: f64,
    #[serde(default)]
    pub status: LeaseStatus,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    #[default]
    Pending,
    Active,
    Terminated,
}

impl Lease {
    pub const COLLECTION: &'static str = "leases";
}
