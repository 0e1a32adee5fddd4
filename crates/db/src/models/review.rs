use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    /// Always within 1..=5.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime,
}

impl Review {
    pub const COLLECTION: &'static str = "reviews";
}
