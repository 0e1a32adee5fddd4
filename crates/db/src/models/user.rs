use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub full_name: String,
    /// Absent for accounts created through Google sign-up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub property_ids: Vec<ObjectId>,
    #[serde(default)]
    pub booking_ids: Vec<ObjectId>,
    #[serde(default)]
    pub lease_ids: Vec<ObjectId>,
    #[serde(default)]
    pub maintenance_request_ids: Vec<ObjectId>,
    #[serde(default)]
    pub notification_ids: Vec<ObjectId>,
    #[serde(default)]
    pub transaction_ids_as_payer: Vec<ObjectId>,
    #[serde(default)]
    pub transaction_ids_as_receiver: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Client,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }
}

impl User {
    pub const COLLECTION: &'static str = "users";
}
