use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub country: String,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
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
    #[serde(default)]
    pub transaction_ids: Vec<ObjectId>,
    #[serde(default)]
    pub maintenance_request_ids: Vec<ObjectId>,
    #[serde(default)]
    pub lease_ids: Vec<ObjectId>,
    #[serde(default)]
    pub booking_ids: Vec<ObjectId>,
    #[serde(default)]
    pub review_ids: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Available,
    Rented,
    Sold,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    RealEstate,
    RentedRealEstate,
    Hotel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LeaseTerm {
    ShortTerm,
    LongTerm,
}

impl Property {
    pub const COLLECTION: &'static str = "properties";
}
