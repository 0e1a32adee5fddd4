use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub check_in_date: DateTime,
    pub check_out_date: DateTime,
    pub total_amount: f64,
    #[serde(default)]
    pub status: BookingStatus,
    pub booked_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Canceled,
}

impl Booking {
    pub const COLLECTION: &'static str = "bookings";
}
