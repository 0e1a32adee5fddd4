use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub participants: Vec<ObjectId>,
    /// Both participant ids in canonical order, joined by `:`. Unique.
    pub pair_key: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: ObjectId,
    pub content: String,
    pub created_at: DateTime,
}

impl Conversation {
    pub const COLLECTION: &'static str = "conversations";
}
