use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{ChatMessage, Conversation, User};
use mongodb::{Database, options::ReturnDocument};
use tracing::debug;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ConversationDao {
    pub base: BaseDao<Conversation>,
    users: BaseDao<User>,
}

impl ConversationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Conversation::COLLECTION, "Conversation"),
            users: BaseDao::new(db, User::COLLECTION, "User"),
        }
    }

    /// Appends a message to the conversation between the two users,
    /// opening it on first contact.
    pub async fn send(
        &self,
        sender_id: ObjectId,
        receiver_id: ObjectId,
        content: String,
    ) -> DaoResult<(ObjectId, ChatMessage)> {
        if sender_id == receiver_id {
            return Err(DaoError::Validation(
                "cannot send a message to yourself".to_string(),
            ));
        }
        self.users.find_by_id(receiver_id).await?;

        let message = ChatMessage {
            sender_id,
            content,
            created_at: DateTime::now(),
        };

        let participants = participant_pair(sender_id, receiver_id);
        // The server retries an upsert that loses the race on the unique key.
        let conversation = self
            .base
            .collection()
            .find_one_and_update(
                doc! { "pair_key": pair_key(&participants) },
                doc! {
                    "$push": { "messages": bson::to_bson(&message)? },
                    "$setOnInsert": {
                        "participants": participants.clone(),
                        "created_at": message.created_at,
                    },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(DaoError::NotFound("Conversation"))?;

        let id = conversation
            .id
            .ok_or_else(|| DaoError::Validation("conversation has no id".to_string()))?;
        debug!(conversation_id = %id, %sender_id, %receiver_id, "Message sent");
        Ok((id, message))
    }

    /// Messages of a conversation the caller takes part in.
    pub async fn messages(
        &self,
        conversation_id: ObjectId,
        reader_id: ObjectId,
        is_admin: bool,
    ) -> DaoResult<Vec<ChatMessage>> {
        let conversation = self.base.find_by_id(conversation_id).await?;
        if !is_admin && !conversation.participants.contains(&reader_id) {
            return Err(DaoError::Forbidden(
                "Not a participant of this conversation".to_string(),
            ));
        }
        Ok(conversation.messages)
    }
}

/// Canonical ordering so both directions address the same document.
fn participant_pair(a: ObjectId, b: ObjectId) -> Vec<ObjectId> {
    if a.bytes() <= b.bytes() { vec![a, b] } else { vec![b, a] }
}

fn pair_key(participants: &[ObjectId]) -> String {
    participants
        .iter()
        .map(|id| id.to_hex())
        .collect::<Vec<_>>()
        .join(":")
}
