use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{Role, User};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult, Fields};

pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    pub is_verified: bool,
}

/// Profile changes. Id lists are deliberately absent.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: Option<String>,
    /// `Some(None)` clears the avatar.
    pub avatar: Option<Option<String>>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION, "User"),
        }
    }

    pub async fn create(&self, input: NewUser) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            email: input.email.trim().to_lowercase(),
            full_name: input.full_name,
            password_hash: input.password_hash,
            google_id: input.google_id,
            avatar: input.avatar,
            phone_number: input.phone_number,
            role: input.role,
            is_verified: input.is_verified,
            property_ids: Vec::new(),
            booking_ids: Vec::new(),
            lease_ids: Vec::new(),
            maintenance_request_ids: Vec::new(),
            notification_ids: Vec::new(),
            transaction_ids_as_payer: Vec::new(),
            transaction_ids_as_receiver: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email.trim().to_lowercase() })
            .await?
            .ok_or(DaoError::NotFound("User"))
    }

    pub async fn email_taken(&self, email: &str) -> DaoResult<bool> {
        Ok(self
            .base
            .count(doc! { "email": email.trim().to_lowercase() })
            .await?
            > 0)
    }

    pub async fn find_all(&self, role: Option<Role>) -> DaoResult<Vec<User>> {
        let mut filter = Fields::new();
        filter.opt("role", role)?;
        self.base
            .find_many(filter.into_document(), Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: UserPatch) -> DaoResult<User> {
        let mut fields = Fields::new();
        fields
            .opt("full_name", patch.full_name)?
            .opt("phone_number", patch.phone_number)?
            .opt("password_hash", patch.password_hash)?
            .opt("avatar", patch.avatar)?
            .opt("role", patch.role)?
            .opt("is_verified", patch.is_verified)?;

        if fields.is_empty() {
            return self.base.find_by_id(id).await;
        }
        fields.put("updated_at", DateTime::now());
        self.base.set_fields(id, fields.into_document()).await
    }
}
