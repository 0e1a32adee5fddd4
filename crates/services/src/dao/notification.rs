use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{Notification, NotificationStatus, NotificationType};
use mongodb::Database;
use tracing::debug;

use super::base::{BaseDao, DaoResult, Fields};
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub struct NewNotification {
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    pub notification_type: NotificationType,
}

#[derive(Debug, Default)]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notification_type: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
}

#[derive(Debug, Default)]
pub struct NotificationFilter {
    pub user_id: Option<ObjectId>,
    pub status: Option<NotificationStatus>,
}

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
    refs: Arc<ReferenceIndex>,
}

impl NotificationDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION, "Notification"),
            refs,
        }
    }

    fn parents(notification: &Notification) -> [ParentRef; 1] {
        [ParentRef::user(notification.user_id, RefField::NotificationIds)]
    }

    pub async fn create(&self, input: NewNotification) -> DaoResult<Notification> {
        self.refs.require(ParentKind::User, input.user_id).await?;

        let notification = Notification {
            id: None,
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            notification_type: input.notification_type,
            status: NotificationStatus::Unread,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&notification).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        debug!(%id, user_id = %created.user_id, "Notification created");
        Ok(created)
    }

    pub async fn find_all(&self, filter: NotificationFilter) -> DaoResult<Vec<Notification>> {
        let mut query = Fields::new();
        query
            .opt("user_id", filter.user_id)?
            .opt("status", filter.status)?;
        self.base
            .find_many(query.into_document(), Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: NotificationPatch) -> DaoResult<Notification> {
        let mut fields = Fields::new();
        fields
            .opt("title", patch.title)?
            .opt("description", patch.description)?
            .opt("notification_type", patch.notification_type)?
            .opt("status", patch.status)?;
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<Notification> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        debug!(%id, "Notification deleted");
        Ok(removed)
    }
}
