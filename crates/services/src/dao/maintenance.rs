use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{MaintenanceRequest, MaintenanceStatus, Property};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoResult, Fields};
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub struct NewMaintenanceRequest {
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct MaintenancePatch {
    pub description: Option<String>,
    pub status: Option<MaintenanceStatus>,
}

#[derive(Debug, Default)]
pub struct MaintenanceFilter {
    pub property_id: Option<ObjectId>,
    pub client_id: Option<ObjectId>,
    pub owner_id: Option<ObjectId>,
    pub status: Option<MaintenanceStatus>,
}

pub struct MaintenanceDao {
    pub base: BaseDao<MaintenanceRequest>,
    properties: BaseDao<Property>,
    refs: Arc<ReferenceIndex>,
}

impl MaintenanceDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, MaintenanceRequest::COLLECTION, "Maintenance request"),
            properties: BaseDao::new(db, Property::COLLECTION, "Property"),
            refs,
        }
    }

    fn parents(request: &MaintenanceRequest) -> [ParentRef; 2] {
        [
            ParentRef::user(request.client_id, RefField::MaintenanceRequestIds),
            ParentRef::property(request.property_id, RefField::MaintenanceRequestIds),
        ]
    }

    /// The request's `owner_id` is taken from the property, not the caller.
    pub async fn create(&self, input: NewMaintenanceRequest) -> DaoResult<MaintenanceRequest> {
        let property = self.properties.find_by_id(input.property_id).await?;
        self.refs.require(ParentKind::User, input.client_id).await?;

        let request = MaintenanceRequest {
            id: None,
            property_id: input.property_id,
            client_id: input.client_id,
            owner_id: property.owner_id,
            description: input.description,
            status: MaintenanceStatus::Pending,
            reported_at: DateTime::now(),
        };

        let id = self.base.insert_one(&request).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        info!(%id, property_id = %created.property_id, "Maintenance request created");
        Ok(created)
    }

    pub async fn find_all(&self, filter: MaintenanceFilter) -> DaoResult<Vec<MaintenanceRequest>> {
        let mut query = Fields::new();
        query
            .opt("property_id", filter.property_id)?
            .opt("client_id", filter.client_id)?
            .opt("owner_id", filter.owner_id)?
            .opt("status", filter.status)?;
        self.base
            .find_many(query.into_document(), Some(doc! { "reported_at": -1 }))
            .await
    }

    pub async fn update(
        &self,
        id: ObjectId,
        patch: MaintenancePatch,
    ) -> DaoResult<MaintenanceRequest> {
        let mut fields = Fields::new();
        fields
            .opt("description", patch.description)?
            .opt("status", patch.status)?;
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<MaintenanceRequest> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        info!(%id, "Maintenance request deleted");
        Ok(removed)
    }
}
