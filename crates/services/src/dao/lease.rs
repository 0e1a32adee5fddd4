use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{Lease, LeaseStatus, Property};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoResult, Fields};
use super::booking::ensure_ordered;
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub struct NewLease {
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub rent_amount: f64,
}

#[derive(Debug, Default)]
pub struct LeasePatch {
    pub start_date: Option<DateTime>,
    pub end_date: Option<DateTime>,
    pub rent_amount: Option<f64>,
    pub status: Option<LeaseStatus>,
}

#[derive(Debug, Default)]
pub struct LeaseFilter {
    pub property_id: Option<ObjectId>,
    pub client_id: Option<ObjectId>,
    /// Restricts to leases on properties this user owns.
    pub owner_id: Option<ObjectId>,
    pub status: Option<LeaseStatus>,
}

pub struct LeaseDao {
    pub base: BaseDao<Lease>,
    properties: BaseDao<Property>,
    refs: Arc<ReferenceIndex>,
}

impl LeaseDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, Lease::COLLECTION, "Lease"),
            properties: BaseDao::new(db, Property::COLLECTION, "Property"),
            refs,
        }
    }

    fn parents(lease: &Lease) -> [ParentRef; 2] {
        [
            ParentRef::user(lease.client_id, RefField::LeaseIds),
            ParentRef::property(lease.property_id, RefField::LeaseIds),
        ]
    }

    pub async fn create(&self, input: NewLease) -> DaoResult<Lease> {
        ensure_ordered(input.start_date, input.end_date)?;
        self.refs.require(ParentKind::Property, input.property_id).await?;
        self.refs.require(ParentKind::User, input.client_id).await?;

        let lease = Lease {
            id: None,
            property_id: input.property_id,
            client_id: input.client_id,
            start_date: input.start_date,
            end_date: input.end_date,
            rent_amount: input.rent_amount,
            status: LeaseStatus::Pending,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&lease).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        info!(%id, property_id = %created.property_id, client_id = %created.client_id, "Lease created");
        Ok(created)
    }

    pub async fn find_all(&self, filter: LeaseFilter) -> DaoResult<Vec<Lease>> {
        let mut query = Fields::new();
        query
            .opt("client_id", filter.client_id)?
            .opt("status", filter.status)?;

        match (filter.owner_id, filter.property_id) {
            (Some(owner_id), property_id) => {
                let mut owned: Vec<ObjectId> = self
                    .properties
                    .find_many(doc! { "owner_id": owner_id }, None)
                    .await?
                    .into_iter()
                    .filter_map(|p| p.id)
                    .collect();
                if let Some(property_id) = property_id {
                    owned.retain(|id| *id == property_id);
                }
                query.put("property_id", doc! { "$in": owned });
            }
            (None, property_id) => {
                query.opt("property_id", property_id)?;
            }
        }

        self.base
            .find_many(query.into_document(), Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: LeasePatch) -> DaoResult<Lease> {
        if patch.start_date.is_some() || patch.end_date.is_some() {
            let current = self.base.find_by_id(id).await?;
            ensure_ordered(
                patch.start_date.unwrap_or(current.start_date),
                patch.end_date.unwrap_or(current.end_date),
            )?;
        }

        let mut fields = Fields::new();
        fields
            .opt("start_date", patch.start_date)?
            .opt("end_date", patch.end_date)?
            .opt("rent_amount", patch.rent_amount)?
            .opt("status", patch.status)?;
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<Lease> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        info!(%id, "Lease deleted");
        Ok(removed)
    }
}
