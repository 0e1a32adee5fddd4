use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{Booking, BookingStatus};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult, Fields};
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub struct NewBooking {
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub check_in_date: DateTime,
    pub check_out_date: DateTime,
    pub total_amount: f64,
}

#[derive(Debug, Default)]
pub struct BookingPatch {
    pub check_in_date: Option<DateTime>,
    pub check_out_date: Option<DateTime>,
    pub total_amount: Option<f64>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Default)]
pub struct BookingFilter {
    pub property_id: Option<ObjectId>,
    pub client_id: Option<ObjectId>,
    pub status: Option<BookingStatus>,
}

pub struct BookingDao {
    pub base: BaseDao<Booking>,
    refs: Arc<ReferenceIndex>,
}

impl BookingDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, Booking::COLLECTION, "Booking"),
            refs,
        }
    }

    fn parents(booking: &Booking) -> [ParentRef; 2] {
        [
            ParentRef::user(booking.client_id, RefField::BookingIds),
            ParentRef::property(booking.property_id, RefField::BookingIds),
        ]
    }

    pub async fn create(&self, input: NewBooking) -> DaoResult<Booking> {
        ensure_ordered(input.check_in_date, input.check_out_date)?;
        self.refs.require(ParentKind::Property, input.property_id).await?;
        self.refs.require(ParentKind::User, input.client_id).await?;

        let booking = Booking {
            id: None,
            property_id: input.property_id,
            client_id: input.client_id,
            check_in_date: input.check_in_date,
            check_out_date: input.check_out_date,
            total_amount: input.total_amount,
            status: BookingStatus::Pending,
            booked_at: DateTime::now(),
        };

        let id = self.base.insert_one(&booking).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        info!(%id, property_id = %created.property_id, "Booking created");
        Ok(created)
    }

    pub async fn find_all(&self, filter: BookingFilter) -> DaoResult<Vec<Booking>> {
        let mut query = Fields::new();
        query
            .opt("property_id", filter.property_id)?
            .opt("client_id", filter.client_id)?
            .opt("status", filter.status)?;
        self.base
            .find_many(query.into_document(), Some(doc! { "booked_at": -1 }))
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: BookingPatch) -> DaoResult<Booking> {
        if patch.check_in_date.is_some() || patch.check_out_date.is_some() {
            let current = self.base.find_by_id(id).await?;
            ensure_ordered(
                patch.check_in_date.unwrap_or(current.check_in_date),
                patch.check_out_date.unwrap_or(current.check_out_date),
            )?;
        }

        let mut fields = Fields::new();
        fields
            .opt("check_in_date", patch.check_in_date)?
            .opt("check_out_date", patch.check_out_date)?
            .opt("total_amount", patch.total_amount)?
            .opt("status", patch.status)?;
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<Booking> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        info!(%id, "Booking deleted");
        Ok(removed)
    }
}

/// Fails unless `start` precedes `end`.
pub(crate) fn ensure_ordered(start: DateTime, end: DateTime) -> DaoResult<()> {
    if start < end {
        Ok(())
    } else {
        Err(DaoError::Validation(
            "end date must be after start date".to_string(),
        ))
    }
}
