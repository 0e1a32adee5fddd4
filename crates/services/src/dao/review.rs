use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::Review;
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult, Fields};
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub struct NewReview {
    pub property_id: ObjectId,
    pub client_id: ObjectId,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Default)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Default)]
pub struct ReviewFilter {
    pub property_id: Option<ObjectId>,
    pub client_id: Option<ObjectId>,
}

pub struct ReviewDao {
    pub base: BaseDao<Review>,
    refs: Arc<ReferenceIndex>,
}

impl ReviewDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, Review::COLLECTION, "Review"),
            refs,
        }
    }

    fn parents(review: &Review) -> [ParentRef; 1] {
        [ParentRef::property(review.property_id, RefField::ReviewIds)]
    }

    pub async fn create(&self, input: NewReview) -> DaoResult<Review> {
        ensure_rating(input.rating)?;
        self.refs.require(ParentKind::Property, input.property_id).await?;

        let review = Review {
            id: None,
            property_id: input.property_id,
            client_id: input.client_id,
            rating: input.rating,
            comment: input.comment,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&review).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        info!(%id, property_id = %created.property_id, rating = created.rating, "Review created");
        Ok(created)
    }

    pub async fn find_all(&self, filter: ReviewFilter) -> DaoResult<Vec<Review>> {
        let mut query = Fields::new();
        query
            .opt("property_id", filter.property_id)?
            .opt("client_id", filter.client_id)?;
        self.base
            .find_many(query.into_document(), Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: ReviewPatch) -> DaoResult<Review> {
        if let Some(rating) = patch.rating {
            ensure_rating(rating)?;
        }
        let mut fields = Fields::new();
        fields
            .opt("rating", patch.rating)?
            .opt("comment", patch.comment)?;
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<Review> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        info!(%id, "Review deleted");
        Ok(removed)
    }
}

fn ensure_rating(rating: i32) -> DaoResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(DaoError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}
