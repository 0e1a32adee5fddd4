use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime, Document};
use dwellhub_db::models::{LeaseTerm, Property, PropertyStatus, PropertyType};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult, Fields};
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub struct NewProperty {
    pub owner_id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub images: Vec<String>,
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
}

#[derive(Debug, Default)]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
    pub category: Option<String>,
    pub sell_price: Option<f64>,
    pub rent_price: Option<f64>,
    pub lease_term: Option<LeaseTerm>,
    pub room_count: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub year_built: Option<i32>,
    pub living_area_sqft: Option<f64>,
    pub property_tax_rate: Option<f64>,
}

/// Conjunctive search: location parts match as case-insensitive
/// substrings, the rest exactly.
#[derive(Debug, Default, Clone)]
pub struct PropertySearch {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
    pub category: Option<String>,
}

impl PropertySearch {
    pub fn to_filter(&self) -> DaoResult<Document> {
        let mut filter = Fields::new();
        for (key, value) in [
            ("country", &self.country),
            ("state", &self.state),
            ("city", &self.city),
        ] {
            if let Some(term) = value.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                filter.put(
                    key,
                    doc! { "$regex": escape_regex(term), "$options": "i" },
                );
            }
        }
        filter
            .opt("status", self.status)?
            .opt("property_type", self.property_type)?
            .opt("category", self.category.as_deref())?;
        Ok(filter.into_document())
    }
}

/// Escapes regex metacharacters so user input is matched literally.
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct PropertyDao {
    pub base: BaseDao<Property>,
    refs: Arc<ReferenceIndex>,
}

impl PropertyDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, Property::COLLECTION, "Property"),
            refs,
        }
    }

    fn parents(property: &Property) -> [ParentRef; 1] {
        [ParentRef::user(property.owner_id, RefField::PropertyIds)]
    }

    pub async fn create(&self, input: NewProperty) -> DaoResult<Property> {
        self.refs
            .require(ParentKind::User, input.owner_id)
            .await?;

        let now = DateTime::now();
        let property = Property {
            id: None,
            owner_id: input.owner_id,
            name: input.name,
            description: input.description,
            country: input.country,
            state: input.state,
            city: input.city,
            images: input.images,
            status: input.status,
            property_type: input.property_type,
            category: input.category,
            sell_price: input.sell_price,
            rent_price: input.rent_price,
            lease_term: input.lease_term,
            room_count: input.room_count,
            bedrooms: input.bedrooms,
            bathrooms: input.bathrooms,
            year_built: input.year_built,
            living_area_sqft: input.living_area_sqft,
            property_tax_rate: input.property_tax_rate,
            transaction_ids: Vec::new(),
            maintenance_request_ids: Vec::new(),
            lease_ids: Vec::new(),
            booking_ids: Vec::new(),
            review_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&property).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        info!(%id, owner_id = %created.owner_id, "Property created");
        Ok(created)
    }

    pub async fn find_all(&self, owner_id: Option<ObjectId>) -> DaoResult<Vec<Property>> {
        let mut filter = Fields::new();
        filter.opt("owner_id", owner_id)?;
        self.base
            .find_many(filter.into_document(), Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn search(&self, query: &PropertySearch) -> DaoResult<Vec<Property>> {
        self.base
            .find_many(query.to_filter()?, Some(doc! { "created_at": -1 }))
            .await
    }

    /// Loads the property and fails with `Forbidden` unless `allowed` accepts
    /// its owner.
    pub async fn find_owned(
        &self,
        id: ObjectId,
        allowed: impl FnOnce(ObjectId) -> bool,
    ) -> DaoResult<Property> {
        let property = self.base.find_by_id(id).await?;
        if !allowed(property.owner_id) {
            return Err(DaoError::Forbidden(
                "You do not own this property".to_string(),
            ));
        }
        Ok(property)
    }

    pub async fn update(&self, id: ObjectId, patch: PropertyPatch) -> DaoResult<Property> {
        let mut fields = Fields::new();
        fields
            .opt("name", patch.name)?
            .opt("description", patch.description)?
            .opt("country", patch.country)?
            .opt("state", patch.state)?
            .opt("city", patch.city)?
            .opt("images", patch.images)?
            .opt("status", patch.status)?
            .opt("property_type", patch.property_type)?
            .opt("category", patch.category)?
            .opt("sell_price", patch.sell_price)?
            .opt("rent_price", patch.rent_price)?
            .opt("lease_term", patch.lease_term)?
            .opt("room_count", patch.room_count)?
            .opt("bedrooms", patch.bedrooms)?
            .opt("bathrooms", patch.bathrooms)?
            .opt("year_built", patch.year_built)?
            .opt("living_area_sqft", patch.living_area_sqft)?
            .opt("property_tax_rate", patch.property_tax_rate)?;

        if fields.is_empty() {
            return self.base.find_by_id(id).await;
        }
        fields.put("updated_at", DateTime::now());
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<Property> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        info!(%id, "Property deleted");
        Ok(removed)
    }
}
