use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database, options::ReturnDocument};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation: {0}")]
    Validation(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

/// Builds a document from optional values, skipping the ones that are
/// `None`. Used both for `$set` patches and for equality filters.
#[derive(Debug, Default)]
pub struct Fields(Document);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opt<V: Serialize>(&mut self, key: &str, value: Option<V>) -> DaoResult<&mut Self> {
        if let Some(value) = value {
            self.0.insert(key, bson::to_bson(&value)?);
        }
        Ok(self)
    }

    pub fn put(&mut self, key: &str, value: impl Into<bson::Bson>) -> &mut Self {
        self.0.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

/// Typed access to one collection. `entity` is the human label used in
/// not-found errors.
pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
    entity: &'static str,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str, entity: &'static str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
            entity,
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound(self.entity))
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(&self, filter: Document, sort: Option<Document>) -> DaoResult<Vec<T>> {
        let mut cursor = match sort {
            Some(sort) => self.collection.find(filter).sort(sort).await?,
            None => self.collection.find(filter).await?,
        };

        let mut results = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self.collection.insert_one(doc).await.map_err(|e| {
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref write_error,
            )) = *e.kind
            {
                if write_error.code == 11000 {
                    return DaoError::DuplicateKey(write_error.message.clone());
                }
            }
            DaoError::Mongo(e)
        })?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            DaoError::Validation("inserted document has no ObjectId".to_string())
        })?;
        debug!(entity = self.entity, %id, "Inserted document");
        Ok(id)
    }

    /// Applies `$set: fields` and returns the document as stored afterwards.
    /// An empty `fields` leaves the document untouched.
    pub async fn set_fields(&self, id: ObjectId, fields: Document) -> DaoResult<T> {
        if fields.is_empty() {
            return self.find_by_id(id).await;
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(DaoError::NotFound(self.entity))
    }

    /// Removes the document and hands back what was stored, so callers can
    /// clean up the references it held.
    pub async fn delete_by_id(&self, id: ObjectId) -> DaoResult<T> {
        let removed = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound(self.entity))?;
        debug!(entity = self.entity, %id, "Deleted document");
        Ok(removed)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}
