use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use dwellhub_db::models::{PaymentMethod, Transaction, TransactionStatus, TransactionType};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoResult, Fields};
use crate::references::{ParentKind, ParentRef, RefField, ReferenceIndex};

pub struct NewTransaction {
    pub payer_id: ObjectId,
    pub receiver_id: ObjectId,
    pub property_id: ObjectId,
    pub amount: f64,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub date: DateTime,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Default)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub date: Option<DateTime>,
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Default)]
pub struct TransactionFilter {
    pub payer_id: Option<ObjectId>,
    pub receiver_id: Option<ObjectId>,
    pub property_id: Option<ObjectId>,
    pub status: Option<TransactionStatus>,
}

pub struct TransactionDao {
    pub base: BaseDao<Transaction>,
    refs: Arc<ReferenceIndex>,
}

impl TransactionDao {
    pub fn new(db: &Database, refs: Arc<ReferenceIndex>) -> Self {
        Self {
            base: BaseDao::new(db, Transaction::COLLECTION, "Transaction"),
            refs,
        }
    }

    fn parents(tx: &Transaction) -> [ParentRef; 3] {
        [
            ParentRef::user(tx.payer_id, RefField::TransactionIdsAsPayer),
            ParentRef::user(tx.receiver_id, RefField::TransactionIdsAsReceiver),
            ParentRef::property(tx.property_id, RefField::TransactionIds),
        ]
    }

    pub async fn create(&self, input: NewTransaction) -> DaoResult<Transaction> {
        self.refs.require(ParentKind::User, input.payer_id).await?;
        self.refs.require(ParentKind::User, input.receiver_id).await?;
        self.refs.require(ParentKind::Property, input.property_id).await?;

        let tx = Transaction {
            id: None,
            payer_id: input.payer_id,
            receiver_id: input.receiver_id,
            property_id: input.property_id,
            amount: input.amount,
            currency: input.currency.to_uppercase(),
            transaction_type: input.transaction_type,
            date: input.date,
            status: TransactionStatus::Pending,
            payment_method: input.payment_method,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&tx).await?;
        let created = self.base.find_by_id(id).await?;
        self.refs.link(id, &Self::parents(&created)).await;
        info!(
            %id,
            payer_id = %created.payer_id,
            receiver_id = %created.receiver_id,
            amount = created.amount,
            "Transaction recorded"
        );
        Ok(created)
    }

    pub async fn find_all(&self, filter: TransactionFilter) -> DaoResult<Vec<Transaction>> {
        let mut query = Fields::new();
        query
            .opt("payer_id", filter.payer_id)?
            .opt("receiver_id", filter.receiver_id)?
            .opt("property_id", filter.property_id)?
            .opt("status", filter.status)?;
        self.base
            .find_many(query.into_document(), Some(doc! { "date": -1 }))
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: TransactionPatch) -> DaoResult<Transaction> {
        let mut fields = Fields::new();
        fields
            .opt("amount", patch.amount)?
            .opt("currency", patch.currency.map(|c| c.to_uppercase()))?
            .opt("transaction_type", patch.transaction_type)?
            .opt("date", patch.date)?
            .opt("status", patch.status)?
            .opt("payment_method", patch.payment_method)?;
        self.base.set_fields(id, fields.into_document()).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<Transaction> {
        let removed = self.base.delete_by_id(id).await?;
        self.refs.unlink(id, &Self::parents(&removed)).await;
        info!(%id, "Transaction deleted");
        Ok(removed)
    }
}
