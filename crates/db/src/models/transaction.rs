use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A single ledger row linking a payer and a receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub payer_id: ObjectId,
    pub receiver_id: ObjectId,
    pub property_id: ObjectId,
    pub amount: f64,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub date: DateTime,
    #[serde(default)]
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Rent,
    Deposit,
    Sale,
    Penalty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    Paypal,
}

impl Transaction {
    pub const COLLECTION: &'static str = "transactions";
}
