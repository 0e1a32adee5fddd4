use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use dwellhub_db::models::{PaymentMethod, Transaction, TransactionStatus, TransactionType};
use dwellhub_services::{
    auth::{Entity, Operation, Principal},
    dao::transaction::{NewTransaction, TransactionFilter, TransactionPatch},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    DeletedResponse, ensure_access, hex, parse_id, parse_opt_id, required, rfc3339, to_bson_date,
};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidatedJson, query::ApiQuery},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub payer_id: String,
    pub receiver_id: String,
    pub property_id: String,
    pub amount: f64,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub date: String,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: hex(t.id),
            payer_id: t.payer_id.to_hex(),
            receiver_id: t.receiver_id.to_hex(),
            property_id: t.property_id.to_hex(),
            amount: t.amount,
            currency: t.currency,
            transaction_type: t.transaction_type,
            date: rfc3339(t.date),
            status: t.status,
            payment_method: t.payment_method,
            created_at: rfc3339(t.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    #[validate(required)]
    pub receiver_id: Option<String>,
    #[validate(required)]
    pub property_id: Option<String>,
    #[validate(required, range(exclusive_min = 0.0))]
    pub amount: Option<f64>,
    #[validate(required, length(equal = 3))]
    pub currency: Option<String>,
    #[validate(required)]
    pub transaction_type: Option<TransactionType>,
    /// Value date; now when omitted.
    pub date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTransactionRequest {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: Option<f64>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub payer_id: Option<String>,
    pub receiver_id: Option<String>,
    pub property_id: Option<String>,
    pub status: Option<TransactionStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let filter = TransactionFilter {
        payer_id: parse_opt_id(query.payer_id.as_deref(), "payer")?,
        receiver_id: parse_opt_id(query.receiver_id.as_deref(), "receiver")?,
        property_id: parse_opt_id(query.property_id.as_deref(), "property")?,
        status: query.status,
    };
    let transactions = state.transactions.find_all(filter).await?;
    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let id = parse_id(&transaction_id, "transaction")?;
    Ok(Json(state.transactions.base.find_by_id(id).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let principal = auth.authorize(Entity::Transaction, Operation::Create)?;
    let receiver_id = parse_id(&required(body.receiver_id, "receiver_id")?, "receiver")?;
    let property_id = parse_id(&required(body.property_id, "property_id")?, "property")?;

    let transaction = state
        .transactions
        .create(NewTransaction {
            payer_id: principal.id,
            receiver_id,
            property_id,
            amount: required(body.amount, "amount")?,
            currency: required(body.currency, "currency")?,
            transaction_type: required(body.transaction_type, "transaction_type")?,
            date: to_bson_date(body.date.unwrap_or_else(Utc::now)),
            payment_method: required(body.payment_method, "payment_method")?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// Payer, receiver and admins only.
async fn check_party(state: &AppState, principal: &Principal, id: ObjectId) -> Result<(), ApiError> {
    let transaction = state.transactions.base.find_by_id(id).await?;
    ensure_access(
        principal.owns_or_admin(transaction.payer_id) || principal.id == transaction.receiver_id,
        "Only the payer or receiver may change this transaction",
    )
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let principal = auth.authorize(Entity::Transaction, Operation::Update)?;
    let id = parse_id(&transaction_id, "transaction")?;
    check_party(&state, principal, id).await?;

    let transaction = state
        .transactions
        .update(
            id,
            TransactionPatch {
                amount: body.amount,
                currency: body.currency,
                transaction_type: body.transaction_type,
                date: body.date.map(to_bson_date),
                status: body.status,
                payment_method: body.payment_method,
            },
        )
        .await?;

    Ok(Json(transaction.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = auth.authorize(Entity::Transaction, Operation::Delete)?;
    let id = parse_id(&transaction_id, "transaction")?;
    check_party(&state, principal, id).await?;
    state.transactions.delete(id).await?;
    Ok(Json(DeletedResponse::new("Transaction")))
}
