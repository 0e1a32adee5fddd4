use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{
    Booking, Conversation, Lease, MaintenanceRequest, Notification, Property, Review,
    Transaction, User,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    create_indexes(
        db,
        User::COLLECTION,
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    create_indexes(
        db,
        Property::COLLECTION,
        vec![
            index(bson::doc! { "owner_id": 1 }),
            index(bson::doc! { "status": 1, "property_type": 1, "category": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Booking::COLLECTION,
        vec![
            index(bson::doc! { "property_id": 1 }),
            index(bson::doc! { "client_id": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Lease::COLLECTION,
        vec![
            index(bson::doc! { "property_id": 1 }),
            index(bson::doc! { "client_id": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        MaintenanceRequest::COLLECTION,
        vec![
            index(bson::doc! { "property_id": 1 }),
            index(bson::doc! { "owner_id": 1, "status": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Notification::COLLECTION,
        vec![index(bson::doc! { "user_id": 1, "status": 1 })],
    )
    .await?;

    create_indexes(
        db,
        Review::COLLECTION,
        vec![index(bson::doc! { "property_id": 1, "created_at": -1 })],
    )
    .await?;

    create_indexes(
        db,
        Transaction::COLLECTION,
        vec![
            index(bson::doc! { "payer_id": 1 }),
            index(bson::doc! { "receiver_id": 1 }),
            index(bson::doc! { "property_id": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Conversation::COLLECTION,
        vec![
            index_unique(bson::doc! { "pair_key": 1 }),
            index(bson::doc! { "participants": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
