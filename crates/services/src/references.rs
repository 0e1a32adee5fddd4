//! Bookkeeping of child ids on their parent documents.
//!
//! Users and properties carry denormalised id lists (`booking_ids`,
//! `transaction_ids_as_payer`, ...). Every child service registers and
//! unregisters itself through [`ReferenceIndex`] instead of writing those
//! arrays directly. Additions use `$addToSet`, so a retried registration
//! never produces a duplicate entry, and removals use `$pull`.
//!
//! Registration runs after the child write has committed and is not wrapped
//! in a transaction with it. A failure there is logged and swallowed by
//! [`ReferenceIndex::link`]/[`ReferenceIndex::unlink`]; the periodic
//! [`ReferenceIndex::reconcile`] sweep removes ids whose child no longer
//! exists.

use std::{collections::HashSet, sync::Arc, time::Duration};

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use dwellhub_db::models::{
    Booking, Lease, MaintenanceRequest, Notification, Property, Review, Transaction, User,
};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::Serialize;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, info, warn};

use crate::dao::base::{DaoError, DaoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKind {
    User,
    Property,
}

impl ParentKind {
    pub const ALL: [ParentKind; 2] = [ParentKind::User, ParentKind::Property];

    pub fn collection(&self) -> &'static str {
        match self {
            ParentKind::User => User::COLLECTION,
            ParentKind::Property => Property::COLLECTION,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParentKind::User => "User",
            ParentKind::Property => "Property",
        }
    }

    /// The id-list fields a document of this kind carries.
    pub fn fields(&self) -> &'static [RefField] {
        match self {
            ParentKind::User => &[
                RefField::PropertyIds,
                RefField::BookingIds,
                RefField::LeaseIds,
                RefField::MaintenanceRequestIds,
                RefField::NotificationIds,
                RefField::TransactionIdsAsPayer,
                RefField::TransactionIdsAsReceiver,
            ],
            ParentKind::Property => &[
                RefField::TransactionIds,
                RefField::MaintenanceRequestIds,
                RefField::LeaseIds,
                RefField::BookingIds,
                RefField::ReviewIds,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefField {
    PropertyIds,
    BookingIds,
    LeaseIds,
    MaintenanceRequestIds,
    NotificationIds,
    ReviewIds,
    TransactionIds,
    TransactionIdsAsPayer,
    TransactionIdsAsReceiver,
}

impl RefField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefField::PropertyIds => "property_ids",
            RefField::BookingIds => "booking_ids",
            RefField::LeaseIds => "lease_ids",
            RefField::MaintenanceRequestIds => "maintenance_request_ids",
            RefField::NotificationIds => "notification_ids",
            RefField::ReviewIds => "review_ids",
            RefField::TransactionIds => "transaction_ids",
            RefField::TransactionIdsAsPayer => "transaction_ids_as_payer",
            RefField::TransactionIdsAsReceiver => "transaction_ids_as_receiver",
        }
    }

    /// Collection holding the documents whose ids live in this field.
    pub fn child_collection(&self) -> &'static str {
        match self {
            RefField::PropertyIds => Property::COLLECTION,
            RefField::BookingIds => Booking::COLLECTION,
            RefField::LeaseIds => Lease::COLLECTION,
            RefField::MaintenanceRequestIds => MaintenanceRequest::COLLECTION,
            RefField::NotificationIds => Notification::COLLECTION,
            RefField::ReviewIds => Review::COLLECTION,
            RefField::TransactionIds
            | RefField::TransactionIdsAsPayer
            | RefField::TransactionIdsAsReceiver => Transaction::COLLECTION,
        }
    }

    pub fn belongs_to(&self, kind: ParentKind) -> bool {
        kind.fields().contains(self)
    }
}

/// One parent-side slot a child id is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub kind: ParentKind,
    pub id: ObjectId,
    pub field: RefField,
}

impl ParentRef {
    pub fn user(id: ObjectId, field: RefField) -> Self {
        Self {
            kind: ParentKind::User,
            id,
            field,
        }
    }

    pub fn property(id: ObjectId, field: RefField) -> Self {
        Self {
            kind: ParentKind::Property,
            id,
            field,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub parents_scanned: u64,
    pub dangling_removed: u64,
}

pub struct ReferenceIndex {
    db: Database,
}

impl ReferenceIndex {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn parents(&self, kind: ParentKind) -> Collection<Document> {
        self.db.collection::<Document>(kind.collection())
    }

    /// Adds `child_id` to `field` on the parent. Returns `false` when the
    /// parent does not exist, which is not an error.
    pub async fn add(
        &self,
        kind: ParentKind,
        parent_id: ObjectId,
        field: RefField,
        child_id: ObjectId,
    ) -> DaoResult<bool> {
        ensure_field(kind, field)?;

        let mut entry = Document::new();
        entry.insert(field.as_str(), child_id);

        let result = self
            .parents(kind)
            .update_one(
                doc! { "_id": parent_id },
                doc! { "$addToSet": entry, "$set": { "updated_at": DateTime::now() } },
            )
            .await?;

        if result.matched_count == 0 {
            debug!(parent = kind.label(), %parent_id, field = field.as_str(), "Parent missing, reference not added");
            return Ok(false);
        }
        Ok(true)
    }

    /// Removes every occurrence of `child_id` from `field` on the parent.
    pub async fn remove(
        &self,
        kind: ParentKind,
        parent_id: ObjectId,
        field: RefField,
        child_id: ObjectId,
    ) -> DaoResult<bool> {
        ensure_field(kind, field)?;

        let mut entry = Document::new();
        entry.insert(field.as_str(), child_id);

        let result = self
            .parents(kind)
            .update_one(
                doc! { "_id": parent_id },
                doc! { "$pull": entry, "$set": { "updated_at": DateTime::now() } },
            )
            .await?;

        if result.matched_count == 0 {
            debug!(parent = kind.label(), %parent_id, field = field.as_str(), "Parent missing, nothing to remove");
            return Ok(false);
        }
        Ok(true)
    }

    /// Registers `child_id` on every parent. Failures are logged, never
    /// propagated: the child write has already committed.
    pub async fn link(&self, child_id: ObjectId, parents: &[ParentRef]) {
        for parent in parents {
            if let Err(e) = self.add(parent.kind, parent.id, parent.field, child_id).await {
                warn!(
                    %child_id,
                    parent = parent.kind.label(),
                    parent_id = %parent.id,
                    field = parent.field.as_str(),
                    error = %e,
                    "Failed to register reference"
                );
            }
        }
    }

    pub async fn unlink(&self, child_id: ObjectId, parents: &[ParentRef]) {
        for parent in parents {
            if let Err(e) = self.remove(parent.kind, parent.id, parent.field, child_id).await {
                warn!(
                    %child_id,
                    parent = parent.kind.label(),
                    parent_id = %parent.id,
                    field = parent.field.as_str(),
                    error = %e,
                    "Failed to remove reference"
                );
            }
        }
    }

    pub async fn exists(&self, kind: ParentKind, id: ObjectId) -> DaoResult<bool> {
        let count = self
            .parents(kind)
            .count_documents(doc! { "_id": id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    pub async fn require(&self, kind: ParentKind, id: ObjectId) -> DaoResult<()> {
        if self.exists(kind, id).await? {
            Ok(())
        } else {
            Err(DaoError::NotFound(kind.label()))
        }
    }

    /// Pulls every id whose child document no longer exists from every
    /// parent list.
    pub async fn reconcile(&self) -> DaoResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for kind in ParentKind::ALL {
            for field in kind.fields() {
                let mut non_empty = Document::new();
                non_empty.insert(format!("{}.0", field.as_str()), doc! { "$exists": true });
                let mut projection = Document::new();
                projection.insert(field.as_str(), 1);

                let mut cursor = self
                    .parents(kind)
                    .find(non_empty)
                    .projection(projection)
                    .await?;

                while let Some(parent) = cursor.try_next().await? {
                    report.parents_scanned += 1;
                    let Ok(parent_id) = parent.get_object_id("_id") else {
                        continue;
                    };
                    let ids: Vec<ObjectId> = parent
                        .get_array(field.as_str())
                        .map(|items| items.iter().filter_map(Bson::as_object_id).collect())
                        .unwrap_or_default();

                    let live = self.existing_children(*field, &ids).await?;
                    let dangling: Vec<ObjectId> =
                        ids.into_iter().filter(|id| !live.contains(id)).collect();
                    if dangling.is_empty() {
                        continue;
                    }

                    let mut pull = Document::new();
                    pull.insert(field.as_str(), dangling.clone());
                    self.parents(kind)
                        .update_one(doc! { "_id": parent_id }, doc! { "$pullAll": pull })
                        .await?;

                    info!(
                        parent = kind.label(),
                        %parent_id,
                        field = field.as_str(),
                        removed = dangling.len(),
                        "Removed dangling references"
                    );
                    report.dangling_removed += dangling.len() as u64;
                }
            }
        }

        Ok(report)
    }

    async fn existing_children(
        &self,
        field: RefField,
        ids: &[ObjectId],
    ) -> DaoResult<HashSet<ObjectId>> {
        let mut cursor = self
            .db
            .collection::<Document>(field.child_collection())
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .projection(doc! { "_id": 1 })
            .await?;

        let mut live = HashSet::new();
        while let Some(child) = cursor.try_next().await? {
            if let Ok(id) = child.get_object_id("_id") {
                live.insert(id);
            }
        }
        Ok(live)
    }

    /// Schedules [`Self::reconcile`] to run every `every`. The returned
    /// scheduler must be kept alive by the caller.
    pub async fn spawn_reconciler(
        self: Arc<Self>,
        every: Duration,
    ) -> Result<JobScheduler, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;
        let index = Arc::clone(&self);

        let job = Job::new_repeated_async(every, move |_job_id, _scheduler| {
            let index = Arc::clone(&index);
            Box::pin(async move {
                match index.reconcile().await {
                    Ok(report) => {
                        info!(
                            parents_scanned = report.parents_scanned,
                            dangling_removed = report.dangling_removed,
                            "Reference reconciliation finished"
                        );
                    }
                    Err(e) => warn!(error = %e, "Reference reconciliation failed"),
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        info!(every_secs = every.as_secs(), "Reference reconciler scheduled");
        Ok(scheduler)
    }
}

fn ensure_field(kind: ParentKind, field: RefField) -> DaoResult<()> {
    if field.belongs_to(kind) {
        Ok(())
    } else {
        Err(DaoError::Validation(format!(
            "{} has no {} list",
            kind.label(),
            field.as_str()
        )))
    }
}
