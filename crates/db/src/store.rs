//! The `WorkflowStore` trait — the only mutable shared resource the engine
//! touches.

use async_trait::async_trait;

use crate::{DbError, InsertOptions, WorkflowRecord};

/// Persistence operations the import/export engine relies on.
///
/// Each call is atomic on its own; transaction boundaries across several
/// calls are the store's business.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch a workflow by id, `None` when unknown.
    async fn get_by_id(&self, id: &str) -> Result<Option<WorkflowRecord>, DbError>;

    /// Insert a workflow and return it as stored.
    ///
    /// Unless `options.duplicate_id` is set the store assigns a fresh id.
    /// With it set, an id that is already taken fails with
    /// [`DbError::DuplicateId`].
    async fn insert_record(
        &self,
        record: WorkflowRecord,
        options: InsertOptions,
    ) -> Result<WorkflowRecord, DbError>;

    /// Every stored workflow, oldest first.
    async fn list_all(&self) -> Result<Vec<WorkflowRecord>, DbError>;

    /// Atomically replace the whole store content with `records`.
    ///
    /// Two records sharing an id fail with [`DbError::DuplicateId`] and leave
    /// the store untouched.
    async fn replace_all(&self, records: Vec<WorkflowRecord>) -> Result<(), DbError>;
}

/// A fresh workflow id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
