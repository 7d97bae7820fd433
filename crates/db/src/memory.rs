//! `MemoryStore` — an in-process [`WorkflowStore`].
//!
//! Backs unit tests and one-shot command-line runs where no database is
//! configured.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::generate_id;
use crate::{DbError, InsertOptions, WorkflowRecord, WorkflowStore};

/// Workflows kept in insertion order behind an async lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workflows: RwLock<IndexMap<String, WorkflowRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `records`, keyed by their own ids.
    pub fn with_records(records: impl IntoIterator<Item = WorkflowRecord>) -> Self {
        let workflows = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            workflows: RwLock::new(workflows),
        }
    }

    pub async fn len(&self) -> usize {
        self.workflows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.workflows.read().await.is_empty()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<WorkflowRecord>, DbError> {
        Ok(self.workflows.read().await.get(id).cloned())
    }

    async fn insert_record(
        &self,
        mut record: WorkflowRecord,
        options: InsertOptions,
    ) -> Result<WorkflowRecord, DbError> {
        let mut workflows = self.workflows.write().await;

        if options.duplicate_id {
            if workflows.contains_key(&record.id) {
                return Err(DbError::DuplicateId(record.id));
            }
        } else {
            record.id = generate_id();
        }

        debug!(id = %record.id, name = %record.name, "inserting workflow");
        workflows.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<WorkflowRecord>, DbError> {
        Ok(self.workflows.read().await.values().cloned().collect())
    }

    async fn replace_all(&self, records: Vec<WorkflowRecord>) -> Result<(), DbError> {
        let mut replacement = IndexMap::with_capacity(records.len());
        for record in records {
            if replacement.contains_key(&record.id) {
                return Err(DbError::DuplicateId(record.id));
            }
            replacement.insert(record.id.clone(), record);
        }
        *self.workflows.write().await = replacement;
        Ok(())
    }
}
