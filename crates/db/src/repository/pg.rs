use async_trait::async_trait;
use tracing::{debug, info};

use crate::models::WorkflowRow;
use crate::repository::workflows as wf_repo;
use crate::store::generate_id;
use crate::{DbError, DbPool, InsertOptions, WorkflowRecord, WorkflowStore};

/// A [`WorkflowStore`] over the `workflows` table.
#[derive(Debug, Clone)]
pub struct PgWorkflowStore {
    pool: DbPool,
}

impl PgWorkflowStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<WorkflowRecord>, DbError> {
        match wf_repo::get_workflow(&self.pool, id).await {
            Ok(row) => Ok(Some(row.into_record()?)),
            Err(DbError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn insert_record(
        &self,
        mut record: WorkflowRecord,
        options: InsertOptions,
    ) -> Result<WorkflowRecord, DbError> {
        if !options.duplicate_id {
            record.id = generate_id();
        }

        let row = WorkflowRow::from_record(&record)?;
        let mut conn = self.pool.acquire().await?;
        wf_repo::insert_workflow(&mut conn, &row).await?;

        debug!(id = %record.id, name = %record.name, "workflow inserted");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<WorkflowRecord>, DbError> {
        wf_repo::list_workflows(&self.pool)
            .await?
            .into_iter()
            .map(|row| row.into_record().map_err(DbError::from))
            .collect()
    }

    async fn replace_all(&self, records: Vec<WorkflowRecord>) -> Result<(), DbError> {
        let rows = records
            .iter()
            .map(WorkflowRow::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        let removed = wf_repo::delete_all_workflows(&mut tx).await?;
        for row in &rows {
            wf_repo::insert_workflow(&mut tx, row).await?;
        }
        tx.commit().await?;

        info!(removed, inserted = rows.len(), "workflow table replaced");
        Ok(())
    }
}
