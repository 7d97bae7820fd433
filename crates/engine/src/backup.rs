//! Whole-store backup and restore.
//!
//! A backup is a snapshot of every stored workflow.  Restoring replaces the
//! store content in one `replace_all` call, so the store's own atomicity
//! decides whether a failed restore leaves anything behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use db::{WorkflowRecord, WorkflowStore};

use crate::EngineError;

/// A snapshot of a workflow store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    pub workflows: Vec<WorkflowRecord>,
}

/// Snapshot every workflow in `store`.
#[instrument(skip_all)]
pub async fn export_backup(store: &dyn WorkflowStore) -> Result<Backup, EngineError> {
    let workflows = store.list_all().await?;
    info!("backed up {} workflow(s)", workflows.len());
    Ok(Backup {
        exported_at: Utc::now(),
        workflows,
    })
}

/// Replace the content of `store` with `backup`.
///
/// Returns the number of restored workflows.
#[instrument(skip_all, fields(count = backup.workflows.len()))]
pub async fn import_backup(store: &dyn WorkflowStore, backup: Backup) -> Result<usize, EngineError> {
    let count = backup.workflows.len();
    store.replace_all(backup.workflows).await?;
    info!("restored {count} workflow(s)");
    Ok(count)
}

/// Replace the content of `store` with `initial_state`.
///
/// `initial_state` is a list of workflow records, or a map of id to record,
/// given either as JSON text or as a parsed value.
///
/// # Errors
/// - [`EngineError::MalformedDocument`] if the state cannot be decoded.
/// - [`EngineError::Store`] if the store rejects the replacement.
pub async fn reset_workflows(store: &dyn WorkflowStore, initial_state: &Value) -> Result<usize, EngineError> {
    let parsed;
    let state = match initial_state {
        Value::String(raw) => {
            parsed = serde_json::from_str::<Value>(raw).map_err(EngineError::malformed)?;
            &parsed
        }
        other => other,
    };

    let workflows: Vec<WorkflowRecord> = match state {
        Value::Object(by_id) => by_id
            .iter()
            .map(|(id, record)| {
                let mut record = WorkflowRecord::deserialize(record)?;
                if record.id.is_empty() {
                    record.id = id.clone();
                }
                Ok(record)
            })
            .collect::<Result<_, serde_json::Error>>()
            .map_err(EngineError::malformed)?,
        list => Vec::<WorkflowRecord>::deserialize(list).map_err(EngineError::malformed)?,
    };

    import_backup(
        store,
        Backup {
            exported_at: Utc::now(),
            workflows,
        },
    )
    .await
}
