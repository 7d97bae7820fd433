//! The persisted workflow record and its table row.
//!
//! `WorkflowRecord` is what the store hands out and accepts.  Fields the
//! store does not know about (folder, trigger cache, `extVersion`, …) are kept
//! verbatim in [`WorkflowRecord::extra`] so nothing is lost on a round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// WorkflowRecord
// ---------------------------------------------------------------------------

/// A stored workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    /// Stable identity; unique within a store.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// Column definitions of the workflow's data table.
    #[serde(default)]
    pub table: Vec<Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub global_data: String,
    #[serde(default)]
    pub description: String,
    /// The node-link graph, either structured or as a serialised string.
    #[serde(default)]
    pub drawflow: Value,
    /// Version of the application that produced this workflow.
    #[serde(default)]
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Protected workflows refuse export.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_protected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowRecord {
    /// An empty record with the given id and name, created now.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            table: Vec::new(),
            settings: Map::new(),
            global_data: String::new(),
            description: String::new(),
            drawflow: Value::Null,
            version: String::new(),
            created_at: Utc::now(),
            is_protected: false,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for the graph, used heavily in tests.
    pub fn with_drawflow(mut self, drawflow: Value) -> Self {
        self.drawflow = drawflow;
        self
    }
}

// ---------------------------------------------------------------------------
// InsertOptions
// ---------------------------------------------------------------------------

/// Options for [`WorkflowStore::insert_record`](crate::WorkflowStore::insert_record).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Keep the record's explicit id instead of generating a fresh one.
    pub duplicate_id: bool,
}

impl InsertOptions {
    /// Insert under the record's own id.
    pub fn keep_id() -> Self {
        Self { duplicate_id: true }
    }
}

// ---------------------------------------------------------------------------
// workflows table
// ---------------------------------------------------------------------------

/// A persisted workflow row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
    pub id: String,
    pub name: String,
    /// The full record, serialised.
    pub definition: Value,
    pub created_at: DateTime<Utc>,
}

impl WorkflowRow {
    pub fn from_record(record: &WorkflowRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            definition: serde_json::to_value(record)?,
            created_at: record.created_at,
        })
    }

    /// Rebuild the record; the row's key columns win over the stored JSON.
    pub fn into_record(self) -> Result<WorkflowRecord, serde_json::Error> {
        let mut record: WorkflowRecord = serde_json::from_value(self.definition)?;
        record.id = self.id;
        record.created_at = self.created_at;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_kept() {
        let record: WorkflowRecord = serde_json::from_value(json!({
            "id": "w1",
            "name": "Scrape",
            "createdAt": 1_700_000_000_000i64,
            "folderId": "f9",
            "dataColumns": [{ "name": "col" }]
        }))
        .unwrap();

        assert_eq!(record.id, "w1");
        assert_eq!(record.created_at.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(record.extra["folderId"], "f9");
        assert!(record.table.is_empty());

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["folderId"], "f9");
        assert_eq!(back["globalData"], "");
        assert!(back.get("isProtected").is_none());
    }

    #[test]
    fn row_round_trip_prefers_key_columns() {
        let record = WorkflowRecord::new("w1", "A").with_drawflow(json!({ "nodes": [] }));
        let mut row = WorkflowRow::from_record(&record).unwrap();
        row.id = "w2".into();

        let back = row.into_record().unwrap();
        assert_eq!(back.id, "w2");
        assert_eq!(back.drawflow, json!({ "nodes": [] }));
        assert_eq!(back.created_at.timestamp_millis(), record.created_at.timestamp_millis());
    }
}
