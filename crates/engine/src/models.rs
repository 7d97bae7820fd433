//! Engine-side domain models: normalized graph nodes and the portable
//! document a workflow is exported to.
//!
//! The persisted [`WorkflowRecord`] lives in the `db` crate; these types
//! describe what flows between the store and the outside world.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use db::WorkflowRecord;
use nodes::NodeKind;

// ---------------------------------------------------------------------------
// NodeDescriptor
// ---------------------------------------------------------------------------

/// One node of a workflow graph, independent of the graph's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Node id within its graph.
    pub id: String,
    /// The node's type, taken from its `label` (current) or `name` (legacy).
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Node-type specific payload.
    pub data: Value,
}

impl NodeDescriptor {
    /// Id of the workflow a sub-workflow node points at, if any.
    pub fn referenced_workflow(&self) -> Option<&str> {
        if !self.kind.is_sub_workflow() {
            return None;
        }
        self.data
            .get("workflowId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

// ---------------------------------------------------------------------------
// PortableDocument
// ---------------------------------------------------------------------------

/// Workflows embedded in an export, keyed by their original id.
pub type IncludedWorkflows = IndexMap<String, PortableDocument>;

/// The self-contained JSON export format (`*.automa.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Value>>,
    /// Legacy name of `table`, only ever read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_columns: Option<Vec<Value>>,
    #[serde(default)]
    pub version: String,
    /// Structured graph, or the graph serialised as a string.
    #[serde(default)]
    pub drawflow: Value,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub global_data: String,
    #[serde(default)]
    pub description: String,
    /// Version of the application that wrote this document.
    #[serde(default)]
    pub ext_version: String,
    /// The flattened closure of sub-workflows; only set on the root document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included_workflows: Option<IncludedWorkflows>,
    /// Extra fields requested at export time, passed through on import.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// NewWorkflow
// ---------------------------------------------------------------------------

/// Record fields decoded from a document, ready to be stored once an id and
/// creation time are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkflow {
    pub name: String,
    pub icon: String,
    pub table: Vec<Value>,
    pub settings: Map<String, Value>,
    pub global_data: String,
    pub description: String,
    /// Always structured.
    pub drawflow: Value,
    pub version: String,
    /// `extVersion` and any extra document fields.
    pub extra: Map<String, Value>,
}

impl NewWorkflow {
    /// Turn the decoded fields into a storable record.
    pub fn into_record(self, id: impl Into<String>, created_at: DateTime<Utc>) -> WorkflowRecord {
        let mut record = WorkflowRecord::new(id, self.name);
        record.icon = self.icon;
        record.table = self.table;
        record.settings = self.settings;
        record.global_data = self.global_data;
        record.description = self.description;
        record.drawflow = self.drawflow;
        record.version = self.version;
        record.created_at = created_at;
        record.is_protected = self
            .extra
            .get("isProtected")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        record.extra = self.extra;
        // Identity and timestamps belong to the store, not to the document.
        for key in ["id", "createdAt", "isProtected"] {
            record.extra.shift_remove(key);
        }
        record
    }
}
