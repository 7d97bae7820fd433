//! Workflow document conversion — stored record ⇄ portable document.
//!
//! Export copies a fixed list of fields (plus any the caller asks for),
//! filling gaps from a default table, and stamps the exporter's version.
//! Import applies the backward-compatibility rules in reverse: `dataColumns`
//! becomes `table`, and a serialised graph is parsed.

use serde_json::{Map, Value};
use tracing::debug;

use db::WorkflowRecord;

use crate::graph::empty_graph;
use crate::models::{NewWorkflow, PortableDocument};

/// Converts between [`WorkflowRecord`] and [`PortableDocument`].
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    ext_version: String,
}

impl DocumentConverter {
    /// `ext_version` is stamped into every exported document.
    pub fn new(ext_version: impl Into<String>) -> Self {
        Self {
            ext_version: ext_version.into(),
        }
    }

    pub fn ext_version(&self) -> &str {
        &self.ext_version
    }

    /// Default for a field missing from the record, `None` when the field
    /// has no default and is left out of the document.
    fn default_value(&self, key: &str) -> Option<Value> {
        let value = match key {
            "name" | "icon" | "globalData" | "description" => Value::String(String::new()),
            "table" | "dataColumns" => Value::Array(Vec::new()),
            "settings" => Value::Object(Map::new()),
            "drawflow" => empty_graph(),
            "version" => Value::String(self.ext_version.clone()),
            _ => return None,
        };
        Some(value)
    }

    /// Build the portable document for `record`.
    ///
    /// Returns `None` for a missing record: exporting nothing is not an
    /// error.  `extra_fields` names additional record fields to carry over;
    /// missing ones fall back to the default table or are omitted.
    pub fn to_document(
        &self,
        record: Option<&WorkflowRecord>,
        extra_fields: &[&str],
    ) -> Option<PortableDocument> {
        let record = record?;

        let version = if record.version.is_empty() {
            self.ext_version.clone()
        } else {
            record.version.clone()
        };
        let drawflow = match &record.drawflow {
            Value::Null => empty_graph(),
            drawflow => drawflow.clone(),
        };

        let mut extra = Map::new();
        for &key in extra_fields {
            if DOCUMENT_FIELDS.contains(&key) {
                continue;
            }
            let value = record_field(record, key)
                .filter(|v| !v.is_null())
                .or_else(|| self.default_value(key));
            if let Some(value) = value {
                extra.insert(key.to_owned(), value);
            }
        }

        let mut document = PortableDocument {
            name: record.name.clone(),
            icon: record.icon.clone(),
            table: Some(record.table.clone()),
            data_columns: None,
            version,
            drawflow,
            settings: record.settings.clone(),
            global_data: record.global_data.clone(),
            description: record.description.clone(),
            ext_version: self.ext_version.clone(),
            included_workflows: None,
            extra: Map::new(),
        };

        // Extra fields matching typed ones go into the typed slot.
        if let Some(Value::Array(columns)) = extra.shift_remove("dataColumns") {
            document.data_columns = Some(columns);
        }
        document.extra = extra;

        Some(document)
    }

    /// Decode a document into record fields ready for storage.
    ///
    /// `table` falls back to the legacy `dataColumns`, which is then dropped.
    /// A serialised graph is parsed, an unparseable one replaced by an empty
    /// graph.  `version` and `extVersion` pass through untouched.  Any nested
    /// `includedWorkflows` is discarded.
    pub fn from_document(&self, document: PortableDocument) -> NewWorkflow {
        let PortableDocument {
            name,
            icon,
            table,
            data_columns,
            version,
            drawflow,
            settings,
            global_data,
            description,
            ext_version,
            included_workflows: _,
            mut extra,
        } = document;

        let drawflow = match drawflow {
            Value::String(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                debug!(workflow = %name, "unparseable graph replaced by an empty one: {err}");
                empty_graph()
            }),
            Value::Null => empty_graph(),
            structured => structured,
        };

        if table.is_none() && data_columns.is_some() {
            debug!(workflow = %name, "using legacy dataColumns as table");
        }

        if !ext_version.is_empty() {
            extra.insert("extVersion".to_owned(), Value::String(ext_version));
        }

        NewWorkflow {
            name,
            icon,
            table: table.or(data_columns).unwrap_or_default(),
            settings,
            global_data,
            description,
            drawflow,
            version,
            extra,
        }
    }
}

/// Fields every document carries in a typed slot.
const DOCUMENT_FIELDS: [&str; 10] = [
    "name",
    "icon",
    "table",
    "version",
    "drawflow",
    "settings",
    "globalData",
    "description",
    "extVersion",
    "includedWorkflows",
];

/// A record field by its document name, typed fields included.
fn record_field(record: &WorkflowRecord, key: &str) -> Option<Value> {
    match key {
        "id" => Some(Value::String(record.id.clone())),
        "createdAt" => Some(Value::from(record.created_at.timestamp_millis())),
        "isProtected" => Some(Value::Bool(record.is_protected)),
        other => record.extra.get(other).cloned(),
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn converter() -> DocumentConverter {
        DocumentConverter::new("1.29.0")
    }

    fn sample_record() -> WorkflowRecord {
        let mut record = WorkflowRecord::new("w1", "Scrape prices").with_drawflow(json!({
            "nodes": [{ "id": "a", "label": "trigger", "data": { "type": "manual" } }],
            "edges": []
        }));
        record.icon = "riGlobalLine".into();
        record.table = vec![json!({ "id": "c1", "name": "price", "type": "number" })];
        record.settings = json!({ "onError": "stop-workflow" })
            .as_object()
            .cloned()
            .unwrap();
        record.global_data = r#"{"key":"value"}"#.into();
        record.description = "collects prices".into();
        record.version = "1.20.0".into();
        record.extra.insert("folderId".into(), json!("f1"));
        record
    }

    #[test]
    fn missing_record_converts_to_nothing() {
        assert!(converter().to_document(None, &[]).is_none());
    }

    #[test]
    fn export_stamps_ext_version_and_keeps_record_version() {
        let doc = converter().to_document(Some(&sample_record()), &[]).unwrap();
        assert_eq!(doc.ext_version, "1.29.0");
        assert_eq!(doc.version, "1.20.0");
        assert_eq!(doc.name, "Scrape prices");
        assert!(doc.extra.is_empty(), "folderId is not exported unless asked for");
    }

    #[test]
    fn export_fills_defaults() {
        let record = WorkflowRecord::new("w2", "Bare");
        let doc = converter().to_document(Some(&record), &[]).unwrap();

        assert_eq!(doc.table, Some(vec![]));
        assert_eq!(doc.drawflow, json!({ "nodes": [], "edges": [] }));
        assert_eq!(doc.version, "1.29.0");
        assert!(doc.settings.is_empty());
        assert_eq!(doc.global_data, "");

        let json = serde_json::to_value(&doc).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "icon",
                "table",
                "version",
                "drawflow",
                "settings",
                "globalData",
                "description",
                "extVersion"
            ]
        );
    }

    #[test]
    fn extra_fields_are_copied_or_defaulted() {
        let doc = converter()
            .to_document(Some(&sample_record()), &["folderId", "dataColumns", "trigger"])
            .unwrap();

        assert_eq!(doc.extra.get("folderId"), Some(&json!("f1")));
        assert_eq!(doc.data_columns, Some(vec![]));
        assert!(!doc.extra.contains_key("trigger"));
    }

    #[test]
    fn typed_record_fields_can_be_requested() {
        let mut record = WorkflowRecord::new("w1", "A");
        record.is_protected = true;
        let doc = converter()
            .to_document(Some(&record), &["id", "createdAt", "isProtected", "name"])
            .unwrap();

        assert_eq!(doc.extra["id"], "w1");
        assert_eq!(doc.extra["createdAt"], json!(record.created_at.timestamp_millis()));
        assert_eq!(doc.extra["isProtected"], true);
        assert!(!doc.extra.contains_key("name"));

        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text.matches("\"name\"").count(), 1);
    }

    #[test]
    fn round_trip_preserves_content() {
        let record = sample_record();
        let doc = converter().to_document(Some(&record), &[]).unwrap();
        let back = converter().from_document(doc).into_record("new-id", Utc::now());

        assert_eq!(back.table, record.table);
        assert_eq!(back.settings, record.settings);
        assert_eq!(back.global_data, record.global_data);
        assert_eq!(back.description, record.description);
        assert_eq!(back.drawflow, record.drawflow);
        assert_eq!(back.extra.get("extVersion"), Some(&json!("1.29.0")));
    }

    #[test]
    fn legacy_data_columns_become_table() {
        let doc: PortableDocument = serde_json::from_value(json!({
            "name": "Old",
            "dataColumns": [{ "name": "col" }]
        }))
        .unwrap();

        let new = converter().from_document(doc);
        assert_eq!(new.table, vec![json!({ "name": "col" })]);
        assert!(!new.extra.contains_key("dataColumns"));
    }

    #[test]
    fn table_wins_over_data_columns() {
        let doc: PortableDocument = serde_json::from_value(json!({
            "table": [{ "name": "new" }],
            "dataColumns": [{ "name": "old" }]
        }))
        .unwrap();

        assert_eq!(converter().from_document(doc).table, vec![json!({ "name": "new" })]);
    }

    #[test]
    fn serialised_graph_is_parsed_on_import() {
        let doc = PortableDocument {
            drawflow: Value::String(r#"{"nodes":[],"edges":[]}"#.into()),
            ..Default::default()
        };
        assert_eq!(converter().from_document(doc).drawflow, json!({ "nodes": [], "edges": [] }));

        let broken = PortableDocument {
            drawflow: Value::String("{oops".into()),
            ..Default::default()
        };
        assert_eq!(converter().from_document(broken).drawflow, empty_graph());
    }
}
