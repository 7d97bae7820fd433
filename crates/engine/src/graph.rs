//! Graph normalization — run this before looking at any node of a workflow.
//!
//! Two graph shapes exist in stored and exported workflows:
//! 1. Current: `{ "nodes": [{ id, label, data }], "edges": [...] }`.
//! 2. Legacy:  `{ "drawflow": { "Home": { "data": { <id>: { id, name, data } } } } }`.
//!
//! Either may arrive serialised as a JSON string.  Both are flattened into the
//! same ordered list of [`NodeDescriptor`]s; edges are ignored.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::debug;

use nodes::NodeKind;

use crate::{models::NodeDescriptor, EngineError};

// ---------------------------------------------------------------------------
// Per-node decoding
// ---------------------------------------------------------------------------

/// Which type field a shape reads first.
#[derive(Clone, Copy)]
enum LabelField {
    Label,
    Name,
}

fn str_field<'v>(node: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    node.get(key).and_then(Value::as_str)
}

/// Build one descriptor.  Fields of the wrong JSON type count as absent, so a
/// single odd node never hides its siblings.
///
/// `fallback_id` is the legacy map key, used when the node omits its id.
fn descriptor(node: &Value, first: LabelField, fallback_id: Option<&str>) -> Option<NodeDescriptor> {
    let Some(node) = node.as_object() else {
        debug!("skipping graph node that is not an object");
        return None;
    };

    let label = match first {
        LabelField::Label => str_field(node, "label").or_else(|| str_field(node, "name")),
        LabelField::Name => str_field(node, "name").or_else(|| str_field(node, "label")),
    };

    let id = match node.get("id") {
        Some(Value::String(id)) => id.clone(),
        None | Some(Value::Null) => fallback_id.unwrap_or_default().to_owned(),
        Some(other) => other.to_string(),
    };

    Some(NodeDescriptor {
        id,
        kind: NodeKind::from_label(label.unwrap_or_default()),
        data: match node.get("data") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(data) => data.clone(),
        },
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve a possibly-serialised graph into a structured value.
///
/// A string is parsed as JSON.  When parsing fails the `default` value is
/// used instead; without a default the failure is reported as
/// [`EngineError::MalformedDocument`].
pub fn parse_graph<'a>(
    graph: &'a Value,
    default: Option<&'a Value>,
) -> Result<Cow<'a, Value>, EngineError> {
    let Value::String(raw) = graph else {
        return Ok(Cow::Borrowed(graph));
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => Ok(Cow::Owned(parsed)),
        Err(err) => match default {
            Some(default) => {
                debug!("graph string is not valid JSON ({err}); using fallback");
                Ok(Cow::Borrowed(default))
            }
            None => Err(EngineError::malformed(format!("invalid graph JSON: {err}"))),
        },
    }
}

/// Flatten a graph into its nodes, in document order.
///
/// # Errors
/// - [`EngineError::MalformedDocument`] if `graph` is a string that is not
///   valid JSON and no `default` was given.
///
/// A graph in neither shape (including `null`) yields no nodes.
pub fn normalize(graph: &Value, default: Option<&Value>) -> Result<Vec<NodeDescriptor>, EngineError> {
    let graph = parse_graph(graph, default)?;
    Ok(structured_nodes(&graph))
}

/// The first trigger node of a graph, if there is one.
pub fn find_trigger_node(
    graph: &Value,
    default: Option<&Value>,
) -> Result<Option<NodeDescriptor>, EngineError> {
    Ok(normalize(graph, default)?
        .into_iter()
        .find(|node| node.kind.is_trigger()))
}

/// Nodes of an already-structured graph.  Strings are never re-parsed here.
pub(crate) fn structured_nodes(graph: &Value) -> Vec<NodeDescriptor> {
    if let Some(nodes) = graph.get("nodes") {
        let Some(nodes) = nodes.as_array() else {
            debug!("node list is not an array; treating graph as empty");
            return Vec::new();
        };
        return nodes
            .iter()
            .filter_map(|node| descriptor(node, LabelField::Label, None))
            .collect();
    }

    match graph.pointer("/drawflow/Home/data").and_then(Value::as_object) {
        Some(legacy) => legacy
            .iter()
            .filter_map(|(key, node)| descriptor(node, LabelField::Name, Some(key.as_str())))
            .collect(),
        None => Vec::new(),
    }
}

/// An empty graph in the current shape.
pub fn empty_graph() -> Value {
    serde_json::json!({ "nodes": [], "edges": [] })
}
