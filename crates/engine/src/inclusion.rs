//! Inclusion resolution — find every workflow an export must embed.
//!
//! A workflow can run others through `execute-workflow` nodes, and those can
//! run others in turn.  The resolver walks that reference graph depth-first
//! and collects one portable document per referenced workflow into a single
//! flat map.
//!
//! Two independent guards keep the walk finite:
//! 1. An id already in the map (or the root's own id) is never visited again,
//!    which breaks reference cycles.  The check happens before descending.
//! 2. Depth is bounded.  The root counts as the first level, so the default
//!    of 3 embeds workflows referenced directly and one level further down.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, instrument};

use db::{WorkflowRecord, WorkflowStore};

use crate::convert::DocumentConverter;
use crate::graph;
use crate::models::IncludedWorkflows;
use crate::EngineError;

/// Default bound on sub-workflow nesting, root included.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

type Step<'s> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 's>>;

/// Collects the closure of sub-workflows referenced by a workflow.
pub struct InclusionResolver<'a> {
    store: &'a dyn WorkflowStore,
    converter: &'a DocumentConverter,
    max_depth: u32,
}

impl<'a> InclusionResolver<'a> {
    pub fn new(store: &'a dyn WorkflowStore, converter: &'a DocumentConverter) -> Self {
        Self {
            store,
            converter,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve the included workflows of `workflow` into a fresh map.
    ///
    /// References to workflows missing from the store are skipped.
    ///
    /// # Errors
    /// - [`EngineError::Store`] if a store lookup fails.
    #[instrument(skip_all, fields(workflow_id = %workflow.id, max_depth = self.max_depth))]
    pub async fn resolve(&self, workflow: &WorkflowRecord) -> Result<IncludedWorkflows, EngineError> {
        let mut included = IncludedWorkflows::new();
        self.resolve_into(workflow, &mut included).await?;
        debug!(count = included.len(), "included workflows resolved");
        Ok(included)
    }

    /// Like [`resolve`](Self::resolve), accumulating into a caller-owned map.
    ///
    /// Ids already present in `included` are treated as resolved and are
    /// neither looked up nor descended into.
    pub async fn resolve_into(
        &self,
        workflow: &WorkflowRecord,
        included: &mut IncludedWorkflows,
    ) -> Result<(), EngineError> {
        let remaining = self.max_depth.saturating_sub(1);
        self.collect(workflow, &workflow.id, remaining, included).await
    }

    fn collect<'s>(
        &'s self,
        workflow: &'s WorkflowRecord,
        root_id: &'s str,
        remaining: u32,
        included: &'s mut IncludedWorkflows,
    ) -> Step<'s> {
        Box::pin(async move {
            if remaining == 0 {
                return Ok(());
            }

            // An unparseable graph falls back to its raw string: no nodes.
            let nodes = graph::normalize(&workflow.drawflow, Some(&workflow.drawflow))?;

            for node in &nodes {
                let Some(id) = node.referenced_workflow() else {
                    continue;
                };
                if id == root_id || included.contains_key(id) {
                    continue;
                }

                let Some(sub) = self.store.get_by_id(id).await? else {
                    debug!(workflow_id = id, from = %workflow.id, "referenced workflow not found, skipping");
                    continue;
                };

                if let Some(document) = self.converter.to_document(Some(&sub), &[]) {
                    included.insert(id.to_owned(), document);
                }
                self.collect(&sub, root_id, remaining - 1, included).await?;
            }

            Ok(())
        })
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use db::MemoryStore;
    use serde_json::{json, Value};

    fn calls(ids: &[&str]) -> Value {
        let nodes: Vec<Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                json!({ "id": format!("n{i}"), "label": "execute-workflow", "data": { "workflowId": id } })
            })
            .collect();
        json!({ "nodes": nodes, "edges": [] })
    }

    fn workflow(id: &str, refs: &[&str]) -> WorkflowRecord {
        WorkflowRecord::new(id, id.to_uppercase()).with_drawflow(calls(refs))
    }

    fn keys(included: &IncludedWorkflows) -> Vec<&str> {
        included.keys().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn chain_is_cut_at_max_depth() {
        let store = MemoryStore::with_records([
            workflow("b", &["c"]),
            workflow("c", &["d"]),
            workflow("d", &["e"]),
            workflow("e", &[]),
        ]);
        let converter = DocumentConverter::new("1.0.0");
        let root = workflow("a", &["b"]);

        let included = InclusionResolver::new(&store, &converter)
            .with_max_depth(3)
            .resolve(&root)
            .await
            .unwrap();

        assert_eq!(keys(&included), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn shared_dependency_is_included_once() {
        // a → b, a → c → b
        let store = MemoryStore::with_records([workflow("b", &[]), workflow("c", &["b"])]);
        let converter = DocumentConverter::new("1.0.0");
        let root = workflow("a", &["b", "c", "b"]);

        let included = InclusionResolver::new(&store, &converter)
            .resolve(&root)
            .await
            .unwrap();

        assert_eq!(keys(&included), vec!["b", "c"]);
        assert_eq!(included["b"].name, "B");
    }

    #[tokio::test]
    async fn cycles_terminate_and_never_include_the_root() {
        let store = MemoryStore::with_records([workflow("b", &["c"]), workflow("c", &["a", "b"])]);
        let converter = DocumentConverter::new("1.0.0");
        let root = workflow("a", &["b"]);

        let included = InclusionResolver::new(&store, &converter)
            .with_max_depth(10)
            .resolve(&root)
            .await
            .unwrap();

        assert_eq!(keys(&included), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn dangling_reference_is_skipped() {
        let store = MemoryStore::with_records([workflow("c", &[])]);
        let converter = DocumentConverter::new("1.0.0");
        let root = workflow("a", &["gone", "c"]);

        let included = InclusionResolver::new(&store, &converter)
            .resolve(&root)
            .await
            .unwrap();

        assert_eq!(keys(&included), vec!["c"]);
    }

    #[tokio::test]
    async fn nested_documents_do_not_carry_their_own_inclusions() {
        let store = MemoryStore::with_records([workflow("b", &["c"]), workflow("c", &[])]);
        let converter = DocumentConverter::new("1.0.0");

        let included = InclusionResolver::new(&store, &converter)
            .resolve(&workflow("a", &["b"]))
            .await
            .unwrap();

        assert!(included.values().all(|doc| doc.included_workflows.is_none()));
    }

    #[tokio::test]
    async fn legacy_and_serialised_graphs_are_followed() {
        let legacy = json!({ "drawflow": { "Home": { "data": {
            "x": { "id": "x", "name": "execute-workflow", "data": { "workflowId": "c" } }
        } } } });
        let store = MemoryStore::with_records([
            WorkflowRecord::new("b", "B").with_drawflow(legacy),
            WorkflowRecord::new("c", "C"),
        ]);
        let converter = DocumentConverter::new("1.0.0");
        let root = WorkflowRecord::new("a", "A").with_drawflow(Value::String(calls(&["b"]).to_string()));

        let included = InclusionResolver::new(&store, &converter)
            .resolve(&root)
            .await
            .unwrap();

        assert_eq!(keys(&included), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn known_ids_in_the_accumulator_are_not_revisited() {
        let store = MemoryStore::with_records([workflow("b", &["c"]), workflow("c", &[])]);
        let converter = DocumentConverter::new("1.0.0");

        let mut included = IncludedWorkflows::new();
        included.insert("b".into(), Default::default());

        InclusionResolver::new(&store, &converter)
            .resolve_into(&workflow("a", &["b"]), &mut included)
            .await
            .unwrap();

        assert_eq!(keys(&included), vec!["b"]);
    }

    #[tokio::test]
    async fn zero_depth_resolves_nothing() {
        let store = MemoryStore::with_records([workflow("b", &[])]);
        let converter = DocumentConverter::new("1.0.0");

        let included = InclusionResolver::new(&store, &converter)
            .with_max_depth(0)
            .resolve(&workflow("a", &["b"]))
            .await
            .unwrap();

        assert!(included.is_empty());
    }
}
