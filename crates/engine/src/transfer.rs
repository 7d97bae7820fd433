//! Workflow import/export orchestration.
//!
//! `WorkflowTransfer` composes the other components:
//! 1. Export: resolve included workflows, convert the root, attach the
//!    inclusions, serialise, and hand the bytes to the file collaborator.
//! 2. Import: decode the whole document up front, insert included workflows
//!    under their own ids (skipping ids the store already knows), insert the
//!    root under a fresh id, then register the trigger node of every inserted
//!    workflow.
//!
//! Nothing here retries; store and host failures surface as typed errors.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use db::{InsertOptions, WorkflowRecord, WorkflowStore};
use nodes::{Capability, CapabilityHost, HostVariant};

use crate::collaborators::{
    FileCollaborator, PickOptions, TriggerRegistrar, DOCUMENT_MIME_TYPE, DOCUMENT_SUFFIX,
};
use crate::convert::DocumentConverter;
use crate::inclusion::{InclusionResolver, DEFAULT_MAX_DEPTH};
use crate::models::{NewWorkflow, PortableDocument};
use crate::permissions::PermissionResolver;
use crate::{graph, EngineError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for import/export.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Version stamped into exported documents as `extVersion`.
    pub ext_version: String,
    /// Bound on sub-workflow nesting when embedding, root included.
    pub max_include_depth: u32,
    /// Host the permission checks are answered for.
    pub host: HostVariant,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            ext_version: env!("CARGO_PKG_VERSION").to_owned(),
            max_include_depth: DEFAULT_MAX_DEPTH,
            host: HostVariant::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowTransfer
// ---------------------------------------------------------------------------

/// Imports and exports workflows against one store.
pub struct WorkflowTransfer {
    store: Arc<dyn WorkflowStore>,
    files: Arc<dyn FileCollaborator>,
    triggers: Arc<dyn TriggerRegistrar>,
    capabilities: Arc<dyn CapabilityHost>,
    converter: DocumentConverter,
    config: TransferConfig,
}

impl WorkflowTransfer {
    /// Create a new orchestrator.
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        files: Arc<dyn FileCollaborator>,
        triggers: Arc<dyn TriggerRegistrar>,
        capabilities: Arc<dyn CapabilityHost>,
        config: TransferConfig,
    ) -> Self {
        Self {
            store,
            files,
            triggers,
            capabilities,
            converter: DocumentConverter::new(config.ext_version.clone()),
            config,
        }
    }

    pub fn converter(&self) -> &DocumentConverter {
        &self.converter
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Export `workflow` with its included workflows as `<name>.automa.json`.
    ///
    /// Returns the exported document, or `None` for a protected workflow, in
    /// which case no collaborator is touched.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if looking up an included workflow fails.
    #[instrument(skip(self, workflow), fields(workflow_id = %workflow.id))]
    pub async fn export(&self, workflow: &WorkflowRecord) -> Result<Option<PortableDocument>, EngineError> {
        if workflow.is_protected {
            info!("workflow is protected, not exporting");
            return Ok(None);
        }

        let included = InclusionResolver::new(self.store.as_ref(), &self.converter)
            .with_max_depth(self.config.max_include_depth)
            .resolve(workflow)
            .await?;

        let Some(mut document) = self.converter.to_document(Some(workflow), &[]) else {
            return Ok(None);
        };
        document.included_workflows = Some(included);

        let payload = serde_json::to_vec(&document).map_err(EngineError::malformed)?;
        let filename = format!("{}{DOCUMENT_SUFFIX}", workflow.name);

        info!(
            "exporting '{}' ({} bytes, {} included)",
            filename,
            payload.len(),
            document.included_workflows.as_ref().map_or(0, |i| i.len())
        );
        self.files.save_bytes(&filename, payload);

        Ok(Some(document))
    }

    /// Export the stored workflow `id`; an unknown id is a no-op.
    pub async fn export_by_id(&self, id: &str) -> Result<Option<PortableDocument>, EngineError> {
        match self.store.get_by_id(id).await? {
            Some(workflow) => self.export(&workflow).await,
            None => {
                info!(workflow_id = id, "workflow not found, nothing to export");
                Ok(None)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Import a document given as raw JSON text.
    pub async fn import_json(&self, raw: &str) -> Result<Vec<WorkflowRecord>, EngineError> {
        let value: Value = serde_json::from_str(raw).map_err(EngineError::malformed)?;
        self.import_value(value).await
    }

    /// Import an already-parsed JSON document.
    pub async fn import_value(&self, value: Value) -> Result<Vec<WorkflowRecord>, EngineError> {
        if !value.is_object() {
            return Err(EngineError::MalformedDocument(
                "workflow document must be a JSON object".into(),
            ));
        }
        let document = PortableDocument::deserialize(value).map_err(EngineError::malformed)?;
        self.import_document(document).await
    }

    /// Import picked files one after another.
    ///
    /// Returns every record inserted across all files.
    pub async fn import_from_files(&self, options: &PickOptions) -> Result<Vec<WorkflowRecord>, EngineError> {
        let handles = self.files.pick_files(&[DOCUMENT_MIME_TYPE], options).await?;

        let mut inserted = Vec::new();
        for handle in &handles {
            let text = self.files.read_file_as_text(handle).await?;
            debug!(file = %handle.name, "importing picked file");
            inserted.extend(self.import_json(&text).await?);
        }
        Ok(inserted)
    }

    /// Import a decoded document.
    ///
    /// Returns the newly inserted records: included workflows first (in
    /// document order), the root last.  Included workflows whose id is
    /// already stored are skipped and not returned.
    ///
    /// # Errors
    /// - `EngineError::StoreInsert` if the store rejects an insert; records
    ///   inserted before the failure stay in place.
    /// - `EngineError::Store` if an existence check fails.
    #[instrument(skip_all, fields(name = %document.name))]
    pub async fn import_document(&self, mut document: PortableDocument) -> Result<Vec<WorkflowRecord>, EngineError> {
        let included: Vec<(String, NewWorkflow)> = document
            .included_workflows
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|(id, doc)| (id, self.converter.from_document(doc)))
            .collect();
        let root = self.converter.from_document(document);

        let mut inserted = Vec::with_capacity(included.len() + 1);

        for (id, workflow) in included {
            if self.store.get_by_id(&id).await?.is_some() {
                debug!(workflow_id = %id, "included workflow already stored, skipping");
                continue;
            }
            let record = workflow.into_record(id, Utc::now());
            inserted.push(self.insert(record, InsertOptions::keep_id()).await?);
        }

        let record = root.into_record(String::new(), Utc::now());
        inserted.push(self.insert(record, InsertOptions::default()).await?);

        for record in &inserted {
            if let Some(trigger) = graph::find_trigger_node(&record.drawflow, None)? {
                debug!(workflow_id = %record.id, node = %trigger.id, "registering trigger");
                self.triggers.register_trigger(&record.id, &trigger).await;
            }
        }

        info!("imported {} workflow(s)", inserted.len());
        Ok(inserted)
    }

    async fn insert(&self, record: WorkflowRecord, options: InsertOptions) -> Result<WorkflowRecord, EngineError> {
        let id = if options.duplicate_id {
            record.id.clone()
        } else {
            "<new>".to_owned()
        };
        self.store
            .insert_record(record, options)
            .await
            .map_err(|source| EngineError::StoreInsert { id, source })
    }

    // -----------------------------------------------------------------------
    // Permissions
    // -----------------------------------------------------------------------

    /// Capabilities `drawflow` needs that the host has not granted.
    pub async fn workflow_permissions(&self, drawflow: &Value) -> Result<Vec<Capability>, EngineError> {
        PermissionResolver::new(self.capabilities.as_ref(), self.config.host)
            .resolve(drawflow)
            .await
    }
}
