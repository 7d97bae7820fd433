//! Seams to the outside world used by the import/export orchestrator.
//!
//! The host supplies implementations: a browser opens a file picker and
//! triggers downloads, the command line reads and writes local files.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::NodeDescriptor;

/// MIME type of exported documents.
pub const DOCUMENT_MIME_TYPE: &str = "application/json";

/// File-name suffix of exported documents.
pub const DOCUMENT_SUFFIX: &str = ".automa.json";

/// A file the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Display name of the file.
    pub name: String,
    /// Location on disk, when the host has one.
    pub path: Option<PathBuf>,
}

/// Options forwarded to the host's file picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickOptions {
    /// Allow picking more than one file.
    pub multiple: bool,
}

/// Picks, reads and saves files on behalf of the orchestrator.
#[async_trait]
pub trait FileCollaborator: Send + Sync {
    /// Let the user pick files matching `mime_types`.
    async fn pick_files(
        &self,
        mime_types: &[&str],
        options: &PickOptions,
    ) -> std::io::Result<Vec<FileHandle>>;

    /// Read a picked file as UTF-8 text.
    async fn read_file_as_text(&self, handle: &FileHandle) -> std::io::Result<String>;

    /// Hand `payload` to the host as a download named `filename`.
    ///
    /// Fire-and-forget: the host reports its own failures.
    fn save_bytes(&self, filename: &str, payload: Vec<u8>);
}

/// Registers trigger nodes of freshly imported workflows with the host.
#[async_trait]
pub trait TriggerRegistrar: Send + Sync {
    async fn register_trigger(&self, workflow_id: &str, trigger: &NodeDescriptor);
}
