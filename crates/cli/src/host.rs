//! Local-filesystem stand-ins for the browser host.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info};

use engine::{FileCollaborator, FileHandle, NodeDescriptor, PickOptions, TriggerRegistrar};

/// "Picks" the paths given on the command line and writes downloads into an
/// output directory.
#[derive(Debug, Clone)]
pub struct LocalFiles {
    out_dir: PathBuf,
    inputs: Vec<PathBuf>,
}

impl LocalFiles {
    pub fn new(out_dir: impl Into<PathBuf>, inputs: Vec<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            inputs,
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Workflow names are user data; separators must not turn them into paths.
fn flat_file_name(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[async_trait]
impl FileCollaborator for LocalFiles {
    async fn pick_files(&self, mime_types: &[&str], options: &PickOptions) -> std::io::Result<Vec<FileHandle>> {
        let want_json = mime_types.contains(&engine::collaborators::DOCUMENT_MIME_TYPE);
        let mut handles: Vec<FileHandle> = self
            .inputs
            .iter()
            .filter(|path| !want_json || is_json(path))
            .map(|path| FileHandle {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: Some(path.clone()),
            })
            .collect();

        if !options.multiple {
            handles.truncate(1);
        }
        Ok(handles)
    }

    async fn read_file_as_text(&self, handle: &FileHandle) -> std::io::Result<String> {
        let path = handle.path.as_deref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{} has no path", handle.name))
        })?;
        tokio::fs::read_to_string(path).await
    }

    fn save_bytes(&self, filename: &str, payload: Vec<u8>) {
        let target = self.out_dir.join(flat_file_name(filename));
        match std::fs::write(&target, payload) {
            Ok(()) => info!("wrote {}", target.display()),
            Err(e) => error!("cannot write {}: {e}", target.display()),
        }
    }
}

/// Logs trigger registrations; the command line has no scheduler to hand
/// them to.
#[derive(Debug, Default)]
pub struct LoggingTriggers;

#[async_trait]
impl TriggerRegistrar for LoggingTriggers {
    async fn register_trigger(&self, workflow_id: &str, trigger: &NodeDescriptor) {
        info!(
            workflow_id,
            node = %trigger.id,
            trigger_type = trigger.data.get("type").and_then(|t| t.as_str()).unwrap_or("manual"),
            "trigger registered"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn picks_only_json_files_and_honours_multiple() {
        let files = LocalFiles::new(
            ".",
            vec!["a.automa.json".into(), "notes.txt".into(), "b.JSON".into()],
        );

        let all = files
            .pick_files(&["application/json"], &PickOptions { multiple: true })
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["a.automa.json", "b.JSON"]);

        let one = files
            .pick_files(&["application/json"], &PickOptions::default())
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn names_with_separators_stay_inside_the_output_directory() {
        let root = std::env::temp_dir().join(format!("workflow-porter-save-{}", std::process::id()));
        let inner = root.join("inner");
        std::fs::create_dir_all(&inner).unwrap();

        let files = LocalFiles::new(&inner, Vec::new());
        files.save_bytes("../escaped.automa.json", b"{}".to_vec());
        files.save_bytes("/abs.automa.json", b"{}".to_vec());

        assert!(!root.join("escaped.automa.json").exists());
        assert!(inner.join(".._escaped.automa.json").exists());
        assert!(inner.join("_abs.automa.json").exists());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
