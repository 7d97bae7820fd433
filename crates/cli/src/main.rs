//! `workflow-porter` CLI entry-point.
//!
//! Available sub-commands:
//! - `export`      — write a stored workflow and its sub-workflows to a file.
//! - `import`      — import one or more exported documents.
//! - `permissions` — list the capabilities a document still needs.
//! - `validate`    — decode a document without touching the store.
//! - `backup`      — snapshot the whole store into a file.
//! - `restore`     — replace the store content with a snapshot.
//! - `migrate`     — run pending database migrations.

mod host;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use db::{MemoryStore, PoolSettings, WorkflowStore};
use engine::{Backup, PickOptions, PortableDocument, TransferConfig, WorkflowTransfer};
use nodes::{Capability, FixedCapabilityHost, HostVariant};

use crate::host::{LocalFiles, LoggingTriggers};

#[derive(Parser)]
#[command(
    name = "workflow-porter",
    about = "Export, import and back up automation workflows",
    version
)]
struct Cli {
    /// Postgres connection string of the workflow store.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Host the permission rules are evaluated for.
    #[arg(long, env = "WORKFLOW_HOST", default_value = "chromium", global = true)]
    host: HostVariant,

    /// Version stamped into exported documents.
    #[arg(long, env = "WORKFLOW_EXT_VERSION", global = true)]
    ext_version: Option<String>,

    /// Bound on sub-workflow nesting when exporting, root included.
    #[arg(long, default_value_t = engine::inclusion::DEFAULT_MAX_DEPTH, global = true)]
    max_depth: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a stored workflow as `<name>.automa.json`.
    Export {
        id: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Import exported workflow documents.
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List capabilities a document needs that are not granted.
    Permissions {
        path: PathBuf,
        /// Capability the host already grants; repeatable.
        #[arg(long = "granted")]
        granted: Vec<Capability>,
    },
    /// Decode a workflow document and report what an import would do.
    Validate { path: PathBuf },
    /// Write every stored workflow into a backup file.
    Backup { path: PathBuf },
    /// Replace the stored workflows with a backup file.
    Restore { path: PathBuf },
    /// Run pending database migrations.
    Migrate,
}

impl Cli {
    fn transfer_config(&self) -> TransferConfig {
        let defaults = TransferConfig::default();
        TransferConfig {
            ext_version: self.ext_version.clone().unwrap_or(defaults.ext_version),
            max_include_depth: self.max_depth,
            host: self.host,
        }
    }

    async fn store(&self, migrate: bool) -> Result<Arc<dyn WorkflowStore>> {
        let Some(url) = self.database_url.as_deref() else {
            bail!("DATABASE_URL or --database-url is required for this command");
        };
        let settings = PoolSettings {
            migrate,
            ..PoolSettings::default()
        };
        let store = db::connect_store(url, &settings)
            .await
            .context("failed to connect to the workflow database")?;
        Ok(Arc::new(store))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.transfer_config();

    match &cli.command {
        Command::Export { id, out_dir } => {
            let store = cli.store(false).await?;
            let files = Arc::new(LocalFiles::new(out_dir.clone(), Vec::new()));
            let transfer = transfer(store, files, config, []);
            match transfer.export_by_id(id).await? {
                Some(document) => println!(
                    "exported '{}' with {} included workflow(s)",
                    document.name,
                    document.included_workflows.as_ref().map_or(0, |i| i.len())
                ),
                None => println!("nothing exported: workflow {id} is missing or protected"),
            }
        }
        Command::Import { files } => {
            let store = cli.store(false).await?;
            let picker = Arc::new(LocalFiles::new(".", files.clone()));
            let transfer = transfer(store, picker, config, []);
            let inserted = transfer
                .import_from_files(&PickOptions { multiple: true })
                .await?;
            for record in &inserted {
                println!("{}\t{}", record.id, record.name);
            }
            info!("imported {} workflow(s)", inserted.len());
        }
        Command::Permissions { path, granted } => {
            let document = read_document(path)?;
            let files = Arc::new(LocalFiles::new(".", Vec::new()));
            let transfer = transfer(Arc::new(MemoryStore::new()), files, config, granted.iter().copied());
            let missing = transfer.workflow_permissions(&document.drawflow).await?;
            if missing.is_empty() {
                println!("no additional permissions needed");
            } else {
                for capability in missing {
                    println!("{capability}");
                }
            }
        }
        Command::Validate { path } => {
            let document = read_document(path)?;
            report(&document.name, &document.drawflow)?;
            for (id, included) in document.included_workflows.iter().flatten() {
                report(&format!("{} ({id})", included.name), &included.drawflow)?;
            }
        }
        Command::Backup { path } => {
            let store = cli.store(false).await?;
            let backup = engine::export_backup(store.as_ref()).await?;
            let payload = serde_json::to_vec_pretty(&backup)?;
            std::fs::write(path, payload).with_context(|| format!("cannot write {}", path.display()))?;
            println!("backed up {} workflow(s) to {}", backup.workflows.len(), path.display());
        }
        Command::Restore { path } => {
            let content = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
            let backup: Backup = serde_json::from_str(&content).context("invalid backup file")?;
            let store = cli.store(false).await?;
            let restored = engine::import_backup(store.as_ref(), backup).await?;
            println!("restored {restored} workflow(s)");
        }
        Command::Migrate => {
            cli.store(true).await?;
            info!("migrations applied successfully");
        }
    }

    Ok(())
}

fn transfer(
    store: Arc<dyn WorkflowStore>,
    files: Arc<LocalFiles>,
    config: TransferConfig,
    granted: impl IntoIterator<Item = Capability>,
) -> WorkflowTransfer {
    WorkflowTransfer::new(
        store,
        files,
        Arc::new(LoggingTriggers),
        Arc::new(FixedCapabilityHost::granting(granted)),
        config,
    )
}

fn read_document(path: &Path) -> Result<PortableDocument> {
    let content = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a workflow document", path.display()))
}

fn report(name: &str, drawflow: &serde_json::Value) -> Result<()> {
    let nodes = engine::normalize(drawflow, None)?;
    let trigger = nodes.iter().find(|n| n.kind.is_trigger());
    let calls: Vec<&str> = nodes.iter().filter_map(|n| n.referenced_workflow()).collect();
    println!(
        "{name}: {} node(s), trigger {}, runs {:?}",
        nodes.len(),
        trigger.map_or("none", |t| t.id.as_str()),
        calls
    );
    Ok(())
}
