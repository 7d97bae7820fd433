//! `engine` crate — workflow serialization, sub-workflow resolution and
//! permission derivation.
//!
//! Sits between the workflow store and the outside world: turns stored
//! workflows into portable documents and back, embeds the sub-workflows a
//! workflow runs, and works out which host capabilities it still needs.

pub mod backup;
pub mod collaborators;
pub mod convert;
pub mod error;
pub mod graph;
pub mod inclusion;
pub mod models;
pub mod permissions;
pub mod transfer;

pub use backup::{export_backup, import_backup, reset_workflows, Backup};
pub use collaborators::{FileCollaborator, FileHandle, PickOptions, TriggerRegistrar};
pub use convert::DocumentConverter;
pub use error::EngineError;
pub use graph::{find_trigger_node, normalize};
pub use inclusion::InclusionResolver;
pub use models::{IncludedWorkflows, NewWorkflow, NodeDescriptor, PortableDocument};
pub use permissions::PermissionResolver;
pub use transfer::{TransferConfig, WorkflowTransfer};
