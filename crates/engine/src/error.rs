//! Engine-level error types.

use thiserror::Error;

/// Errors produced while importing, exporting or inspecting workflows.
///
/// Two situations are deliberately *not* errors: a sub-workflow reference
/// to a workflow that no longer exists, and exporting a protected or unknown
/// workflow.  Both are skipped silently.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The document or graph could not be parsed; nothing was written.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The host failed to answer a capability query.
    #[error("capability query failed: {0}")]
    CapabilityQuery(#[from] nodes::CapabilityError),

    /// The store rejected an insert.
    #[error("failed to insert workflow '{id}': {source}")]
    StoreInsert {
        id: String,
        #[source]
        source: db::DbError,
    },

    /// Any other store failure (lookups, listing, bulk replace).
    #[error("store error: {0}")]
    Store(#[from] db::DbError),

    /// The file collaborator could not pick or read a file.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}
