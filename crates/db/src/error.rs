//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("row not found")]
    NotFound,

    /// An explicit-id insert collided with a stored workflow.
    #[error("workflow id already exists: '{0}'")]
    DuplicateId(String),

    /// A stored definition could not be (de)serialised.
    #[error("invalid workflow definition: {0}")]
    Definition(#[from] serde_json::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
