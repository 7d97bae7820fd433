//! Repository functions — one function per database operation — and the
//! Postgres-backed [`WorkflowStore`](crate::WorkflowStore).
//!
//! Every function takes a `&DbPool` (or an open transaction) and returns a
//! `Result<T, DbError>`.  Queries are checked at run time so the crate builds
//! without a live database.

pub mod workflows;

mod pg;

pub use pg::PgWorkflowStore;
