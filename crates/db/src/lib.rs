//! `db` crate — workflow persistence.
//!
//! Owns the persisted [`WorkflowRecord`] and the [`WorkflowStore`] seam the
//! engine talks to, with an in-memory store and a Postgres-backed one.
//! No transformation logic lives here.

pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repository;
pub mod store;

pub use error::DbError;
pub use memory::MemoryStore;
pub use models::{InsertOptions, WorkflowRecord};
pub use pool::{connect_store, DbPool, PoolSettings};
pub use repository::PgWorkflowStore;
pub use store::WorkflowStore;
