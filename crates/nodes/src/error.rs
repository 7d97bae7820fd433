//! Capability-query error type.

use thiserror::Error;

/// Errors returned by a [`CapabilityHost`](crate::CapabilityHost) query.
///
/// Neither variant is retried by the engine; the caller decides.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The host refused to answer the query.
    #[error("capability query denied by host: {0}")]
    Denied(String),

    /// The host could not be reached or failed while answering.
    #[error("capability query failed: {0}")]
    Unavailable(String),
}
