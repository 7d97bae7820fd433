//! The `CapabilityHost` trait — the seam to the host's permission API.

use async_trait::async_trait;

use crate::{Capability, CapabilityError};

/// Answers whether runtime capabilities are currently granted.
///
/// Implemented by the embedding host; the engine only ever asks, it never
/// requests a grant.
#[async_trait]
pub trait CapabilityHost: Send + Sync {
    /// Return `true` when *every* capability in `capabilities` is granted.
    ///
    /// An empty slice is trivially granted.
    async fn has_capability(&self, capabilities: &[Capability]) -> Result<bool, CapabilityError>;
}
