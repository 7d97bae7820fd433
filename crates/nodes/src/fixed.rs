//! `FixedCapabilityHost` — a host whose grants are decided up front.
//!
//! Used by the command line (grants come from flags) and by tests, where it
//! also records every query it receives.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Capability, CapabilityError, CapabilityHost};

/// What the host does when queried.
#[derive(Debug, Clone)]
enum Answer {
    /// Compare against the granted set.
    Granted(HashSet<Capability>),
    /// Fail every query.
    Fail(CapabilityError),
}

/// A capability host with a static grant set.
#[derive(Debug, Clone)]
pub struct FixedCapabilityHost {
    answer: Answer,
    /// Every query seen by this host (in call order).
    queries: Arc<Mutex<Vec<Vec<Capability>>>>,
}

impl FixedCapabilityHost {
    /// A host granting exactly `granted`.
    pub fn granting(granted: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            answer: Answer::Granted(granted.into_iter().collect()),
            queries: Arc::default(),
        }
    }

    /// A host granting nothing.
    pub fn denying_all() -> Self {
        Self::granting([])
    }

    /// A host whose every query fails with `error`.
    pub fn failing(error: CapabilityError) -> Self {
        Self {
            answer: Answer::Fail(error),
            queries: Arc::default(),
        }
    }

    /// All queries received so far.
    pub async fn queries(&self) -> Vec<Vec<Capability>> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl CapabilityHost for FixedCapabilityHost {
    async fn has_capability(&self, capabilities: &[Capability]) -> Result<bool, CapabilityError> {
        self.queries.lock().await.push(capabilities.to_vec());

        match &self.answer {
            Answer::Granted(granted) => {
                let ok = capabilities.iter().all(|c| granted.contains(c));
                debug!(?capabilities, granted = ok, "capability query");
                Ok(ok)
            }
            Answer::Fail(err) => Err(err.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn all_requested_capabilities_must_be_granted() {
        let host = FixedCapabilityHost::granting([Capability::ClipboardRead]);

        assert!(host.has_capability(&[Capability::ClipboardRead]).await.unwrap());
        assert!(!host
            .has_capability(&[Capability::ClipboardRead, Capability::ClipboardWrite])
            .await
            .unwrap());
        assert!(host.has_capability(&[]).await.unwrap());

        assert_eq!(host.queries().await.len(), 3);
    }

    #[tokio::test]
    async fn failing_host_propagates_error() {
        let host = FixedCapabilityHost::failing(CapabilityError::Denied("no".into()));
        let err = host.has_capability(&[Capability::Cookies]).await.unwrap_err();
        assert_eq!(err, CapabilityError::Denied("no".into()));
    }
}
