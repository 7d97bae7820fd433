//! Permission resolution — which host capabilities a workflow still needs
//! before it can run.
//!
//! Purely advisory: nothing is requested from the host, only queried.

use serde_json::Value;
use tracing::{debug, instrument};

use nodes::{capability_rule, Capability, CapabilityHost, HostVariant};

use crate::{graph, EngineError};

/// Walks a workflow graph and asks the host about each capability its nodes
/// need.
pub struct PermissionResolver<'a> {
    host: &'a dyn CapabilityHost,
    variant: HostVariant,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(host: &'a dyn CapabilityHost, variant: HostVariant) -> Self {
        Self { host, variant }
    }

    /// Return the capabilities the graph needs that are not granted, in the
    /// order their first requiring node appears.
    ///
    /// Each capability is queried and reported at most once per graph, no
    /// matter how many nodes need it.
    ///
    /// # Errors
    /// - [`EngineError::MalformedDocument`] if `drawflow` is an unparseable
    ///   string.
    /// - [`EngineError::CapabilityQuery`] if the host fails a query.
    #[instrument(skip_all, fields(host = ?self.variant))]
    pub async fn resolve(&self, drawflow: &Value) -> Result<Vec<Capability>, EngineError> {
        let mut missing: Vec<Capability> = Vec::new();
        let mut checked: Vec<Capability> = Vec::new();

        for node in graph::normalize(drawflow, None)? {
            let Some(rule) = capability_rule(&node.kind, self.variant) else {
                continue;
            };
            if checked.contains(&rule.name) {
                continue;
            }

            let required = rule.required(&node.data, self.variant);
            if required.is_empty() {
                continue;
            }

            checked.push(rule.name);
            if !self.host.has_capability(&required).await? {
                debug!(node = %node.id, kind = %node.kind, capability = %rule.name, "capability missing");
                missing.push(rule.name);
            }
        }

        Ok(missing)
    }
}
