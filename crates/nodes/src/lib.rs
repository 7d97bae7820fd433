//! `nodes` crate — the node-type catalogue and the runtime capabilities
//! each node type needs from the host.
//!
//! Every label found in a workflow graph maps onto a [`NodeKind`].  Kinds that
//! touch a gated host API carry a [`CapabilityRule`]; the engine crate asks a
//! [`CapabilityHost`] whether those capabilities are granted.

pub mod capability;
pub mod error;
pub mod fixed;
pub mod kind;
pub mod traits;

pub use capability::{capability_rule, Capability, CapabilityRule, HostVariant};
pub use error::CapabilityError;
pub use fixed::FixedCapabilityHost;
pub use kind::NodeKind;
pub use traits::CapabilityHost;
