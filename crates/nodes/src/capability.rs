//! Host capabilities and the static table deriving them from node data.
//!
//! Rules are pure: given a node's data payload and the host variant they
//! return the capability names to query.  Querying is the engine's job.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NodeKind;

// ---------------------------------------------------------------------------
// HostVariant
// ---------------------------------------------------------------------------

/// The browser family hosting the automation runtime.
///
/// Firefox names some capabilities differently and gates clipboard access
/// behind two capabilities instead of one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostVariant {
    #[default]
    Chromium,
    Firefox,
}

impl HostVariant {
    /// The capability guarding context-menu registration on this host.
    pub fn context_menu_capability(self) -> Capability {
        match self {
            Self::Chromium => Capability::ContextMenus,
            Self::Firefox => Capability::Menus,
        }
    }
}

impl FromStr for HostVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            other => Err(format!("unknown host variant: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A host-granted runtime permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    ContextMenus,
    Menus,
    ClipboardRead,
    ClipboardWrite,
    Notifications,
    Downloads,
    Cookies,
}

impl Capability {
    /// The permission name understood by the host.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContextMenus => "contextMenus",
            Self::Menus => "menus",
            Self::ClipboardRead => "clipboardRead",
            Self::ClipboardWrite => "clipboardWrite",
            Self::Notifications => "notifications",
            Self::Downloads => "downloads",
            Self::Cookies => "cookies",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contextMenus" => Ok(Self::ContextMenus),
            "menus" => Ok(Self::Menus),
            "clipboardRead" => Ok(Self::ClipboardRead),
            "clipboardWrite" => Ok(Self::ClipboardWrite),
            "notifications" => Ok(Self::Notifications),
            "downloads" => Ok(Self::Downloads),
            "cookies" => Ok(Self::Cookies),
            other => Err(format!("unknown capability: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// CapabilityRule
// ---------------------------------------------------------------------------

/// Derives the capabilities a node needs from the rule's own name and the
/// node's data payload.
type Derive = fn(Capability, &Value, HostVariant) -> Vec<Capability>;

/// The requirement attached to one node kind.
#[derive(Clone, Copy)]
pub struct CapabilityRule {
    /// Reported as missing when the derived set is not fully granted.
    pub name: Capability,
    derive: Derive,
}

impl CapabilityRule {
    /// Capabilities to query for a node carrying `data`.
    ///
    /// An empty list means the node needs nothing on this host.
    pub fn required(&self, data: &Value, host: HostVariant) -> Vec<Capability> {
        (self.derive)(self.name, data, host)
    }
}

impl fmt::Debug for CapabilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRule").field("name", &self.name).finish()
    }
}

/// Look up the capability rule for a node kind.
///
/// Kept as an exhaustive `match` so a new [`NodeKind`] variant cannot be added
/// without deciding whether it needs a capability.
pub fn capability_rule(kind: &NodeKind, host: HostVariant) -> Option<CapabilityRule> {
    let rule = match kind {
        NodeKind::Trigger => CapabilityRule {
            name: host.context_menu_capability(),
            derive: trigger_capabilities,
        },
        NodeKind::Clipboard => CapabilityRule {
            name: Capability::ClipboardRead,
            derive: clipboard_capabilities,
        },
        NodeKind::Notification => fixed(Capability::Notifications),
        NodeKind::HandleDownload | NodeKind::SaveAssets => fixed(Capability::Downloads),
        NodeKind::Cookie => fixed(Capability::Cookies),
        NodeKind::ExecuteWorkflow | NodeKind::Other(_) => return None,
    };
    Some(rule)
}

fn fixed(name: Capability) -> CapabilityRule {
    CapabilityRule {
        name,
        derive: |name, _, _| vec![name],
    }
}

/// A trigger needs the context-menu capability only when one of its
/// sub-triggers (or the trigger itself, in the single-trigger layout) is a
/// context-menu trigger.
fn trigger_capabilities(capability: Capability, data: &Value, _host: HostVariant) -> Vec<Capability> {
    match data.get("triggers").and_then(Value::as_array) {
        Some(triggers) => triggers
            .iter()
            .filter(|t| t.get("type").and_then(Value::as_str) == Some("context-menu"))
            .map(|_| capability)
            .collect(),
        None if data.get("type").and_then(Value::as_str) == Some("context-menu") => {
            vec![capability]
        }
        None => Vec::new(),
    }
}

fn clipboard_capabilities(read: Capability, _data: &Value, host: HostVariant) -> Vec<Capability> {
    match host {
        HostVariant::Chromium => vec![read],
        HostVariant::Firefox => vec![read, Capability::ClipboardWrite],
    }
}
