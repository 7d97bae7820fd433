//! Known node types.
//!
//! Graph documents identify a node's type by a free-form label (`label` in the
//! current shape, `name` in the legacy one).  Only a handful of labels matter
//! to this crate; everything else is carried through as [`NodeKind::Other`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// The type of a single node in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Starts the workflow (manual, schedule, context menu, …).
    Trigger,
    /// Reads the system clipboard.
    Clipboard,
    /// Shows a desktop notification.
    Notification,
    /// Waits for and handles a browser download.
    HandleDownload,
    /// Saves page assets to disk.
    SaveAssets,
    /// Reads or writes cookies.
    Cookie,
    /// Runs another stored workflow.
    ExecuteWorkflow,
    /// Any label this crate has no special knowledge of.
    Other(String),
}

impl NodeKind {
    /// Every kind with a fixed label, in declaration order.
    pub const KNOWN: [NodeKind; 7] = [
        NodeKind::Trigger,
        NodeKind::Clipboard,
        NodeKind::Notification,
        NodeKind::HandleDownload,
        NodeKind::SaveAssets,
        NodeKind::Cookie,
        NodeKind::ExecuteWorkflow,
    ];

    /// Map a graph label onto a kind.  Never fails.
    pub fn from_label(label: &str) -> Self {
        match label {
            "trigger" => Self::Trigger,
            "clipboard" => Self::Clipboard,
            "notification" => Self::Notification,
            "handle-download" => Self::HandleDownload,
            "save-assets" => Self::SaveAssets,
            "cookie" => Self::Cookie,
            "execute-workflow" => Self::ExecuteWorkflow,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The label as it appears in graph documents.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trigger => "trigger",
            Self::Clipboard => "clipboard",
            Self::Notification => "notification",
            Self::HandleDownload => "handle-download",
            Self::SaveAssets => "save-assets",
            Self::Cookie => "cookie",
            Self::ExecuteWorkflow => "execute-workflow",
            Self::Other(label) => label,
        }
    }

    /// Whether a node of this kind starts its workflow.
    ///
    /// Import registers the first such node of every inserted workflow with
    /// the host's trigger registrar.
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger)
    }

    /// Whether a node of this kind references another workflow by id.
    pub fn is_sub_workflow(&self) -> bool {
        matches!(self, Self::ExecuteWorkflow)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl From<String> for NodeKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}
