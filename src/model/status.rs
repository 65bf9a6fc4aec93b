//! Connection Status
//!
//! Per-child edit state of a carbon tree node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::tree::CarbonTree;

/// Edit state of one child id. Swaps and modifications carry the linked id
/// pair so the edit can be undone through either id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConnectionStatus {
    Original,
    Added,
    Deleted,
    Swapped {
        #[serde(rename = "originalId")]
        original_id: String,
        #[serde(rename = "otherId")]
        other_id: String,
    },
    Modified {
        #[serde(rename = "originalId")]
        original_id: String,
        #[serde(rename = "otherId")]
        other_id: String,
    },
}

impl ConnectionStatus {
    pub fn is_original(&self) -> bool {
        matches!(self, ConnectionStatus::Original)
    }

    /// `(original_id, other_id)` of a swap or modification.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match self {
            ConnectionStatus::Swapped { original_id, other_id }
            | ConnectionStatus::Modified { original_id, other_id } => Some((original_id, other_id)),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Original => "original",
            ConnectionStatus::Added => "added",
            ConnectionStatus::Deleted => "deleted",
            ConnectionStatus::Swapped { .. } => "swapped",
            ConnectionStatus::Modified { .. } => "modified",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pair() {
            Some((original_id, other_id)) => write!(f, "{} ({} -> {})", self.label(), original_id, other_id),
            None => f.write_str(self.label()),
        }
    }
}

/// Kind of substitution recorded by `swap_connection`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditKind {
    #[default]
    Swapped,
    Modified,
}

impl EditKind {
    pub fn status(self, original_id: &str, other_id: &str) -> ConnectionStatus {
        let (original_id, other_id) = (original_id.to_string(), other_id.to_string());
        match self {
            EditKind::Swapped => ConnectionStatus::Swapped { original_id, other_id },
            EditKind::Modified => ConnectionStatus::Modified { original_id, other_id },
        }
    }
}

/// What `reset_connection` undid.
#[derive(Debug, Clone)]
pub enum ResetOutcome {
    /// The id already had its original state.
    Unchanged,
    /// An added child was removed; it is handed back.
    RemovedAdded(Option<Arc<CarbonTree>>),
    /// A deleted child was restored from the baseline.
    Restored,
    /// A swap or modification was undone; carries the child that had been
    /// swapped in, if it was not itself a baseline child.
    SwappedBack(Option<Arc<CarbonTree>>),
}

impl ResetOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, ResetOutcome::Unchanged)
    }
}
