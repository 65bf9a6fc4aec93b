//! Simulation Changes
//!
//! The edit set of a carbon tree as a pruned snapshot, its persisted token
//! form and its replay onto a freshly loaded baseline.
//!
//! A snapshot holds every changed node along the path to it. Children that
//! were added, swapped in or modified are stored as complete subtrees,
//! together with the plain baseline of their own children, so replay can
//! rebuild both views without the original data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::record::{AssetInfo, BasicInfo, CarbonTreeRecord, ConnectionInfo};
use super::status::ConnectionStatus;
use super::tree::CarbonTree;
use crate::codec::token::{decode_token, encode_token, DEFAULT_COMPRESSION_LEVEL};
use crate::error::{Result, TraceError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationChanges {
    pub asset: AssetInfo,
    pub entity: BasicInfo,
    #[serde(default)]
    pub is_simulation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionInfo>,
    /// Snapshots of changed children only; unchanged ones are absent.
    #[serde(default)]
    pub connections: BTreeMap<String, SimulationChanges>,
    /// Baseline children of a stored subtree; empty for nodes that exist
    /// in the loaded record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub original_connections: BTreeMap<String, CarbonTreeRecord>,
    #[serde(default)]
    pub connection_status: BTreeMap<String, ConnectionStatus>,
    /// Bulk count override, if one was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_count: Option<f64>,
}

impl SimulationChanges {
    /// The stored node as it was before any edit below it. Replaying the
    /// snapshot on top of this record yields the edited node.
    pub fn baseline_record(&self) -> CarbonTreeRecord {
        CarbonTreeRecord {
            asset: self.asset.clone(),
            entity: self.entity.clone(),
            connection: self.connection.clone(),
            connections: self.original_connections.clone(),
        }
    }

    pub fn to_token(&self, level: i32) -> Result<String> {
        let json = serde_json::to_string(self)?;
        let token = encode_token(&json, level)?;
        info!(json_len = json.len(), token_len = token.len(), "Stringified simulation changes");
        Ok(token)
    }

    pub fn from_token(token: &str) -> Result<Self> {
        let json = decode_token(token)?;
        let changes: SimulationChanges = serde_json::from_str(&json).map_err(|e| {
            error!("Simulation token holds no valid changes: {}", e);
            TraceError::CorruptToken(e.to_string())
        })?;
        info!(token_len = token.len(), asset = %changes.asset.id, "Parsed simulation changes");
        Ok(changes)
    }
}

impl CarbonTree {
    /// Snapshot of all edits below this node, `None` when there are none.
    /// `force` includes the node and its whole subtree regardless.
    pub fn serialize_changes(&self, force: bool) -> Option<SimulationChanges> {
        if !force && !self.has_changes() {
            return None;
        }
        let mut connections = BTreeMap::new();
        for (id, child) in &self.connections {
            let changed = self
                .connection_status
                .get(id)
                .map_or(false, |status| !status.is_original());
            if let Some(snapshot) = child.serialize_changes(force || changed) {
                connections.insert(id.clone(), snapshot);
            }
        }
        let original_connections = if force {
            self.original_connections
                .iter()
                .map(|(id, original)| (id.clone(), original.to_original_record()))
                .collect()
        } else {
            BTreeMap::new()
        };
        Some(SimulationChanges {
            asset: self.asset.clone(),
            entity: self.entity.clone(),
            is_simulation: self.is_simulation,
            connection: self.connection.clone(),
            connections,
            original_connections,
            connection_status: self.connection_status.clone(),
            bulk_count: self.bulk_count,
        })
    }

    /// Token of the edit set; empty when nothing changed.
    pub fn stringify_changes(&self) -> Result<String> {
        self.stringify_changes_with_level(DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn stringify_changes_with_level(&self, level: i32) -> Result<String> {
        match self.serialize_changes(false) {
            Some(changes) => changes.to_token(level),
            None => Ok(String::new()),
        }
    }

    pub fn parse_changes(token: &str) -> Result<SimulationChanges> {
        SimulationChanges::from_token(token)
    }

    /// Replays `changes` onto this node. Snapshots of another asset are
    /// ignored.
    pub(crate) fn apply_changes(&mut self, changes: &SimulationChanges) {
        if changes.asset.id != self.asset.id {
            warn!(
                expected = %self.asset.id,
                found = %changes.asset.id,
                "Simulation changes belong to another asset, skipping"
            );
            return;
        }
        self.asset = changes.asset.clone();
        self.entity = changes.entity.clone();
        self.is_simulation = changes.is_simulation;
        self.connection = changes.connection.clone();
        self.bulk_count = changes.bulk_count;

        let mut rebuilt = Vec::new();
        for (id, status) in &changes.connection_status {
            let removed = match status {
                ConnectionStatus::Deleted => true,
                ConnectionStatus::Swapped { original_id, other_id }
                | ConnectionStatus::Modified { original_id, other_id } => {
                    id == original_id && original_id != other_id
                }
                _ => false,
            };
            if removed {
                self.connections.remove(id);
                continue;
            }
            let materialize = match status {
                ConnectionStatus::Added => true,
                ConnectionStatus::Swapped { other_id, .. } | ConnectionStatus::Modified { other_id, .. } => {
                    id == other_id
                }
                _ => false,
            };
            if !materialize {
                continue;
            }
            match changes.connections.get(id) {
                Some(snapshot) => {
                    let child = self.materialize(snapshot);
                    self.connections.insert(id.clone(), Arc::new(child));
                    rebuilt.push(id.as_str());
                }
                None => warn!(asset = %self.asset.id, child = %id, "No snapshot stored for edited child"),
            }
        }

        for (id, nested) in &changes.connections {
            if rebuilt.contains(&id.as_str()) {
                continue;
            }
            if let Some(child) = self.connections.get_mut(id) {
                Arc::make_mut(child).apply_changes(nested);
            }
        }

        self.connection_status = self.normalized_statuses(&changes.connection_status);
    }

    fn materialize(&self, snapshot: &SimulationChanges) -> CarbonTree {
        let mut child = self.child_from_record(snapshot.baseline_record());
        child.apply_changes(snapshot);
        child.is_simulation = true;
        child
    }

    /// Keeps the statuses consistent with both views; entries that explain
    /// nothing are dropped and baseline ids without an entry are filled in.
    fn normalized_statuses(
        &self,
        statuses: &BTreeMap<String, ConnectionStatus>,
    ) -> BTreeMap<String, ConnectionStatus> {
        let mut normalized = BTreeMap::new();
        for (id, status) in statuses {
            let current = self.connections.contains_key(id);
            let original = self.original_connections.contains_key(id);
            let valid = match status {
                ConnectionStatus::Original => current && original,
                ConnectionStatus::Added => current,
                ConnectionStatus::Deleted => original && !current,
                ConnectionStatus::Swapped { original_id, other_id }
                | ConnectionStatus::Modified { original_id, other_id } => {
                    (id == original_id || id == other_id) && current == (id == other_id)
                }
            };
            if valid {
                normalized.insert(id.clone(), status.clone());
            } else {
                warn!(asset = %self.asset.id, child = %id, status = %status, "Dropping unexplained connection status");
            }
        }
        for id in self.original_connections.keys() {
            if normalized.contains_key(id) {
                continue;
            }
            let status = if self.connections.contains_key(id) {
                ConnectionStatus::Original
            } else {
                ConnectionStatus::Deleted
            };
            normalized.insert(id.clone(), status);
        }
        for id in self.connections.keys() {
            if !normalized.contains_key(id) {
                normalized.insert(id.clone(), ConnectionStatus::Added);
            }
        }
        normalized
    }
}
