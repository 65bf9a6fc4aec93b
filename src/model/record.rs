//! Input Records
//!
//! The plain nested record an external loader assembles from shell and
//! submodel data. A `CarbonTree` is always built from one of these.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::footprint::CarbonFootprint;
use crate::error::{Result, TraceError};

/// Display metadata of a structural node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default)]
    pub id_short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BasicInfo {
    pub fn new(id_short: impl Into<String>) -> Self {
        Self {
            id_short: id_short.into(),
            ..Default::default()
        }
    }
}

/// How a node attaches to its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    #[serde(default)]
    pub id_short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Units of the child built into the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_count: Option<f64>,
}

impl ConnectionInfo {
    pub fn with_bulk_count(bulk_count: f64) -> Self {
        Self {
            bulk_count: Some(bulk_count),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    /// Global asset id, unique per asset and used as connection key.
    pub id: String,
    #[serde(default)]
    pub id_short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<CarbonFootprint>,
}

impl AssetInfo {
    pub fn new(id: impl Into<String>, footprint: Option<CarbonFootprint>) -> Self {
        let id = id.into();
        Self {
            id_short: id.rsplit('/').next().unwrap_or_default().to_string(),
            id,
            footprint,
            ..Default::default()
        }
    }
}

/// One node of the plain hierarchy together with its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonTreeRecord {
    pub asset: AssetInfo,
    pub entity: BasicInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionInfo>,
    /// Children keyed by their asset id.
    pub connections: BTreeMap<String, CarbonTreeRecord>,
}

impl CarbonTreeRecord {
    pub fn new(asset: AssetInfo, entity: BasicInfo) -> Self {
        Self {
            asset,
            entity,
            connection: None,
            connections: BTreeMap::new(),
        }
    }

    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn with_child(mut self, child: CarbonTreeRecord) -> Self {
        self.connections.insert(child.asset.id.clone(), child);
        self
    }

    /// Parses a record; a missing `entity` or `connections` is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TraceError::MalformedRecord(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| TraceError::MalformedRecord(e.to_string()))
    }
}
