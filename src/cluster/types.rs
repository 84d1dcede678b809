//! Value types passed through the cluster interface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::{DatabaseId, DatabaseName};

/// A resolved database: stable id plus current name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    pub name: DatabaseName,
}

impl Database {
    pub fn new(id: DatabaseId, name: DatabaseName) -> Self { Self { id, name } }
}

/// Sharding/replication request for table creation and reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfigParams {
    pub num_shards: u32,
    /// Replica count per server tag.
    pub num_replicas: BTreeMap<String, u32>,
    pub primary_replica_tag: String,
    #[serde(default)]
    pub nonvoting_replica_tags: Vec<String>,
}

impl Default for TableConfigParams {
    fn default() -> Self {
        let mut num_replicas = BTreeMap::new();
        num_replicas.insert("default".to_string(), 1);
        Self {
            num_shards: 1,
            num_replicas,
            primary_replica_tag: "default".to_string(),
            nonvoting_replica_tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    #[default]
    Hard,
    Soft,
}

/// Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableReadiness {
    OutdatedReads,
    Reads,
    Writes,
    #[default]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyRepairMode {
    UnsafeRollback,
    UnsafeRollbackOrErase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SindexConfig {
    /// Serialized index function, opaque to this layer.
    pub function: String,
    #[serde(default)]
    pub multi: bool,
    #[serde(default)]
    pub geo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SindexStatus {
    pub ready: bool,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub outdated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteHookConfig {
    /// Serialized hook function, opaque to this layer.
    pub function: String,
}

pub type SindexMap = BTreeMap<String, (SindexConfig, SindexStatus)>;
