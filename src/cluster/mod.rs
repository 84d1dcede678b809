//! Cluster-interface contract and the delegate link used to chain implementations.

mod delegate;
mod interface;
mod types;

pub use delegate::DelegateLink;
pub use interface::{BaseTable, ClusterInterface};
pub use types::{
    Database, Durability, EmergencyRepairMode, SindexConfig, SindexMap, SindexStatus, TableConfigParams, TableReadiness,
    WriteHookConfig,
};
