//! The administrative cluster interface.
//!
//! Every operation takes the caller's `UserContext` first and a cancellation token last,
//! and reports failure as an `AdminError`. The catalog dispatcher implements this trait
//! for callers and consumes it for the real cluster behind it.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::types::{
    Database, Durability, EmergencyRepairMode, SindexConfig, SindexMap, TableConfigParams, TableReadiness,
    WriteHookConfig,
};
use crate::auth::UserContext;
use crate::catalog::{KeyRange, RowStream, Sorting};
use crate::error::AdminResult;
use crate::ident::{DatabaseId, DatabaseName, IdentifierFormat, TableId, TableName};

/// Handle returned by `table_find`.
#[async_trait]
pub trait BaseTable: Send + Sync {
    fn database_id(&self) -> DatabaseId;
    fn name(&self) -> &TableName;
    fn primary_key(&self) -> &str;

    async fn read_all_rows_as_stream(
        &self,
        ctx: &UserContext,
        range: &KeyRange,
        sorting: Sorting,
        cancel: &CancellationToken,
    ) -> AdminResult<RowStream>;

    async fn read_row(&self, ctx: &UserContext, pkey: &Value, cancel: &CancellationToken) -> AdminResult<Option<Value>>;

    async fn write_row(
        &self,
        ctx: &UserContext,
        pkey: &Value,
        new_value: Option<Value>,
        cancel: &CancellationToken,
    ) -> AdminResult<()>;
}

#[async_trait]
pub trait ClusterInterface: Send + Sync {
    async fn db_create(&self, ctx: &UserContext, name: &DatabaseName, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn db_drop(&self, ctx: &UserContext, name: &DatabaseName, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn db_list(&self, ctx: &UserContext, cancel: &CancellationToken) -> AdminResult<BTreeSet<DatabaseName>>;

    async fn db_find(&self, ctx: &UserContext, name: &DatabaseName, cancel: &CancellationToken) -> AdminResult<Arc<Database>>;

    async fn db_config(&self, ctx: &UserContext, db: &Database, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn db_wait(
        &self,
        ctx: &UserContext,
        db: &Database,
        readiness: TableReadiness,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn db_reconfigure(
        &self,
        ctx: &UserContext,
        db: &Database,
        params: &TableConfigParams,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn db_rebalance(&self, ctx: &UserContext, db: &Database, cancel: &CancellationToken) -> AdminResult<Value>;

    #[allow(clippy::too_many_arguments)]
    async fn table_create(
        &self,
        ctx: &UserContext,
        name: &TableName,
        db: &Database,
        params: &TableConfigParams,
        primary_key: &str,
        durability: Durability,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn table_drop(&self, ctx: &UserContext, name: &TableName, db: &Database, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn table_list(&self, ctx: &UserContext, db: &Database, cancel: &CancellationToken) -> AdminResult<BTreeSet<TableName>>;

    async fn table_find(
        &self,
        ctx: &UserContext,
        name: &TableName,
        db: &Database,
        format: Option<IdentifierFormat>,
        cancel: &CancellationToken,
    ) -> AdminResult<Arc<dyn BaseTable>>;

    async fn table_estimate_doc_counts(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        cancel: &CancellationToken,
    ) -> AdminResult<Vec<i64>>;

    async fn table_config(&self, ctx: &UserContext, db: &Database, name: &TableName, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn table_status(&self, ctx: &UserContext, db: &Database, name: &TableName, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn table_wait(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        readiness: TableReadiness,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn table_reconfigure(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        params: &TableConfigParams,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn table_emergency_repair(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        mode: EmergencyRepairMode,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn table_rebalance(&self, ctx: &UserContext, db: &Database, name: &TableName, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn grant_global(
        &self,
        ctx: &UserContext,
        username: String,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn grant_database(
        &self,
        ctx: &UserContext,
        database: DatabaseId,
        username: String,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn grant_table(
        &self,
        ctx: &UserContext,
        database: DatabaseId,
        table: TableId,
        username: String,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value>;

    async fn set_write_hook(
        &self,
        ctx: &UserContext,
        db: &Database,
        table: &TableName,
        config: Option<WriteHookConfig>,
        cancel: &CancellationToken,
    ) -> AdminResult<()>;

    async fn get_write_hook(&self, ctx: &UserContext, db: &Database, table: &TableName, cancel: &CancellationToken) -> AdminResult<Value>;

    async fn sindex_create(
        &self,
        ctx: &UserContext,
        db: &Database,
        table: &TableName,
        name: &str,
        config: &SindexConfig,
        cancel: &CancellationToken,
    ) -> AdminResult<()>;

    async fn sindex_drop(&self, ctx: &UserContext, db: &Database, table: &TableName, name: &str, cancel: &CancellationToken) -> AdminResult<()>;

    #[allow(clippy::too_many_arguments)]
    async fn sindex_rename(
        &self,
        ctx: &UserContext,
        db: &Database,
        table: &TableName,
        name: &str,
        new_name: &str,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<()>;

    async fn sindex_list(&self, ctx: &UserContext, db: &Database, table: &TableName, cancel: &CancellationToken) -> AdminResult<SindexMap>;
}
