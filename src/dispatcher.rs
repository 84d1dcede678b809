//!
//! Catalog dispatcher
//! ------------------
//! Implements the cluster interface on top of another one. Operations that target the
//! reserved `system` database are answered here: from the backend registry, through the
//! permission grant router, or with a rejection. Everything else is forwarded unchanged
//! to the delegate, which must have been set with `set_next`.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::auth::{GrantScope, PermissionGrantRouter, UserContext};
use crate::catalog::{estimate_doc_count, reserved, BackendRegistry, QueryEvaluator, SystemTable};
use crate::cluster::{
    BaseTable, ClusterInterface, Database, DelegateLink, Durability, EmergencyRepairMode, SindexConfig, SindexMap,
    TableConfigParams, TableReadiness, WriteHookConfig,
};
use crate::error::{AdminError, AdminResult};
use crate::ident::{DatabaseId, DatabaseName, IdentifierFormat, TableId, TableName};

fn special(op: &'static str) {
    debug!(target: "syscat::dispatch", op, db = reserved::NAME, "answered by system catalog");
}

fn reject<T>(op: &'static str, message: String) -> AdminResult<T> {
    debug!(target: "syscat::dispatch", op, db = reserved::NAME, "rejected");
    Err(AdminError::rejected(message))
}

fn is_special_msg(what: &str) -> String {
    format!("Database `{}` is special; {}", reserved::NAME, what)
}

fn table_missing(name: &TableName) -> AdminError {
    AdminError::not_found(format!("Table `{}.{}` does not exist.", reserved::NAME, name))
}

fn index_missing(index: &str, table: &TableName) -> AdminError {
    AdminError::not_found(format!("Index `{}` does not exist on table `{}.{}`.", index, reserved::NAME, table))
}

pub struct CatalogDispatcher {
    registry: Arc<BackendRegistry>,
    grants: PermissionGrantRouter,
    evaluator: Arc<dyn QueryEvaluator>,
    next: DelegateLink,
}

impl CatalogDispatcher {
    pub fn new(registry: Arc<BackendRegistry>, grants: PermissionGrantRouter, evaluator: Arc<dyn QueryEvaluator>) -> Self {
        Self { registry, grants, evaluator, next: DelegateLink::new() }
    }

    /// Wire the real cluster interface. May only be called once.
    pub fn set_next(&self, next: Arc<dyn ClusterInterface>) { self.next.set(next); }

    pub fn has_next(&self) -> bool { self.next.is_set() }

    pub fn registry(&self) -> &Arc<BackendRegistry> { &self.registry }

    pub fn grants(&self) -> &PermissionGrantRouter { &self.grants }

    fn forward(&self, op: &'static str) -> AdminResult<&Arc<dyn ClusterInterface>> {
        let next = self.next.get()?;
        debug!(target: "syscat::dispatch", op, "forwarding to cluster interface");
        Ok(next)
    }
}

#[async_trait]
impl ClusterInterface for CatalogDispatcher {
    async fn db_create(&self, ctx: &UserContext, name: &DatabaseName, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved_name(name) {
            return reject("db_create", format!("Database `{}` already exists.", reserved::NAME));
        }
        self.forward("db_create")?.db_create(ctx, name, cancel).await
    }

    async fn db_drop(&self, ctx: &UserContext, name: &DatabaseName, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved_name(name) {
            return reject("db_drop", is_special_msg("you can't delete it."));
        }
        self.forward("db_drop")?.db_drop(ctx, name, cancel).await
    }

    async fn db_list(&self, ctx: &UserContext, cancel: &CancellationToken) -> AdminResult<BTreeSet<DatabaseName>> {
        let mut names = self.forward("db_list")?.db_list(ctx, cancel).await?;
        assert!(
            !names.contains(reserved::name()),
            "cluster interface already lists the reserved database `{}`",
            reserved::NAME
        );
        names.insert(reserved::name().clone());
        Ok(names)
    }

    async fn db_find(&self, ctx: &UserContext, name: &DatabaseName, cancel: &CancellationToken) -> AdminResult<Arc<Database>> {
        if reserved::is_reserved_name(name) {
            special("db_find");
            return Ok(reserved::database());
        }
        self.forward("db_find")?.db_find(ctx, name, cancel).await
    }

    async fn db_config(&self, ctx: &UserContext, db: &Database, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("db_config", is_special_msg("you can't configure it."));
        }
        self.forward("db_config")?.db_config(ctx, db, cancel).await
    }

    async fn db_wait(
        &self,
        ctx: &UserContext,
        db: &Database,
        readiness: TableReadiness,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject(
                "db_wait",
                is_special_msg("the system tables in it are always available and don't need to be waited on."),
            );
        }
        self.forward("db_wait")?.db_wait(ctx, db, readiness, cancel).await
    }

    async fn db_reconfigure(
        &self,
        ctx: &UserContext,
        db: &Database,
        params: &TableConfigParams,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("db_reconfigure", is_special_msg("you can't configure the tables in it."));
        }
        self.forward("db_reconfigure")?.db_reconfigure(ctx, db, params, dry_run, cancel).await
    }

    async fn db_rebalance(&self, ctx: &UserContext, db: &Database, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("db_rebalance", is_special_msg("you can't rebalance the tables in it."));
        }
        self.forward("db_rebalance")?.db_rebalance(ctx, db, cancel).await
    }

    async fn table_create(
        &self,
        ctx: &UserContext,
        name: &TableName,
        db: &Database,
        params: &TableConfigParams,
        primary_key: &str,
        durability: Durability,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("table_create", is_special_msg("you can't create new tables in it."));
        }
        self.forward("table_create")?
            .table_create(ctx, name, db, params, primary_key, durability, cancel)
            .await
    }

    async fn table_drop(&self, ctx: &UserContext, name: &TableName, db: &Database, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("table_drop", is_special_msg("you can't drop tables in it."));
        }
        self.forward("table_drop")?.table_drop(ctx, name, db, cancel).await
    }

    async fn table_list(&self, ctx: &UserContext, db: &Database, cancel: &CancellationToken) -> AdminResult<BTreeSet<TableName>> {
        if reserved::is_reserved(db) {
            special("table_list");
            return Ok(self.registry.visible_names().into_iter().collect());
        }
        self.forward("table_list")?.table_list(ctx, db, cancel).await
    }

    async fn table_find(
        &self,
        ctx: &UserContext,
        name: &TableName,
        db: &Database,
        format: Option<IdentifierFormat>,
        cancel: &CancellationToken,
    ) -> AdminResult<Arc<dyn BaseTable>> {
        if reserved::is_reserved(db) {
            special("table_find");
            let backend = self.registry.lookup(name, format.unwrap_or_default()).ok_or_else(|| table_missing(name))?;
            return Ok(Arc::new(SystemTable::new(name.clone(), backend)));
        }
        self.forward("table_find")?.table_find(ctx, name, db, format, cancel).await
    }

    async fn table_estimate_doc_counts(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        cancel: &CancellationToken,
    ) -> AdminResult<Vec<i64>> {
        if reserved::is_reserved(db) {
            special("table_estimate_doc_counts");
            let entry = self.registry.entry(name).ok_or_else(|| table_missing(name))?;
            return estimate_doc_count(&entry, self.evaluator.as_ref(), ctx, cancel).await;
        }
        self.forward("table_estimate_doc_counts")?
            .table_estimate_doc_counts(ctx, db, name, cancel)
            .await
    }

    async fn table_config(&self, ctx: &UserContext, db: &Database, name: &TableName, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("table_config", is_special_msg("you can't configure the tables in it."));
        }
        self.forward("table_config")?.table_config(ctx, db, name, cancel).await
    }

    async fn table_status(&self, ctx: &UserContext, db: &Database, name: &TableName, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject(
                "table_status",
                is_special_msg("the system tables in it don't have meaningful status information."),
            );
        }
        self.forward("table_status")?.table_status(ctx, db, name, cancel).await
    }

    async fn table_wait(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        readiness: TableReadiness,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject(
                "table_wait",
                is_special_msg("the system tables in it are always available and don't need to be waited on."),
            );
        }
        self.forward("table_wait")?.table_wait(ctx, db, name, readiness, cancel).await
    }

    async fn table_reconfigure(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        params: &TableConfigParams,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("table_reconfigure", is_special_msg("you can't configure the tables in it."));
        }
        self.forward("table_reconfigure")?
            .table_reconfigure(ctx, db, name, params, dry_run, cancel)
            .await
    }

    async fn table_emergency_repair(
        &self,
        ctx: &UserContext,
        db: &Database,
        name: &TableName,
        mode: EmergencyRepairMode,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("table_emergency_repair", is_special_msg("you can't configure the tables in it."));
        }
        self.forward("table_emergency_repair")?
            .table_emergency_repair(ctx, db, name, mode, dry_run, cancel)
            .await
    }

    async fn table_rebalance(&self, ctx: &UserContext, db: &Database, name: &TableName, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            return reject("table_rebalance", is_special_msg("you can't rebalance the tables in it."));
        }
        self.forward("table_rebalance")?.table_rebalance(ctx, db, name, cancel).await
    }

    async fn grant_global(
        &self,
        ctx: &UserContext,
        username: String,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        self.forward("grant_global")?.grant_global(ctx, username, permissions, cancel).await
    }

    async fn grant_database(
        &self,
        ctx: &UserContext,
        database: DatabaseId,
        username: String,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved_id(&database) {
            special("grant_database");
            return self.grants.grant(ctx, username, GrantScope::Database(database), permissions, cancel).await;
        }
        self.forward("grant_database")?
            .grant_database(ctx, database, username, permissions, cancel)
            .await
    }

    async fn grant_table(
        &self,
        ctx: &UserContext,
        database: DatabaseId,
        table: TableId,
        username: String,
        permissions: Value,
        cancel: &CancellationToken,
    ) -> AdminResult<Value> {
        if reserved::is_reserved_id(&database) {
            special("grant_table");
            return self
                .grants
                .grant(ctx, username, GrantScope::Table { database, table }, permissions, cancel)
                .await;
        }
        self.forward("grant_table")?
            .grant_table(ctx, database, table, username, permissions, cancel)
            .await
    }

    async fn set_write_hook(
        &self,
        ctx: &UserContext,
        db: &Database,
        table: &TableName,
        config: Option<WriteHookConfig>,
        cancel: &CancellationToken,
    ) -> AdminResult<()> {
        if reserved::is_reserved(db) {
            return reject("set_write_hook", is_special_msg("you can't set a write hook on the tables in it."));
        }
        self.forward("set_write_hook")?.set_write_hook(ctx, db, table, config, cancel).await
    }

    async fn get_write_hook(&self, ctx: &UserContext, db: &Database, table: &TableName, cancel: &CancellationToken) -> AdminResult<Value> {
        if reserved::is_reserved(db) {
            special("get_write_hook");
            return Ok(Value::Null);
        }
        self.forward("get_write_hook")?.get_write_hook(ctx, db, table, cancel).await
    }

    async fn sindex_create(
        &self,
        ctx: &UserContext,
        db: &Database,
        table: &TableName,
        name: &str,
        config: &SindexConfig,
        cancel: &CancellationToken,
    ) -> AdminResult<()> {
        if reserved::is_reserved(db) {
            return reject("sindex_create", is_special_msg("you can't create secondary indexes on the tables in it."));
        }
        self.forward("sindex_create")?.sindex_create(ctx, db, table, name, config, cancel).await
    }

    async fn sindex_drop(&self, ctx: &UserContext, db: &Database, table: &TableName, name: &str, cancel: &CancellationToken) -> AdminResult<()> {
        if reserved::is_reserved(db) {
            special("sindex_drop");
            return Err(index_missing(name, table));
        }
        self.forward("sindex_drop")?.sindex_drop(ctx, db, table, name, cancel).await
    }

    async fn sindex_rename(
        &self,
        ctx: &UserContext,
        db: &Database,
        table: &TableName,
        name: &str,
        new_name: &str,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> AdminResult<()> {
        if reserved::is_reserved(db) {
            special("sindex_rename");
            return Err(index_missing(name, table));
        }
        self.forward("sindex_rename")?
            .sindex_rename(ctx, db, table, name, new_name, overwrite, cancel)
            .await
    }

    async fn sindex_list(&self, ctx: &UserContext, db: &Database, table: &TableName, cancel: &CancellationToken) -> AdminResult<SindexMap> {
        if reserved::is_reserved(db) {
            special("sindex_list");
            return Ok(SindexMap::new());
        }
        self.forward("sindex_list")?.sindex_list(ctx, db, table, cancel).await
    }
}
