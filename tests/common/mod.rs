//! Shared fixtures: a delegate that records what reached it, plus small backends.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use syscat::auth::{AuthMetadata, PermissionGrantRouter, UserContext};
use syscat::catalog::auth_tables::StaticNames;
use syscat::catalog::backend::cancellable;
use syscat::catalog::wiring::SystemBackends;
use syscat::catalog::{BackendRegistry, KeyRange, RowStream, Sorting, StreamEvaluator, TableBackend};
use syscat::cluster::{
    BaseTable, ClusterInterface, Database, Durability, EmergencyRepairMode, SindexConfig, SindexMap, TableConfigParams,
    TableReadiness, WriteHookConfig,
};
use syscat::config::CatalogSettings;
use syscat::error::{AdminError, AdminResult, EvalError};
use syscat::ident::{DatabaseId, DatabaseName, IdentifierFormat, TableId, TableName};
use syscat::CatalogDispatcher;

pub const USER_DB: &str = "test";

/// Cluster interface that answers everything trivially and records each call.
#[derive(Default)]
pub struct RecordingCluster {
    calls: Mutex<Vec<&'static str>>,
    extra_databases: Mutex<Vec<DatabaseName>>,
}

impl RecordingCluster {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn calls(&self) -> Vec<&'static str> { self.calls.lock().clone() }

    /// Make `db_list` report `name` alongside the default database.
    pub fn also_list(&self, name: &str) { self.extra_databases.lock().push(DatabaseName::guarantee_valid(name)); }

    fn hit(&self, op: &'static str) -> AdminResult<Value> {
        self.calls.lock().push(op);
        Ok(json!({ "forwarded": op }))
    }
}

#[async_trait]
impl ClusterInterface for RecordingCluster {
    async fn db_create(&self, _: &UserContext, _: &DatabaseName, _: &CancellationToken) -> AdminResult<Value> { self.hit("db_create") }

    async fn db_drop(&self, _: &UserContext, _: &DatabaseName, _: &CancellationToken) -> AdminResult<Value> { self.hit("db_drop") }

    async fn db_list(&self, _: &UserContext, _: &CancellationToken) -> AdminResult<BTreeSet<DatabaseName>> {
        self.hit("db_list")?;
        let mut names: BTreeSet<DatabaseName> = self.extra_databases.lock().iter().cloned().collect();
        names.insert(DatabaseName::guarantee_valid(USER_DB));
        Ok(names)
    }

    async fn db_find(&self, _: &UserContext, name: &DatabaseName, _: &CancellationToken) -> AdminResult<Arc<Database>> {
        self.hit("db_find")?;
        Ok(Arc::new(Database::new(Uuid::new_v4(), name.clone())))
    }

    async fn db_config(&self, _: &UserContext, _: &Database, _: &CancellationToken) -> AdminResult<Value> { self.hit("db_config") }

    async fn db_wait(&self, _: &UserContext, _: &Database, _: TableReadiness, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("db_wait")
    }

    async fn db_reconfigure(
        &self,
        _: &UserContext,
        _: &Database,
        _: &TableConfigParams,
        _: bool,
        _: &CancellationToken,
    ) -> AdminResult<Value> {
        self.hit("db_reconfigure")
    }

    async fn db_rebalance(&self, _: &UserContext, _: &Database, _: &CancellationToken) -> AdminResult<Value> { self.hit("db_rebalance") }

    async fn table_create(
        &self,
        _: &UserContext,
        _: &TableName,
        _: &Database,
        _: &TableConfigParams,
        _: &str,
        _: Durability,
        _: &CancellationToken,
    ) -> AdminResult<Value> {
        self.hit("table_create")
    }

    async fn table_drop(&self, _: &UserContext, _: &TableName, _: &Database, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("table_drop")
    }

    async fn table_list(&self, _: &UserContext, _: &Database, _: &CancellationToken) -> AdminResult<BTreeSet<TableName>> {
        self.hit("table_list")?;
        Ok([TableName::guarantee_valid("events")].into_iter().collect())
    }

    async fn table_find(
        &self,
        _: &UserContext,
        name: &TableName,
        db: &Database,
        _: Option<IdentifierFormat>,
        _: &CancellationToken,
    ) -> AdminResult<Arc<dyn BaseTable>> {
        self.hit("table_find")?;
        Err(AdminError::not_found(format!("Table `{}.{}` does not exist.", db.name, name)))
    }

    async fn table_estimate_doc_counts(&self, _: &UserContext, _: &Database, _: &TableName, _: &CancellationToken) -> AdminResult<Vec<i64>> {
        self.hit("table_estimate_doc_counts")?;
        Ok(vec![7, 5])
    }

    async fn table_config(&self, _: &UserContext, _: &Database, _: &TableName, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("table_config")
    }

    async fn table_status(&self, _: &UserContext, _: &Database, _: &TableName, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("table_status")
    }

    async fn table_wait(&self, _: &UserContext, _: &Database, _: &TableName, _: TableReadiness, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("table_wait")
    }

    async fn table_reconfigure(
        &self,
        _: &UserContext,
        _: &Database,
        _: &TableName,
        _: &TableConfigParams,
        _: bool,
        _: &CancellationToken,
    ) -> AdminResult<Value> {
        self.hit("table_reconfigure")
    }

    async fn table_emergency_repair(
        &self,
        _: &UserContext,
        _: &Database,
        _: &TableName,
        _: EmergencyRepairMode,
        _: bool,
        _: &CancellationToken,
    ) -> AdminResult<Value> {
        self.hit("table_emergency_repair")
    }

    async fn table_rebalance(&self, _: &UserContext, _: &Database, _: &TableName, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("table_rebalance")
    }

    async fn grant_global(&self, _: &UserContext, _: String, _: Value, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("grant_global")
    }

    async fn grant_database(&self, _: &UserContext, _: DatabaseId, _: String, _: Value, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("grant_database")
    }

    async fn grant_table(
        &self,
        _: &UserContext,
        _: DatabaseId,
        _: TableId,
        _: String,
        _: Value,
        _: &CancellationToken,
    ) -> AdminResult<Value> {
        self.hit("grant_table")
    }

    async fn set_write_hook(
        &self,
        _: &UserContext,
        _: &Database,
        _: &TableName,
        _: Option<WriteHookConfig>,
        _: &CancellationToken,
    ) -> AdminResult<()> {
        self.hit("set_write_hook").map(|_| ())
    }

    async fn get_write_hook(&self, _: &UserContext, _: &Database, _: &TableName, _: &CancellationToken) -> AdminResult<Value> {
        self.hit("get_write_hook")
    }

    async fn sindex_create(
        &self,
        _: &UserContext,
        _: &Database,
        _: &TableName,
        _: &str,
        _: &SindexConfig,
        _: &CancellationToken,
    ) -> AdminResult<()> {
        self.hit("sindex_create").map(|_| ())
    }

    async fn sindex_drop(&self, _: &UserContext, _: &Database, _: &TableName, _: &str, _: &CancellationToken) -> AdminResult<()> {
        self.hit("sindex_drop").map(|_| ())
    }

    async fn sindex_rename(
        &self,
        _: &UserContext,
        _: &Database,
        _: &TableName,
        _: &str,
        _: &str,
        _: bool,
        _: &CancellationToken,
    ) -> AdminResult<()> {
        self.hit("sindex_rename").map(|_| ())
    }

    async fn sindex_list(&self, _: &UserContext, _: &Database, _: &TableName, _: &CancellationToken) -> AdminResult<SindexMap> {
        self.hit("sindex_list")?;
        Ok(SindexMap::new())
    }
}

/// Backend whose stream is empty.
pub struct EmptyBackend;

#[async_trait]
impl TableBackend for EmptyBackend {
    fn primary_key(&self) -> &str { "id" }

    async fn read_all_rows_as_stream(&self, _: &UserContext, _: &KeyRange, _: Sorting, cancel: &CancellationToken) -> AdminResult<RowStream> {
        Ok(cancellable(stream::empty().boxed(), cancel.clone()))
    }
}

/// Backend that refuses to produce rows at all.
pub struct FailingBackend;

#[async_trait]
impl TableBackend for FailingBackend {
    fn primary_key(&self) -> &str { "id" }

    async fn read_all_rows_as_stream(&self, _: &UserContext, _: &KeyRange, _: Sorting, _: &CancellationToken) -> AdminResult<RowStream> {
        Err(AdminError::evaluation("backend offline"))
    }
}

/// Backend whose stream fails after its first row.
pub struct BrokenStreamBackend;

#[async_trait]
impl TableBackend for BrokenStreamBackend {
    fn primary_key(&self) -> &str { "id" }

    async fn read_all_rows_as_stream(&self, _: &UserContext, _: &KeyRange, _: Sorting, cancel: &CancellationToken) -> AdminResult<RowStream> {
        let rows = vec![Ok(json!({"id": 1})), Err(EvalError::Internal("row decode failed".into()))];
        Ok(cancellable(stream::iter(rows).boxed(), cancel.clone()))
    }
}

/// Backend with an unbounded, slowly produced stream.
pub struct EndlessBackend;

#[async_trait]
impl TableBackend for EndlessBackend {
    fn primary_key(&self) -> &str { "id" }

    async fn read_all_rows_as_stream(&self, _: &UserContext, _: &KeyRange, _: Sorting, cancel: &CancellationToken) -> AdminResult<RowStream> {
        let rows = stream::unfold(0u64, |i| async move {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            Some((Ok(json!({ "id": i })), i + 1))
        });
        Ok(cancellable(rows.boxed(), cancel.clone()))
    }
}

/// A fully wired dispatcher: built-in tables, a running admin task, and optionally a
/// recording delegate behind it.
pub struct Harness {
    pub dispatcher: CatalogDispatcher,
    pub delegate: Arc<RecordingCluster>,
    pub backends: SystemBackends,
    pub router: PermissionGrantRouter,
}

pub fn settings() -> CatalogSettings {
    CatalogSettings::from_lookup(|_| None)
}

/// Initial auth metadata: the admin plus `bob`, who has no permissions yet.
pub fn initial_auth() -> AuthMetadata {
    let mut m = AuthMetadata::with_admin("admin");
    m.add_user("bob", true);
    m
}

pub fn harness_without_delegate() -> Harness {
    let settings = settings();
    let (router, _task) = PermissionGrantRouter::spawn(initial_auth(), &settings);
    let registry = BackendRegistry::new();
    let backends = SystemBackends::install(&registry, router.view(), Arc::new(StaticNames::new()), &settings);
    let dispatcher = CatalogDispatcher::new(registry, router.clone(), Arc::new(StreamEvaluator));
    Harness { dispatcher, delegate: RecordingCluster::new(), backends, router }
}

pub fn harness() -> Harness {
    let h = harness_without_delegate();
    h.dispatcher.set_next(h.delegate.clone());
    h
}

pub fn user_db() -> Database { Database::new(Uuid::new_v4(), DatabaseName::guarantee_valid(USER_DB)) }

pub fn table(name: &str) -> TableName { TableName::guarantee_valid(name) }

pub fn admin() -> UserContext { UserContext::user("admin") }

pub async fn drain(stream: RowStream) -> Vec<Result<Value, EvalError>> { stream.collect().await }
