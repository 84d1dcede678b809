//! `users` and `permissions` system tables, read from the published auth snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use super::backend::{rows_to_stream, KeyRange, RowStream, Sorting, TableBackend};
use super::reserved;
use crate::auth::{AuthView, UserContext};
use crate::error::AdminResult;
use crate::ident::{DatabaseId, IdentifierFormat, TableId};

/// Resolves ids to display names for name-addressed system tables.
pub trait NameResolver: Send + Sync {
    fn database_name(&self, id: &DatabaseId) -> Option<String>;
    fn table_name(&self, id: &TableId) -> Option<String>;
}

/// Fixed id → name maps. Always knows the reserved database.
#[derive(Default)]
pub struct StaticNames {
    databases: RwLock<HashMap<DatabaseId, String>>,
    tables: RwLock<HashMap<TableId, String>>,
}

impl StaticNames {
    pub fn new() -> Self { Self::default() }

    pub fn insert_database(&self, id: DatabaseId, name: impl Into<String>) { self.databases.write().insert(id, name.into()); }

    pub fn insert_table(&self, id: TableId, name: impl Into<String>) { self.tables.write().insert(id, name.into()); }
}

impl NameResolver for StaticNames {
    fn database_name(&self, id: &DatabaseId) -> Option<String> {
        if reserved::is_reserved_id(id) { return Some(reserved::NAME.to_string()); }
        self.databases.read().get(id).cloned()
    }

    fn table_name(&self, id: &TableId) -> Option<String> { self.tables.read().get(id).cloned() }
}

/// One row per user: `{id, password}`.
pub struct UsersBackend {
    view: AuthView,
}

impl UsersBackend {
    pub fn new(view: AuthView) -> Self { Self { view } }
}

#[async_trait]
impl TableBackend for UsersBackend {
    fn primary_key(&self) -> &str { "id" }

    async fn read_all_rows_as_stream(
        &self,
        _ctx: &UserContext,
        range: &KeyRange,
        sorting: Sorting,
        cancel: &CancellationToken,
    ) -> AdminResult<RowStream> {
        let snap = self.view.snapshot();
        let rows = snap
            .users
            .iter()
            .map(|(name, u)| json!({ "id": name, "password": u.password_set }))
            .collect();
        Ok(rows_to_stream(rows, "id", range, sorting, cancel))
    }
}

/// One row per (user, scope) that has any permission set.
pub struct PermissionsBackend {
    view: AuthView,
    format: IdentifierFormat,
    names: Arc<dyn NameResolver>,
}

impl PermissionsBackend {
    pub fn new(view: AuthView, format: IdentifierFormat, names: Arc<dyn NameResolver>) -> Self {
        Self { view, format, names }
    }

    fn database_ref(&self, id: &DatabaseId) -> Value {
        match self.format {
            IdentifierFormat::Uuid => json!(id.to_string()),
            IdentifierFormat::Name => json!(self.names.database_name(id).unwrap_or_else(|| id.to_string())),
        }
    }

    fn table_ref(&self, id: &TableId) -> Value {
        match self.format {
            IdentifierFormat::Uuid => json!(id.to_string()),
            IdentifierFormat::Name => json!(self.names.table_name(id).unwrap_or_else(|| id.to_string())),
        }
    }

    fn rows(&self) -> Vec<Value> {
        let snap = self.view.snapshot();
        let mut out = Vec::new();
        for (user, u) in &snap.users {
            if !u.global.is_empty() {
                out.push(json!({ "id": [user], "user": user, "permissions": u.global.to_datum() }));
            }
            for (db, p) in &u.databases {
                // row ids always carry uuids so they stay stable across renames
                let mut row = Map::new();
                row.insert("id".into(), json!([user, db.to_string()]));
                row.insert("user".into(), json!(user));
                row.insert("database".into(), self.database_ref(db));
                row.insert("permissions".into(), p.to_datum());
                out.push(Value::Object(row));
            }
            for (table, t) in &u.tables {
                out.push(json!({
                    "id": [user, t.database.to_string(), table.to_string()],
                    "user": user,
                    "database": self.database_ref(&t.database),
                    "table": self.table_ref(table),
                    "permissions": t.permissions.to_datum(),
                }));
            }
        }
        out
    }
}

#[async_trait]
impl TableBackend for PermissionsBackend {
    fn primary_key(&self) -> &str { "id" }

    async fn read_all_rows_as_stream(
        &self,
        _ctx: &UserContext,
        range: &KeyRange,
        sorting: Sorting,
        cancel: &CancellationToken,
    ) -> AdminResult<RowStream> {
        Ok(rows_to_stream(self.rows(), "id", range, sorting, cancel))
    }
}
