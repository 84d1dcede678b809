//! Permission records for users at global, database and table scope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ident::{DatabaseId, TableId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,
    /// Only meaningful at global scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<bool>,
}

impl Permissions {
    pub fn all() -> Self {
        Self { read: Some(true), write: Some(true), config: Some(true), connect: Some(true) }
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_none() && self.write.is_none() && self.config.is_none() && self.connect.is_none()
    }

    /// Object of the flags that are set, `null` when none are.
    pub fn to_datum(&self) -> Value {
        if self.is_empty() { return Value::Null; }
        let mut m = Map::new();
        for (k, v) in [("read", self.read), ("write", self.write), ("config", self.config), ("connect", self.connect)] {
            if let Some(b) = v { m.insert(k.to_string(), Value::Bool(b)); }
        }
        Value::Object(m)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePermissions {
    pub database: DatabaseId,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub password_set: bool,
    #[serde(default)]
    pub global: Permissions,
    #[serde(default)]
    pub databases: BTreeMap<DatabaseId, Permissions>,
    #[serde(default)]
    pub tables: BTreeMap<TableId, TablePermissions>,
}

/// Where a grant applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantScope {
    Global,
    Database(DatabaseId),
    Table { database: DatabaseId, table: TableId },
}

impl GrantScope {
    pub fn label(&self) -> &'static str {
        match self {
            GrantScope::Global => "global",
            GrantScope::Database(_) => "database",
            GrantScope::Table { .. } => "table",
        }
    }
}

impl User {
    pub fn permissions(&self, scope: GrantScope) -> Permissions {
        match scope {
            GrantScope::Global => self.global,
            GrantScope::Database(db) => self.databases.get(&db).copied().unwrap_or_default(),
            GrantScope::Table { table, .. } => self.tables.get(&table).map(|t| t.permissions).unwrap_or_default(),
        }
    }

    /// Store `perms` for `scope`. Empty database/table entries are dropped.
    pub fn set_permissions(&mut self, scope: GrantScope, perms: Permissions) {
        match scope {
            GrantScope::Global => self.global = perms,
            GrantScope::Database(db) => {
                if perms.is_empty() { self.databases.remove(&db); } else { self.databases.insert(db, perms); }
            }
            GrantScope::Table { database, table } => {
                if perms.is_empty() {
                    self.tables.remove(&table);
                } else {
                    self.tables.insert(table, TablePermissions { database, permissions: perms });
                }
            }
        }
    }
}

/// The full user/permission state owned by the administration task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMetadata {
    pub admin_user: String,
    pub users: BTreeMap<String, User>,
}

impl AuthMetadata {
    /// Metadata containing only the administrator, with every global permission.
    pub fn with_admin(admin_user: impl Into<String>) -> Self {
        let admin_user = admin_user.into();
        let mut users = BTreeMap::new();
        users.insert(admin_user.clone(), User { password_set: false, global: Permissions::all(), ..User::default() });
        Self { admin_user, users }
    }

    pub fn add_user(&mut self, name: impl Into<String>, password_set: bool) -> &mut User {
        let u = self.users.entry(name.into()).or_default();
        u.password_set = password_set;
        u
    }

    pub fn user(&self, name: &str) -> Option<&User> { self.users.get(name) }
}
