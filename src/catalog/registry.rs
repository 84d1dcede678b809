//! Name → backend registry for the system tables.
//!
//! Entries are only added through `BackendRegistry::register`, which hands back a
//! `Registration` guard; dropping the guard removes exactly that entry. Reads take a
//! shared lock, so lookups of different tables never wait on each other.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::backend::TableBackend;
use crate::ident::{IdentifierFormat, TableName};

/// The two backends answering for one logical table. A table without a distinct
/// uuid-addressed form uses the same instance in both slots.
#[derive(Clone)]
pub struct BackendEntry {
    by_name: Arc<dyn TableBackend>,
    by_uuid: Arc<dyn TableBackend>,
}

impl BackendEntry {
    pub fn new(by_name: Arc<dyn TableBackend>, by_uuid: Arc<dyn TableBackend>) -> Self { Self { by_name, by_uuid } }

    pub fn shared(backend: Arc<dyn TableBackend>) -> Self {
        Self { by_name: Arc::clone(&backend), by_uuid: backend }
    }

    pub fn get(&self, format: IdentifierFormat) -> &Arc<dyn TableBackend> {
        match format {
            IdentifierFormat::Name => &self.by_name,
            IdentifierFormat::Uuid => &self.by_uuid,
        }
    }

    pub fn is_shared(&self) -> bool { Arc::ptr_eq(&self.by_name, &self.by_uuid) }
}

impl fmt::Debug for BackendEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendEntry").field("shared", &self.is_shared()).finish()
    }
}

struct Slot {
    serial: u64,
    entry: BackendEntry,
}

#[derive(Default)]
pub struct BackendRegistry {
    tables: RwLock<BTreeMap<TableName, Slot>>,
    next_serial: AtomicU64,
}

impl BackendRegistry {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    /// Register `name`. The entry lives exactly as long as the returned guard.
    ///
    /// Panics if `name` is already registered: two owners for one table means the
    /// wiring is broken.
    pub fn register(
        self: &Arc<Self>,
        name: TableName,
        by_name: Arc<dyn TableBackend>,
        by_uuid: Arc<dyn TableBackend>,
    ) -> Registration {
        self.register_entry(name, BackendEntry::new(by_name, by_uuid))
    }

    pub fn register_shared(self: &Arc<Self>, name: TableName, backend: Arc<dyn TableBackend>) -> Registration {
        self.register_entry(name, BackendEntry::shared(backend))
    }

    pub fn register_entry(self: &Arc<Self>, name: TableName, entry: BackendEntry) -> Registration {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        {
            let mut tables = self.tables.write();
            assert!(!tables.contains_key(&name), "system table `{}` registered twice", name);
            tables.insert(name.clone(), Slot { serial, entry });
        }
        info!(target: "syscat::catalog", table = %name, "system table registered");
        Registration { registry: Arc::clone(self), name, serial }
    }

    pub fn lookup(&self, name: &TableName, format: IdentifierFormat) -> Option<Arc<dyn TableBackend>> {
        self.tables.read().get(name).map(|s| Arc::clone(s.entry.get(format)))
    }

    pub fn entry(&self, name: &TableName) -> Option<BackendEntry> {
        self.tables.read().get(name).map(|s| s.entry.clone())
    }

    pub fn contains(&self, name: &TableName) -> bool { self.tables.read().contains_key(name) }

    /// Every registration in lexical name order, hidden tables included.
    pub fn snapshot(&self) -> Vec<(TableName, BackendEntry)> {
        self.tables.read().iter().map(|(k, s)| (k.clone(), s.entry.clone())).collect()
    }

    /// Names shown by default listings: everything not starting with `_`.
    pub fn visible_names(&self) -> Vec<TableName> {
        self.tables.read().keys().filter(|n| !n.is_hidden()).cloned().collect()
    }

    pub fn len(&self) -> usize { self.tables.read().len() }

    pub fn is_empty(&self) -> bool { self.tables.read().is_empty() }

    fn deregister(&self, name: &TableName, serial: u64) {
        let mut tables = self.tables.write();
        if tables.get(name).map(|s| s.serial) == Some(serial) {
            tables.remove(name);
            drop(tables);
            info!(target: "syscat::catalog", table = %name, "system table deregistered");
        }
    }
}

/// Owns one registry entry and removes it on drop.
#[must_use = "dropping a Registration immediately deregisters the table"]
pub struct Registration {
    registry: Arc<BackendRegistry>,
    name: TableName,
    serial: u64,
}

impl Registration {
    pub fn name(&self) -> &TableName { &self.name }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").field("name", &self.name).field("serial", &self.serial).finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) { self.registry.deregister(&self.name, self.serial); }
}
