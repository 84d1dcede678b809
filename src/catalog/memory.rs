//! Writable in-memory system table, used for `_debug_scratch`.

use std::collections::BTreeMap;
use std::cmp::Ordering;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::backend::{datum_cmp, rows_to_stream, KeyRange, RowStream, Sorting, TableBackend};
use crate::auth::UserContext;
use crate::error::{AdminError, AdminResult};

/// `Value` ordered by `datum_cmp`, so rows keep primary-key order.
#[derive(Debug, Clone)]
struct Key(Value);

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool { datum_cmp(&self.0, &other.0) == Ordering::Equal }
}
impl Eq for Key {}
impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering { datum_cmp(&self.0, &other.0) }
}

pub struct InMemoryBackend {
    primary_key: String,
    rows: RwLock<BTreeMap<Key, Value>>,
}

impl InMemoryBackend {
    pub fn new() -> Self { Self::with_primary_key("id") }

    pub fn with_primary_key(pk: impl Into<String>) -> Self {
        Self { primary_key: pk.into(), rows: RwLock::new(BTreeMap::new()) }
    }

    pub fn len(&self) -> usize { self.rows.read().len() }

    pub fn is_empty(&self) -> bool { self.rows.read().is_empty() }
}

impl Default for InMemoryBackend {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl TableBackend for InMemoryBackend {
    fn primary_key(&self) -> &str { &self.primary_key }

    async fn read_all_rows_as_stream(
        &self,
        _ctx: &UserContext,
        range: &KeyRange,
        sorting: Sorting,
        cancel: &CancellationToken,
    ) -> AdminResult<RowStream> {
        let rows: Vec<Value> = self.rows.read().values().cloned().collect();
        Ok(rows_to_stream(rows, &self.primary_key, range, sorting, cancel))
    }

    async fn write_row(
        &self,
        _ctx: &UserContext,
        pkey: &Value,
        new_value: Option<Value>,
        cancel: &CancellationToken,
    ) -> AdminResult<()> {
        if cancel.is_cancelled() { return Err(AdminError::interrupted()); }
        match new_value {
            None => {
                self.rows.write().remove(&Key(pkey.clone()));
            }
            Some(row) => {
                if !row.is_object() {
                    return Err(AdminError::invalid(format!("Expected type OBJECT but found {}.", row)));
                }
                match row.get(&self.primary_key) {
                    Some(k) if datum_cmp(k, pkey) == Ordering::Equal => {}
                    _ => {
                        return Err(AdminError::invalid(format!(
                            "Primary key `{}` of the new row must equal {}.",
                            self.primary_key, pkey
                        )));
                    }
                }
                self.rows.write().insert(Key(pkey.clone()), row);
            }
        }
        Ok(())
    }
}
