use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::backend::{KeyRange, RowStream, Sorting, TableBackend};
use super::reserved;
use crate::auth::UserContext;
use crate::cluster::BaseTable;
use crate::error::AdminResult;
use crate::ident::{DatabaseId, TableName};

/// A table in the reserved database, bound to one backend.
pub struct SystemTable {
    name: TableName,
    backend: Arc<dyn TableBackend>,
}

impl SystemTable {
    pub fn new(name: TableName, backend: Arc<dyn TableBackend>) -> Self { Self { name, backend } }
}

#[async_trait]
impl BaseTable for SystemTable {
    fn database_id(&self) -> DatabaseId { reserved::id() }

    fn name(&self) -> &TableName { &self.name }

    fn primary_key(&self) -> &str { self.backend.primary_key() }

    async fn read_all_rows_as_stream(
        &self,
        ctx: &UserContext,
        range: &KeyRange,
        sorting: Sorting,
        cancel: &CancellationToken,
    ) -> AdminResult<RowStream> {
        self.backend.read_all_rows_as_stream(ctx, range, sorting, cancel).await
    }

    async fn read_row(&self, ctx: &UserContext, pkey: &Value, cancel: &CancellationToken) -> AdminResult<Option<Value>> {
        self.backend.read_row(ctx, pkey, cancel).await
    }

    async fn write_row(
        &self,
        ctx: &UserContext,
        pkey: &Value,
        new_value: Option<Value>,
        cancel: &CancellationToken,
    ) -> AdminResult<()> {
        self.backend
            .write_row(ctx, pkey, new_value, cancel)
            .await
            .map_err(|e| e.with_context(&format!("Writing to `{}.{}`: ", reserved::NAME, self.name)))
    }
}
