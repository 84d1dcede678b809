//! Contract implemented by every system table.
//!
//! A backend produces its rows as a lazy stream of JSON documents. Streams are finite,
//! not restartable, and must stop once the cancellation token passed at creation fires.

use std::cmp::Ordering;
use std::ops::Bound;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::auth::UserContext;
use crate::error::{AdminError, AdminResult, EvalError};

pub type RowStream = BoxStream<'static, Result<Value, EvalError>>;

/// Restriction on primary keys.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyRange {
    Universe,
    Keys(Vec<Value>),
    Between(Bound<Value>, Bound<Value>),
}

impl KeyRange {
    pub fn contains(&self, key: &Value) -> bool {
        match self {
            KeyRange::Universe => true,
            KeyRange::Keys(keys) => keys.iter().any(|k| datum_cmp(k, key) == Ordering::Equal),
            KeyRange::Between(lo, hi) => {
                let above = match lo {
                    Bound::Unbounded => true,
                    Bound::Included(l) => datum_cmp(key, l) != Ordering::Less,
                    Bound::Excluded(l) => datum_cmp(key, l) == Ordering::Greater,
                };
                let below = match hi {
                    Bound::Unbounded => true,
                    Bound::Included(h) => datum_cmp(key, h) != Ordering::Greater,
                    Bound::Excluded(h) => datum_cmp(key, h) == Ordering::Less,
                };
                above && below
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sorting {
    #[default]
    Unordered,
    Ascending,
    Descending,
}

fn type_rank(v: &Value) -> u8 {
    // type names in alphabetical order: ARRAY BOOL NULL NUMBER OBJECT STRING
    match v {
        Value::Array(_) => 0,
        Value::Bool(_) => 1,
        Value::Null => 2,
        Value::Number(_) => 3,
        Value::Object(_) => 4,
        Value::String(_) => 5,
    }
}

/// Total order over datums: by type first, then by value.
pub fn datum_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let o = datum_cmp(l, r);
                if o != Ordering::Equal { return o; }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            // serde_json maps iterate in key order
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let o = lk.cmp(rk).then_with(|| datum_cmp(lv, rv));
                if o != Ordering::Equal { return o; }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Restrict and order an already materialized row set, then stream it under `cancel`.
pub fn rows_to_stream(
    mut rows: Vec<Value>,
    primary_key: &str,
    range: &KeyRange,
    sorting: Sorting,
    cancel: &CancellationToken,
) -> RowStream {
    rows.retain(|row| row.get(primary_key).map(|k| range.contains(k)).unwrap_or(false));
    let key = |row: &Value| row.get(primary_key).cloned().unwrap_or(Value::Null);
    match sorting {
        Sorting::Unordered => {}
        Sorting::Ascending => rows.sort_by(|a, b| datum_cmp(&key(a), &key(b))),
        Sorting::Descending => rows.sort_by(|a, b| datum_cmp(&key(b), &key(a))),
    }
    cancellable(stream::iter(rows.into_iter().map(Ok)).boxed(), cancel.clone())
}

/// Wrap `inner` so that it yields `EvalError::Interrupted` once and ends as soon as
/// `cancel` fires.
pub fn cancellable(inner: RowStream, cancel: CancellationToken) -> RowStream {
    stream::unfold(Some((inner, cancel)), |state| async move {
        let (mut inner, cancel) = state?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Some((Err(EvalError::Interrupted), None)),
            item = inner.next() => item.map(|i| (i, Some((inner, cancel)))),
        }
    })
    .boxed()
}

#[async_trait]
pub trait TableBackend: Send + Sync {
    fn primary_key(&self) -> &str;

    async fn read_all_rows_as_stream(
        &self,
        ctx: &UserContext,
        range: &KeyRange,
        sorting: Sorting,
        cancel: &CancellationToken,
    ) -> AdminResult<RowStream>;

    async fn read_row(&self, ctx: &UserContext, pkey: &Value, cancel: &CancellationToken) -> AdminResult<Option<Value>> {
        let mut rows = self
            .read_all_rows_as_stream(ctx, &KeyRange::Keys(vec![pkey.clone()]), Sorting::Unordered, cancel)
            .await?;
        match rows.next().await {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// `new_value == None` deletes the row. Read-only by default.
    async fn write_row(
        &self,
        _ctx: &UserContext,
        _pkey: &Value,
        _new_value: Option<Value>,
        _cancel: &CancellationToken,
    ) -> AdminResult<()> {
        Err(AdminError::rejected("This system table is read-only."))
    }
}
