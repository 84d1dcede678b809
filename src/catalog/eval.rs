//! Terminal aggregates over row streams and the doc-count estimate built on them.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::backend::{KeyRange, RowStream, Sorting};
use super::registry::BackendEntry;
use crate::auth::UserContext;
use crate::error::{AdminError, AdminResult, EvalError};
use crate::ident::IdentifierFormat;

pub const DOC_COUNT_CONTEXT: &str = "When estimating doc count: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAggregate {
    Count,
}

/// The query-evaluation collaborator: reduces a row stream to a single value.
#[async_trait]
pub trait QueryEvaluator: Send + Sync {
    async fn run_terminal(
        &self,
        stream: RowStream,
        aggregate: TerminalAggregate,
        cancel: &CancellationToken,
    ) -> Result<Value, EvalError>;
}

/// Evaluator that drains the stream itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamEvaluator;

#[async_trait]
impl QueryEvaluator for StreamEvaluator {
    async fn run_terminal(
        &self,
        mut stream: RowStream,
        aggregate: TerminalAggregate,
        cancel: &CancellationToken,
    ) -> Result<Value, EvalError> {
        match aggregate {
            TerminalAggregate::Count => {
                let mut n: i64 = 0;
                loop {
                    let item = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(EvalError::Interrupted),
                        item = stream.next() => item,
                    };
                    match item {
                        Some(Ok(_)) => n += 1,
                        Some(Err(e)) => return Err(e),
                        None => return Ok(Value::from(n)),
                    }
                }
            }
        }
    }
}

/// Count the rows of a system table.
///
/// Reads from the uuid-addressed backend. Either format would give the same count; the
/// choice is fixed so repeated estimates read from the same instance.
pub async fn estimate_doc_count(
    entry: &BackendEntry,
    evaluator: &dyn QueryEvaluator,
    ctx: &UserContext,
    cancel: &CancellationToken,
) -> AdminResult<Vec<i64>> {
    let backend = entry.get(IdentifierFormat::Uuid);
    let docs = backend
        .read_all_rows_as_stream(ctx, &KeyRange::Universe, Sorting::Unordered, cancel)
        .await
        .map_err(|e| e.with_context(DOC_COUNT_CONTEXT))?;

    let run = AssertUnwindSafe(evaluator.run_terminal(docs, TerminalAggregate::Count, cancel)).catch_unwind();
    let count = match run.await {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => return Err(AdminError::from(e).with_context(DOC_COUNT_CONTEXT)),
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "evaluator panicked".to_string());
            debug!(target: "syscat::catalog", "doc count evaluator panicked: {}", msg);
            return Err(AdminError::evaluation(msg).with_context(DOC_COUNT_CONTEXT));
        }
    };
    let n = count
        .as_i64()
        .ok_or_else(|| AdminError::evaluation(format!("Expected type NUMBER but found {}.", count)).with_context(DOC_COUNT_CONTEXT))?;
    Ok(vec![n])
}
