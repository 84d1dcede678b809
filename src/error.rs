//! Unified administration error model.
//! Every cluster-interface operation reports failure as an `AdminError`: a message, a
//! taxonomy kind and a severity. Evaluator-level failures have their own `EvalError`
//! and are converted at the catalog boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an administration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The reserved database or one of its tables refused the operation.
    RejectedOperation,
    NotFound,
    NoDelegateConfigured,
    EvaluationFailure,
    AuthorizationFailure,
    Cancelled,
    InvalidArgument,
}

/// Query state reported alongside the message. Only `Failed` is produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Failed,
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AdminError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Message used whenever a call has to be forwarded but no delegate is wired.
pub const NO_INTERFACE_MSG: &str = "Failed to find an interface.";

impl AdminError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), severity: Severity::Failed }
    }

    pub fn rejected(message: impl Into<String>) -> Self { Self::new(ErrorKind::RejectedOperation, message) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::new(ErrorKind::NotFound, message) }
    pub fn evaluation(message: impl Into<String>) -> Self { Self::new(ErrorKind::EvaluationFailure, message) }
    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(ErrorKind::AuthorizationFailure, message) }
    pub fn cancelled(message: impl Into<String>) -> Self { Self::new(ErrorKind::Cancelled, message) }
    pub fn invalid(message: impl Into<String>) -> Self { Self::new(ErrorKind::InvalidArgument, message) }
    pub fn no_delegate() -> Self { Self::new(ErrorKind::NoDelegateConfigured, NO_INTERFACE_MSG) }

    /// The standard "query interrupted" failure.
    pub fn interrupted() -> Self { Self::cancelled("Query interrupted.") }

    /// Prepend `prefix` to the message, keeping kind and severity.
    pub fn with_context(mut self, prefix: &str) -> Self {
        self.message = format!("{}{}", prefix, self.message);
        self
    }

    pub fn is_cancelled(&self) -> bool { self.kind == ErrorKind::Cancelled }
}

/// Failure raised by the query-evaluation collaborator while producing or reducing a
/// row stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Query interrupted.")]
    Interrupted,
    #[error("{0}")]
    NonExistence(String),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Internal(String),
}

impl From<EvalError> for AdminError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Interrupted => AdminError::interrupted(),
            other => AdminError::evaluation(other.to_string()),
        }
    }
}
