//! The error contract between controllers and the wrapper.
//!
//! Controllers live outside this crate. All the wrapper needs from them is a
//! closed set of failure kinds, so that a uniqueness-constraint violation
//! raised by the persistence layer can be told apart from everything else by
//! pattern matching.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Name carried by every serialised [`UniqueViolation`].
pub const UNIQUE_VIOLATION: &str = "UniqueConstraintError";

/// Why a controller failed.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A uniqueness constraint in persisted data was violated.
    #[error(transparent)]
    Conflict(#[from] UniqueViolation),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ControllerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ControllerError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ControllerError::NotFound(msg.into())
    }
}

/// A uniqueness-constraint violation reported by the persistence layer.
///
/// Serialises as the raw error object the user router echoes back:
///
/// ```json
/// {
///   "name": "UniqueConstraintError",
///   "message": "Validation error",
///   "errors": [{ "message": "pseudo must be unique", "path": "pseudo", "value": "neo" }],
///   "fields": { "pseudo": "neo" }
/// }
/// ```
#[derive(Clone, Debug, Error, PartialEq, Serialize)]
#[error("{message}")]
pub struct UniqueViolation {
    pub name: String,
    pub message: String,
    pub errors: Vec<ViolatedField>,
    pub fields: BTreeMap<String, Value>,
}

/// One column whose uniqueness was violated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViolatedField {
    pub message: String,
    pub path: String,
    pub value: Value,
}

impl UniqueViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: UNIQUE_VIOLATION.to_owned(),
            message: message.into(),
            errors: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Records the offending column and value.
    pub fn field(mut self, path: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.errors.push(ViolatedField {
            message: format!("{path} must be unique"),
            path: path.to_owned(),
            value: value.clone(),
        });
        self.fields.insert(path.to_owned(), value);
        self
    }
}
