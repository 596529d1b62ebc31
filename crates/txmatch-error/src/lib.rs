//! Error kinds shared across txmatch crates.
//!
//! Predicate mismatches and unresolvable JSON paths are not errors: they fold
//! into a `failure` or `not_attempted` status. Everything here aborts the
//! operation that raised it.

use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification callers branch on (exit codes, HTTP statuses, retries).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    StorageFailure,
    InternalConsistency,
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::StorageFailure => "storage failure",
            ErrorKind::InternalConsistency => "internal consistency",
            ErrorKind::InvalidInput => "invalid input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    Conflict { kind: &'static str, id: String },

    #[error("storage failure: {context}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn storage<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Storage {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Storage { .. } => ErrorKind::StorageFailure,
            Error::InternalConsistency(_) => ErrorKind::InternalConsistency,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}
