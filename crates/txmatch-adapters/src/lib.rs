//! Storage adapters for txmatch.
//!
//! In clean-arch terms: this is where we touch the world.
//! Every document is stored as JSON text keyed by `(kind, id)`.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use txmatch_types::{
    Predicate, TestCaseSpec, TestRunId, TestRunRecord, TestSuiteSpec, Transaction,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKind {
    Predicate,
    TestCase,
    TestSuite,
    TestRun,
    Transaction,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Predicate => "predicate",
            DocumentKind::TestCase => "test_case",
            DocumentKind::TestSuite => "test_suite",
            DocumentKind::TestRun => "test_run",
            DocumentKind::Transaction => "transaction",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storable document with a string id.
pub trait Document: Serialize + DeserializeOwned + Clone {
    const KIND: DocumentKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Owning test run, for documents indexed by run.
    fn run_id(&self) -> Option<&str> {
        None
    }
}

impl Document for Predicate {
    const KIND: DocumentKind = DocumentKind::Predicate;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = id.into();
    }
}

impl Document for TestCaseSpec {
    const KIND: DocumentKind = DocumentKind::TestCase;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = id.into();
    }
}

impl Document for TestSuiteSpec {
    const KIND: DocumentKind = DocumentKind::TestSuite;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = id.into();
    }
}

impl Document for TestRunRecord {
    const KIND: DocumentKind = DocumentKind::TestRun;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = id.into();
    }
}

impl Document for Transaction {
    const KIND: DocumentKind = DocumentKind::Transaction;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = id.into();
    }

    fn run_id(&self) -> Option<&str> {
        Some(self.test_run_id.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} '{id}' already exists")]
    Conflict { kind: DocumentKind, id: String },

    #[error("{0} document has an empty id")]
    EmptyId(DocumentKind),

    #[error("stored {kind} '{id}' is not valid json: {source}")]
    Corrupt {
        kind: DocumentKind,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {0} document: {1}")]
    Serialize(DocumentKind, #[source] serde_json::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for txmatch_error::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { kind, id } => txmatch_error::Error::Conflict {
                kind: kind.as_str(),
                id,
            },
            StoreError::EmptyId(kind) => {
                txmatch_error::Error::InvalidInput(format!("{kind} document has an empty id"))
            }
            other => txmatch_error::Error::storage("document store", other),
        }
    }
}

/// Persistence for txmatch documents.
///
/// Implementations must make `upsert` atomic per document: a concurrent
/// reader sees the old or the new body, never neither.
pub trait Store {
    /// Insert a new document; fails with [`StoreError::Conflict`] if the id is taken.
    fn insert<D: Document>(&self, doc: &D) -> Result<(), StoreError>;

    /// Insert or replace a document in one step.
    fn upsert<D: Document>(&self, doc: &D) -> Result<(), StoreError>;

    fn get<D: Document>(&self, id: &str) -> Result<Option<D>, StoreError>;

    /// All documents of a kind, ordered by id.
    fn list<D: Document>(&self) -> Result<Vec<D>, StoreError>;

    /// Returns whether a document was removed.
    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError>;

    /// Transactions recorded against `run`, newest first.
    fn transactions_for_run(&self, run: &TestRunId) -> Result<Vec<Transaction>, StoreError>;
}

impl<T: Store> Store for &T {
    fn insert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        (**self).insert(doc)
    }

    fn upsert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        (**self).upsert(doc)
    }

    fn get<D: Document>(&self, id: &str) -> Result<Option<D>, StoreError> {
        (**self).get(id)
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, StoreError> {
        (**self).list()
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        (**self).delete::<D>(id)
    }

    fn transactions_for_run(&self, run: &TestRunId) -> Result<Vec<Transaction>, StoreError> {
        (**self).transactions_for_run(run)
    }
}

impl<T: Store> Store for std::sync::Arc<T> {
    fn insert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        (**self).insert(doc)
    }

    fn upsert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        (**self).upsert(doc)
    }

    fn get<D: Document>(&self, id: &str) -> Result<Option<D>, StoreError> {
        (**self).get(id)
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, StoreError> {
        (**self).list()
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        (**self).delete::<D>(id)
    }

    fn transactions_for_run(&self, run: &TestRunId) -> Result<Vec<Transaction>, StoreError> {
        (**self).transactions_for_run(run)
    }
}

fn encode<D: Document>(doc: &D) -> Result<String, StoreError> {
    if doc.id().is_empty() {
        return Err(StoreError::EmptyId(D::KIND));
    }
    serde_json::to_string(doc).map_err(|e| StoreError::Serialize(D::KIND, e))
}

fn decode<D: Document>(id: &str, body: &str) -> Result<D, StoreError> {
    serde_json::from_str(body).map_err(|source| StoreError::Corrupt {
        kind: D::KIND,
        id: id.to_string(),
        source,
    })
}
