//! Domain logic for txmatch.
//!
//! This crate is intentionally I/O-free: it matches, collects and reduces.
//! Storage, clocks and id generation are supplied by the caller.

pub mod collect;
pub mod matcher;
pub mod path;
pub mod predicate;
pub mod report;

pub use collect::{apply_collection, assemble_results, derive_run_status};
pub use matcher::{MatchOutcome, match_transaction, match_transaction_with, transaction_satisfies};
pub use path::{UrlPattern, url_matches};
pub use predicate::{PathParseError, PathSegment, evaluate, extract_raw, parse_path, predicate_holds};
pub use report::{compile_report, find_test_case_result};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("test run '{run}' has no result for test case '{test_case}'")]
    MissingResult { run: String, test_case: String },
}

impl From<DomainError> for txmatch_error::Error {
    fn from(err: DomainError) -> Self {
        txmatch_error::Error::InternalConsistency(err.to_string())
    }
}
