//! Application layer for txmatch.
//!
//! The app layer coordinates the store and domain logic.
//! It does not parse CLI flags and it does not do filesystem I/O.

mod catalog;
mod collect;
mod create;
mod locks;
mod render;
mod report;
mod run;

pub use catalog::Catalog;
pub use collect::CollectUseCase;
pub use create::{CreatePredicateUseCase, CreateSuiteUseCase, CreateTestCaseUseCase};
pub use locks::RunLocks;
pub use render::{render_report_markdown, render_suite_summary};
pub use report::ReportUseCase;
pub use run::{RecordTransactionUseCase, SubmitRunRequest, SubmitRunUseCase};

pub trait Clock: Send + Sync {
    fn now_rfc3339(&self) -> String;
}

#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        use time::format_description::well_known::Rfc3339;
        time::OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    }
}

/// A fresh document id. UUIDv7 sorts by creation time, which makes
/// transaction ids usable as the recency key.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
