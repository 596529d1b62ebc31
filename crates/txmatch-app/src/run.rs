//! Run submission and transaction capture.

use crate::{Catalog, Clock, new_id};
use tracing::debug;
use txmatch_adapters::Store;
use txmatch_error::{Error, Result};
use txmatch_types::{TestRun, TestRunRecord, TestRunStatus, TestSuiteId, Transaction};

#[derive(Debug, Clone)]
pub struct SubmitRunRequest {
    pub suite: TestSuiteId,

    /// Opaque correlation key; never checked.
    pub api_key: String,
}

/// Creates a run in `Created` state against an existing suite.
pub struct SubmitRunUseCase<S: Store, C: Clock> {
    catalog: Catalog<S>,
    clock: C,
}

impl<S: Store, C: Clock> SubmitRunUseCase<S, C> {
    pub fn new(catalog: Catalog<S>, clock: C) -> Self {
        Self { catalog, clock }
    }

    pub fn execute(&self, req: SubmitRunRequest) -> Result<TestRun> {
        let test_suite = self.catalog.load_test_suite(&req.suite)?;

        let record = TestRunRecord {
            id: new_id().into(),
            api_key: req.api_key,
            test_suite: test_suite.id.clone(),
            test_results: Vec::new(),
            status: TestRunStatus::Created,
            timestamp: self.clock.now_rfc3339(),
        };
        self.catalog.store().insert(&record)?;
        debug!(run = %record.id, suite = %record.test_suite, "submitted test run");

        Ok(TestRun {
            id: record.id,
            api_key: record.api_key,
            test_suite,
            test_results: record.test_results,
            status: record.status,
            timestamp: record.timestamp,
        })
    }
}

/// Appends a captured transaction to an existing run.
pub struct RecordTransactionUseCase<S: Store, C: Clock> {
    catalog: Catalog<S>,
    clock: C,
}

impl<S: Store, C: Clock> RecordTransactionUseCase<S, C> {
    pub fn new(catalog: Catalog<S>, clock: C) -> Self {
        Self { catalog, clock }
    }

    pub fn execute(&self, mut transaction: Transaction) -> Result<Transaction> {
        if !self.catalog.test_run_exists(&transaction.test_run_id)? {
            return Err(Error::not_found(
                "test_run",
                transaction.test_run_id.as_str(),
            ));
        }
        if transaction.timestamp.is_empty() {
            transaction.timestamp = self.clock.now_rfc3339();
        }
        let transaction = self.catalog.create(transaction)?;
        debug!(
            run = %transaction.test_run_id,
            transaction = %transaction.id,
            url = %transaction.url,
            status = transaction.status,
            "recorded transaction"
        );
        Ok(transaction)
    }
}
