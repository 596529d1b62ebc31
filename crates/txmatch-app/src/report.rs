use crate::Catalog;
use txmatch_adapters::Store;
use txmatch_error::Result;
use txmatch_types::{TestRun, TestRunId, TestRunReport};

/// Builds [`TestRunReport`]s from collected runs.
pub struct ReportUseCase<S: Store> {
    catalog: Catalog<S>,
}

impl<S: Store> ReportUseCase<S> {
    pub fn new(catalog: Catalog<S>) -> Self {
        Self { catalog }
    }

    /// Report on an in-memory run. A case without a result is an
    /// `InternalConsistency` error.
    pub fn compile_report(run: &TestRun) -> Result<TestRunReport> {
        Ok(txmatch_domain::compile_report(run)?)
    }

    /// Load `run_id` and report on it as stored.
    pub fn execute(&self, run_id: &TestRunId) -> Result<TestRunReport> {
        let run = self.catalog.load_test_run(run_id)?;
        Self::compile_report(&run)
    }
}
