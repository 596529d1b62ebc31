//! Run collection: match every test case of a run against its transactions.

use crate::{Catalog, Clock, RunLocks};
use std::sync::Arc;
use tracing::{debug, info};
use txmatch_adapters::Store;
use txmatch_domain::apply_collection;
use txmatch_error::Result;
use txmatch_types::{MatchPolicy, TestRun, TestRunId, TestStatus};

pub struct CollectUseCase<S: Store, C: Clock> {
    catalog: Catalog<S>,
    clock: C,
    policy: MatchPolicy,
    locks: Arc<RunLocks>,
}

impl<S: Store, C: Clock> CollectUseCase<S, C> {
    pub fn new(catalog: Catalog<S>, clock: C, policy: MatchPolicy, locks: Arc<RunLocks>) -> Self {
        Self {
            catalog,
            clock,
            policy,
            locks,
        }
    }

    /// Recompute and store the results of `run_id`.
    ///
    /// Any lookup or storage error aborts before anything is written.
    pub fn execute(&self, run_id: &TestRunId) -> Result<TestRun> {
        self.locks.with_lock(run_id, || self.collect(run_id))
    }

    fn collect(&self, run_id: &TestRunId) -> Result<TestRun> {
        let mut run = self.catalog.load_test_run(run_id)?;
        let transactions = self.catalog.load_transactions_for_run(&run.id)?;
        let now = self.clock.now_rfc3339();

        apply_collection(&mut run, &transactions, &self.policy, &now);

        for result in &run.test_results {
            debug!(
                run = %run.id,
                test_case = %result.test_case,
                status = result.status.as_str(),
                transaction = result.transaction.as_ref().map(|t| t.id.as_str()),
                "test case collected"
            );
        }

        self.catalog.replace_test_run(&run)?;

        let passed = run
            .test_results
            .iter()
            .filter(|r| r.status == TestStatus::Success)
            .count();
        info!(
            run = %run.id,
            transactions = transactions.len(),
            test_cases = run.test_results.len(),
            passed,
            status = run.status.as_str(),
            "collected test run"
        );

        Ok(run)
    }
}
