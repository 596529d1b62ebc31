//! Reduction of a collected run into a [`TestRunReport`].

use crate::DomainError;
use txmatch_types::{
    TestCaseId, TestCaseReport, TestResult, TestRun, TestRunReport, TestStatus, REPORT_SCHEMA_V1,
};

/// The result recorded for `test_case` in `run`.
pub fn find_test_case_result<'a>(
    run: &'a TestRun,
    test_case: &TestCaseId,
) -> Result<&'a TestResult, DomainError> {
    run.test_results
        .iter()
        .find(|r| &r.test_case == test_case)
        .ok_or_else(|| DomainError::MissingResult {
            run: run.id.to_string(),
            test_case: test_case.to_string(),
        })
}

/// Compile a report in suite order.
///
/// # Invariants
///
/// - `num_tests_passed <= num_tests_attempted <= num_test_cases`
/// - one case report per suite test case, in suite order
///
/// Fails if a test case has no result, which collection never produces.
pub fn compile_report(run: &TestRun) -> Result<TestRunReport, DomainError> {
    let mut test_case_reports = Vec::with_capacity(run.test_suite.test_cases.len());
    let mut attempted = 0u32;
    let mut passed = 0u32;

    for test_case in &run.test_suite.test_cases {
        let result = find_test_case_result(run, &test_case.id)?;
        if result.status.is_attempted() {
            attempted += 1;
        }
        if result.status == TestStatus::Success {
            passed += 1;
        }
        test_case_reports.push(TestCaseReport {
            test_case: test_case.clone(),
            status: result.status,
        });
    }

    Ok(TestRunReport {
        schema: REPORT_SCHEMA_V1.to_string(),
        test_suite: run.test_suite.clone(),
        test_run: run.clone(),
        status: run.status,
        num_test_cases: test_case_reports.len() as u32,
        num_tests_attempted: attempted,
        num_tests_passed: passed,
        test_case_reports,
    })
}
