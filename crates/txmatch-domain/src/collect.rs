//! Per-run result assembly and run status derivation.

use crate::matcher::match_transaction_with;
use txmatch_types::{
    IncompleteRunStatus, MatchPolicy, TestResult, TestRun, TestRunStatus, TestStatus, TestSuite,
    Transaction,
};

/// One result per test case, in suite order, whatever the outcome.
pub fn assemble_results(
    suite: &TestSuite,
    transactions: &[Transaction],
    policy: &MatchPolicy,
    timestamp: &str,
) -> Vec<TestResult> {
    suite
        .test_cases
        .iter()
        .map(|test_case| {
            let outcome =
                match_transaction_with(test_case, transactions, policy.failure_preference);
            TestResult {
                test_case: test_case.id.clone(),
                status: outcome.status,
                transaction: outcome.transaction.cloned(),
                timestamp: timestamp.to_string(),
            }
        })
        .collect()
}

/// Run status after collection.
///
/// `Complete` unless the policy asks for `InProgress` and some case was not attempted.
pub fn derive_run_status(results: &[TestResult], policy: IncompleteRunStatus) -> TestRunStatus {
    let any_unmatched = results
        .iter()
        .any(|r| r.status == TestStatus::NotAttempted);
    match policy {
        IncompleteRunStatus::InProgress if any_unmatched => TestRunStatus::InProgress,
        _ => TestRunStatus::Complete,
    }
}

/// Recompute `run`'s results and status from scratch; previous results are discarded.
pub fn apply_collection(
    run: &mut TestRun,
    transactions: &[Transaction],
    policy: &MatchPolicy,
    timestamp: &str,
) {
    run.test_results = assemble_results(&run.test_suite, transactions, policy, timestamp);
    run.status = derive_run_status(&run.test_results, policy.incomplete_run_status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use txmatch_types::{TestCase, TestCaseId, TestSuiteId};

    fn case(id: &str, url: &str) -> TestCase {
        TestCase {
            id: TestCaseId::new(id),
            name: id.to_string(),
            url: url.to_string(),
            expected_status: 200,
            predicates: vec![],
        }
    }

    fn run_with(cases: Vec<TestCase>) -> TestRun {
        TestRun {
            id: "run-1".into(),
            api_key: String::new(),
            test_suite: TestSuite {
                id: TestSuiteId::new("suite-1"),
                name: "suite".to_string(),
                test_cases: cases,
            },
            test_results: vec![],
            status: TestRunStatus::Created,
            timestamp: String::new(),
        }
    }

    fn tx(id: &str, url: &str, status: u16) -> Transaction {
        Transaction {
            id: id.into(),
            test_run_id: "run-1".into(),
            url: url.to_string(),
            status,
            request: "{}".to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn one_result_per_case_in_suite_order() {
        let mut run = run_with(vec![case("b", "/b"), case("a", "/a"), case("c", "/c")]);
        let txs = vec![tx("2", "/a", 200), tx("1", "/b", 500)];

        apply_collection(&mut run, &txs, &MatchPolicy::default(), "now");

        let ids: Vec<&str> = run
            .test_results
            .iter()
            .map(|r| r.test_case.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(run.test_results[0].status, TestStatus::Failure);
        assert_eq!(run.test_results[1].status, TestStatus::Success);
        assert_eq!(run.test_results[2].status, TestStatus::NotAttempted);
        assert!(run.test_results[2].transaction.is_none());
        assert!(run.test_results.iter().all(|r| r.timestamp == "now"));
    }

    #[test]
    fn recollection_replaces_previous_results() {
        let mut run = run_with(vec![case("a", "/a")]);
        apply_collection(&mut run, &[], &MatchPolicy::default(), "t1");
        apply_collection(&mut run, &[tx("1", "/a", 200)], &MatchPolicy::default(), "t2");

        assert_eq!(run.test_results.len(), 1);
        assert_eq!(run.test_results[0].status, TestStatus::Success);
        assert_eq!(run.test_results[0].timestamp, "t2");
    }

    #[test]
    fn default_policy_is_always_complete() {
        let mut run = run_with(vec![case("a", "/a")]);
        apply_collection(&mut run, &[], &MatchPolicy::default(), "now");
        assert_eq!(run.status, TestRunStatus::Complete);
    }

    #[test]
    fn in_progress_policy_flags_unmatched_cases() {
        let policy = MatchPolicy {
            incomplete_run_status: IncompleteRunStatus::InProgress,
            ..MatchPolicy::default()
        };

        let mut run = run_with(vec![case("a", "/a"), case("b", "/b")]);
        apply_collection(&mut run, &[tx("1", "/a", 200)], &policy, "now");
        assert_eq!(run.status, TestRunStatus::InProgress);

        apply_collection(
            &mut run,
            &[tx("2", "/b", 500), tx("1", "/a", 200)],
            &policy,
            "now",
        );
        assert_eq!(run.status, TestRunStatus::Complete);
    }

    #[test]
    fn empty_suite_completes() {
        let mut run = run_with(vec![]);
        apply_collection(&mut run, &[tx("1", "/a", 200)], &MatchPolicy::default(), "now");
        assert!(run.test_results.is_empty());
        assert_eq!(run.status, TestRunStatus::Complete);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn result_count_equals_case_count(
                n_cases in 0usize..12,
                tx_urls in proptest::collection::vec(0usize..12, 0..20),
            ) {
                let cases: Vec<TestCase> = (0..n_cases)
                    .map(|i| case(&format!("c{i}"), &format!("/r/{i}")))
                    .collect();
                let mut run = run_with(cases);
                let txs: Vec<Transaction> = tx_urls
                    .iter()
                    .enumerate()
                    .map(|(i, u)| tx(&format!("{i:04}"), &format!("/r/{u}"), 200))
                    .collect();

                apply_collection(&mut run, &txs, &MatchPolicy::default(), "now");

                prop_assert_eq!(run.test_results.len(), n_cases);
                for (result, case) in run.test_results.iter().zip(&run.test_suite.test_cases) {
                    prop_assert_eq!(&result.test_case, &case.id);
                }
            }
        }
    }
}
