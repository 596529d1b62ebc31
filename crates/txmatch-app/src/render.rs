//! Rendering helpers: plain-text suite summaries and Markdown run reports.

use std::fmt::Write;
use txmatch_types::{TestCase, TestRunReport, TestStatus, TestSuite};

/// Plain-text suite summary: the suite name, then one block per test case.
pub fn render_suite_summary(suite: &TestSuite) -> String {
    let mut out = String::new();
    let _ = write!(out, "Test Suite Name: {}\n\n", suite.name);
    for test_case in &suite.test_cases {
        out.push_str(&render_test_case(test_case));
        out.push('\n');
    }
    out
}

fn render_test_case(test_case: &TestCase) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Test Case Name: {}", test_case.name);
    let _ = writeln!(out, "URL: {}", test_case.url);
    let _ = writeln!(out, "Expected Status Code: {}", test_case.expected_status);
    out.push_str("Criteria:\n");

    let last = test_case.predicates.len().saturating_sub(1);
    for (i, predicate) in test_case.predicates.iter().enumerate() {
        let _ = write!(
            out,
            "\t{} == {}",
            predicate.attribute, predicate.expected_value
        );
        out.push_str(if i < last { " AND\n" } else { "\n" });
    }
    out
}

pub fn render_report_markdown(report: &TestRunReport) -> String {
    let mut out = String::new();

    let failed = report
        .test_case_reports
        .iter()
        .any(|c| c.status == TestStatus::Failure);
    let header = if failed {
        "❌ txmatch: fail"
    } else if report.num_tests_passed == report.num_test_cases {
        "✅ txmatch: pass"
    } else {
        "⚠️ txmatch: incomplete"
    };

    out.push_str(header);
    out.push_str("\n\n");

    let _ = write!(
        out,
        "**Suite:** `{}` | **Run:** `{}` | **Run status:** {}\n\n",
        report.test_suite.name,
        report.test_run.id,
        report.status.as_str()
    );

    out.push_str("| test case | url | expected status | status |\n");
    out.push_str("|---|---|---:|---|\n");

    for case in &report.test_case_reports {
        let icon = match case.status {
            TestStatus::Success => "✅",
            TestStatus::Failure => "❌",
            TestStatus::NotAttempted => "➖",
        };
        let _ = writeln!(
            out,
            "| {name} | `{url}` | {expected} | {icon} {status} |",
            name = case.test_case.name,
            url = case.test_case.url,
            expected = case.test_case.expected_status,
            status = case.status.as_str(),
        );
    }

    let _ = writeln!(
        out,
        "\n**Passed:** {} / {} ({} attempted)",
        report.num_tests_passed, report.num_test_cases, report.num_tests_attempted
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use txmatch_types::{
        Predicate, REPORT_SCHEMA_V1, TestCaseReport, TestRun, TestRunStatus, TestSuiteId,
    };

    fn charge_suite() -> TestSuite {
        TestSuite {
            id: TestSuiteId::new("s1"),
            name: "Charges".to_string(),
            test_cases: vec![
                TestCase {
                    id: "tc1".into(),
                    name: "Test Case 1".to_string(),
                    url: "/ch/payments/v1/charges".to_string(),
                    expected_status: 201,
                    predicates: vec![
                        Predicate {
                            id: "p1".into(),
                            attribute: "amount.total".to_string(),
                            expected_value: "300".to_string(),
                        },
                        Predicate {
                            id: "p2".into(),
                            attribute: "source.sourceType".to_string(),
                            expected_value: "PaymentTrack".to_string(),
                        },
                    ],
                },
                TestCase {
                    id: "tc2".into(),
                    name: "Ping".to_string(),
                    url: "/ping".to_string(),
                    expected_status: 200,
                    predicates: vec![],
                },
            ],
        }
    }

    #[test]
    fn suite_summary_layout() {
        let text = render_suite_summary(&charge_suite());
        let expected = "Test Suite Name: Charges\n\n\
Test Case Name: Test Case 1\n\
URL: /ch/payments/v1/charges\n\
Expected Status Code: 201\n\
Criteria:\n\
\tamount.total == 300 AND\n\
\tsource.sourceType == PaymentTrack\n\
\n\
Test Case Name: Ping\n\
URL: /ping\n\
Expected Status Code: 200\n\
Criteria:\n\
\n";
        assert_eq!(text, expected);
    }

    fn report_with(statuses: &[TestStatus]) -> TestRunReport {
        let suite = charge_suite();
        let test_case_reports: Vec<TestCaseReport> = suite
            .test_cases
            .iter()
            .zip(statuses)
            .map(|(tc, s)| TestCaseReport {
                test_case: tc.clone(),
                status: *s,
            })
            .collect();
        let passed = statuses.iter().filter(|s| **s == TestStatus::Success).count() as u32;
        let attempted = statuses.iter().filter(|s| s.is_attempted()).count() as u32;
        TestRunReport {
            schema: REPORT_SCHEMA_V1.to_string(),
            test_suite: suite.clone(),
            test_run: TestRun {
                id: "run-9".into(),
                api_key: String::new(),
                test_suite: suite,
                test_results: vec![],
                status: TestRunStatus::Complete,
                timestamp: String::new(),
            },
            status: TestRunStatus::Complete,
            num_test_cases: test_case_reports.len() as u32,
            num_tests_attempted: attempted,
            num_tests_passed: passed,
            test_case_reports,
        }
    }

    #[test]
    fn markdown_renders_table() {
        let md = render_report_markdown(&report_with(&[TestStatus::Success, TestStatus::Failure]));
        assert!(md.starts_with("❌ txmatch: fail"));
        assert!(md.contains("| test case | url | expected status | status |"));
        assert!(md.contains("| Test Case 1 | `/ch/payments/v1/charges` | 201 | ✅ success |"));
        assert!(md.contains("| Ping | `/ping` | 200 | ❌ failure |"));
        assert!(md.contains("**Passed:** 1 / 2 (2 attempted)"));
        assert!(md.contains("`run-9`"));
    }

    #[test]
    fn markdown_header_reflects_outcome() {
        let pass = render_report_markdown(&report_with(&[TestStatus::Success, TestStatus::Success]));
        assert!(pass.starts_with("✅ txmatch: pass"));

        let partial =
            render_report_markdown(&report_with(&[TestStatus::Success, TestStatus::NotAttempted]));
        assert!(partial.starts_with("⚠️ txmatch: incomplete"));
        assert!(partial.contains("➖ not_attempted"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn summary_joins_each_case_criteria_with_and(
                counts in proptest::collection::vec(0usize..5, 0..6),
            ) {
                let suite = TestSuite {
                    id: TestSuiteId::new("s"),
                    name: "S".to_string(),
                    test_cases: counts
                        .iter()
                        .enumerate()
                        .map(|(i, n)| TestCase {
                            id: format!("tc{i}").into(),
                            name: format!("case {i}"),
                            url: "/x".to_string(),
                            expected_status: 200,
                            predicates: (0..*n)
                                .map(|j| Predicate {
                                    id: format!("p{j}").into(),
                                    attribute: format!("a{j}"),
                                    expected_value: "v".to_string(),
                                })
                                .collect(),
                        })
                        .collect(),
                };

                let text = render_suite_summary(&suite);
                let ands: usize = counts.iter().map(|n| n.saturating_sub(1)).sum();
                prop_assert_eq!(text.matches("Test Case Name:").count(), counts.len());
                prop_assert_eq!(text.matches(" AND\n").count(), ands);
                prop_assert_eq!(text.matches(" == ").count(), counts.iter().sum::<usize>());
            }
        }
    }
}
