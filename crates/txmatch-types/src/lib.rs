//! Shared types for txmatch.
//!
//! Design goal: versioned, explicit, boring.
//! Stored documents reference each other by id (`*Spec`, [`TestRunRecord`]);
//! the resolved forms ([`TestCase`], [`TestSuite`], [`TestRun`]) carry the full objects.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const REPORT_SCHEMA_V1: &str = "txmatch.report.v1";

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
        )]
        #[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_type!(PredicateId);
id_type!(TestCaseId);
id_type!(TestSuiteId);
id_type!(TestRunId);
id_type!(
    /// Transaction ids double as the recency key: a larger id is a newer transaction.
    TransactionId
);

/// A single JSON-path equality assertion against a transaction's request body.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Predicate {
    #[serde(default)]
    pub id: PredicateId,

    /// Dot/bracket path into the request body, e.g. `amount.total` or `items[0].sku`.
    pub attribute: String,

    /// Compared case-insensitively against the extracted raw value.
    pub expected_value: String,
}

/// Stored form of a test case: predicates are referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestCaseSpec {
    #[serde(default)]
    pub id: TestCaseId,
    pub name: String,

    /// Literal path or template such as `/accounts/{id}/charges`.
    pub url: String,

    pub expected_status: u16,

    #[serde(default)]
    pub predicates: Vec<PredicateId>,
}

/// Resolved test case. Passes only if every predicate matches.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestCase {
    pub id: TestCaseId,
    pub name: String,
    pub url: String,
    pub expected_status: u16,
    pub predicates: Vec<Predicate>,
}

/// Stored form of a test suite: test cases are referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestSuiteSpec {
    #[serde(default)]
    pub id: TestSuiteId,
    pub name: String,

    #[serde(default)]
    pub test_cases: Vec<TestCaseId>,
}

/// Resolved test suite. Case order is display order, not matching order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestSuite {
    pub id: TestSuiteId,
    pub name: String,
    pub test_cases: Vec<TestCase>,
}

/// A captured HTTP exchange. Immutable once written.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Transaction {
    #[serde(default)]
    pub id: TransactionId,
    pub test_run_id: TestRunId,
    pub url: String,
    pub status: u16,

    /// Request body exactly as serialized on the wire.
    #[serde(default)]
    pub request: String,

    #[serde(default)]
    pub timestamp: String,
}

#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    #[default]
    NotAttempted,
    Success,
    Failure,
}

impl TestStatus {
    /// True when some transaction matched the case's URL and predicates.
    pub fn is_attempted(self) -> bool {
        matches!(self, TestStatus::Success | TestStatus::Failure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::NotAttempted => "not_attempted",
            TestStatus::Success => "success",
            TestStatus::Failure => "failure",
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestRunStatus {
    #[default]
    Created,
    InProgress,
    Complete,
}

impl TestRunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestRunStatus::Created => "created",
            TestRunStatus::InProgress => "in_progress",
            TestRunStatus::Complete => "complete",
        }
    }
}

/// Verdict for one test case within one run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestResult {
    pub test_case: TestCaseId,
    pub status: TestStatus,

    /// The selected evidence; absent when nothing matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,

    pub timestamp: String,
}

/// Stored form of a test run: the suite is referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestRunRecord {
    #[serde(default)]
    pub id: TestRunId,

    /// Opaque caller-supplied correlation key.
    #[serde(default)]
    pub api_key: String,

    pub test_suite: TestSuiteId,

    #[serde(default)]
    pub test_results: Vec<TestResult>,

    #[serde(default)]
    pub status: TestRunStatus,

    #[serde(default)]
    pub timestamp: String,
}

/// Resolved test run with its suite fully dereferenced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestRun {
    pub id: TestRunId,
    pub api_key: String,
    pub test_suite: TestSuite,
    pub test_results: Vec<TestResult>,
    pub status: TestRunStatus,
    pub timestamp: String,
}

impl TestRun {
    /// Collapse back into the stored form.
    pub fn to_record(&self) -> TestRunRecord {
        TestRunRecord {
            id: self.id.clone(),
            api_key: self.api_key.clone(),
            test_suite: self.test_suite.id.clone(),
            test_results: self.test_results.clone(),
            status: self.status,
            timestamp: self.timestamp.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestCaseReport {
    pub test_case: TestCase,
    pub status: TestStatus,
}

/// Read-only summary of a collected run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestRunReport {
    pub schema: String,
    pub test_suite: TestSuite,
    pub test_run: TestRun,
    pub status: TestRunStatus,
    pub test_case_reports: Vec<TestCaseReport>,
    pub num_test_cases: u32,
    pub num_tests_attempted: u32,
    pub num_tests_passed: u32,
}

// ----------------------------
// Matching policy
// ----------------------------

/// Run status assigned when at least one test case was not attempted.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncompleteRunStatus {
    #[default]
    Complete,
    InProgress,
}

/// Which failing transaction is kept when several match but none succeeds.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePreference {
    /// The last match in scan order, i.e. the oldest.
    #[default]
    LastScanned,
    /// The first match in scan order, i.e. the newest.
    MostRecent,
}

#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MatchPolicy {
    #[serde(default)]
    pub incomplete_run_status: IncompleteRunStatus,

    #[serde(default)]
    pub failure_preference: FailurePreference,
}

// ----------------------------
// Optional config file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub matching: MatchPolicy,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database path, relative to the config file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn non_empty_string() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_-]{1,20}".prop_map(|s| s)
    }

    fn status_strategy() -> impl Strategy<Value = TestStatus> {
        prop_oneof![
            Just(TestStatus::NotAttempted),
            Just(TestStatus::Success),
            Just(TestStatus::Failure),
        ]
    }

    proptest! {
        // Collapsing a resolved run never loses results or reorders them.
        #[test]
        fn to_record_preserves_results(
            run_id in non_empty_string(),
            suite_id in non_empty_string(),
            statuses in proptest::collection::vec(status_strategy(), 0..10),
        ) {
            let results: Vec<TestResult> = statuses
                .iter()
                .enumerate()
                .map(|(i, s)| TestResult {
                    test_case: TestCaseId::new(format!("tc-{i}")),
                    status: *s,
                    transaction: None,
                    timestamp: "2024-01-01T00:00:00Z".to_string(),
                })
                .collect();
            let run = TestRun {
                id: TestRunId::new(run_id.clone()),
                api_key: String::new(),
                test_suite: TestSuite {
                    id: TestSuiteId::new(suite_id.clone()),
                    name: "s".to_string(),
                    test_cases: vec![],
                },
                test_results: results.clone(),
                status: TestRunStatus::Complete,
                timestamp: String::new(),
            };

            let record = run.to_record();
            prop_assert_eq!(record.id.as_str(), run_id.as_str());
            prop_assert_eq!(record.test_suite.as_str(), suite_id.as_str());
            prop_assert_eq!(record.test_results, results);
        }
    }
}
