//! Selection of the transaction that decides a test case.

use crate::path::url_matches;
use crate::predicate::predicate_holds;
use txmatch_types::{FailurePreference, TestCase, TestStatus, Transaction};

/// The transaction chosen for a test case and the resulting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome<'a> {
    pub transaction: Option<&'a Transaction>,
    pub status: TestStatus,
}

impl<'a> MatchOutcome<'a> {
    pub fn not_attempted() -> Self {
        MatchOutcome {
            transaction: None,
            status: TestStatus::NotAttempted,
        }
    }
}

/// True if the transaction hits the case's URL and satisfies every predicate.
///
/// The status code is not considered here; it only separates success from failure.
pub fn transaction_satisfies(test_case: &TestCase, transaction: &Transaction) -> bool {
    url_matches(&transaction.url, &test_case.url)
        && test_case
            .predicates
            .iter()
            .all(|p| predicate_holds(&transaction.request, p))
}

/// Match with the default failure preference (last scanned, i.e. oldest).
pub fn match_transaction<'a>(
    test_case: &TestCase,
    transactions: &'a [Transaction],
) -> MatchOutcome<'a> {
    match_transaction_with(test_case, transactions, FailurePreference::default())
}

/// Scan `transactions` (newest first) for the transaction that decides `test_case`.
///
/// The first full match whose status equals the expected status wins
/// immediately. Failing matches do not stop the scan; if no success turns
/// up, `preference` picks which failing match is reported.
pub fn match_transaction_with<'a>(
    test_case: &TestCase,
    transactions: &'a [Transaction],
    preference: FailurePreference,
) -> MatchOutcome<'a> {
    let mut outcome = MatchOutcome::not_attempted();

    for transaction in transactions {
        if !transaction_satisfies(test_case, transaction) {
            continue;
        }

        if transaction.status == test_case.expected_status {
            return MatchOutcome {
                transaction: Some(transaction),
                status: TestStatus::Success,
            };
        }

        let keep = match preference {
            FailurePreference::LastScanned => true,
            FailurePreference::MostRecent => outcome.transaction.is_none(),
        };
        if keep {
            outcome = MatchOutcome {
                transaction: Some(transaction),
                status: TestStatus::Failure,
            };
        }
    }

    outcome
}
