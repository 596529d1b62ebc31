#![no_main]

use libfuzzer_sys::fuzz_target;
use txmatch_types::{TestCase, TestStatus, Transaction};

fuzz_target!(|input: (TestCase, Vec<Transaction>)| {
    let (test_case, transactions) = input;
    let outcome = txmatch_domain::match_transaction(&test_case, &transactions);
    match outcome.transaction {
        Some(t) => {
            assert!(txmatch_domain::transaction_satisfies(&test_case, t));
            let success = t.status == test_case.expected_status;
            assert_eq!(outcome.status == TestStatus::Success, success);
        }
        None => assert_eq!(outcome.status, TestStatus::NotAttempted),
    }
});
