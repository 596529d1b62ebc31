//! Workspace-level integration tests over the SQLite store.

mod sqlite_lifecycle;

use std::path::Path;
use std::sync::Arc;
use txmatch_adapters::SqliteStore;
use txmatch_app::{
    Catalog, CreatePredicateUseCase, CreateSuiteUseCase, CreateTestCaseUseCase,
    RecordTransactionUseCase, SubmitRunRequest, SubmitRunUseCase, SystemClock,
};
use txmatch_types::{Predicate, TestCaseSpec, TestRun, TestRunId, TestSuiteSpec, Transaction};

pub type SqliteCatalog = Catalog<Arc<SqliteStore>>;

pub fn open_catalog(path: &Path) -> SqliteCatalog {
    Catalog::new(Arc::new(SqliteStore::open(path).expect("open sqlite store")))
}

/// Two charges-and-refunds cases sharing a currency predicate.
pub fn seed_payments(catalog: &SqliteCatalog) {
    let predicates = CreatePredicateUseCase::new(catalog.clone());
    for (id, attribute, value) in [
        ("p-total", "amount.total", "300"),
        ("p-currency", "amount.currency", "usd"),
    ] {
        predicates
            .execute(Predicate {
                id: id.into(),
                attribute: attribute.to_string(),
                expected_value: value.to_string(),
            })
            .expect("create predicate");
    }

    let cases = CreateTestCaseUseCase::new(catalog.clone());
    cases
        .execute(TestCaseSpec {
            id: "tc-charge".into(),
            name: "Charge 300 USD".to_string(),
            url: "/accounts/{id}/charges".to_string(),
            expected_status: 201,
            predicates: vec!["p-total".into(), "p-currency".into()],
        })
        .expect("create charge case");
    cases
        .execute(TestCaseSpec {
            id: "tc-refund".into(),
            name: "Refund USD".to_string(),
            url: "/refunds".to_string(),
            expected_status: 200,
            predicates: vec!["p-currency".into()],
        })
        .expect("create refund case");

    CreateSuiteUseCase::new(catalog.clone())
        .execute(TestSuiteSpec {
            id: "suite-payments".into(),
            name: "Payments".to_string(),
            test_cases: vec!["tc-charge".into(), "tc-refund".into()],
        })
        .expect("create suite");
}

pub fn submit_run(catalog: &SqliteCatalog) -> TestRun {
    SubmitRunUseCase::new(catalog.clone(), SystemClock)
        .execute(SubmitRunRequest {
            suite: "suite-payments".into(),
            api_key: "key-1".to_string(),
        })
        .expect("submit run")
}

/// Record a transaction with a store-generated id.
pub fn record(
    catalog: &SqliteCatalog,
    run: &TestRunId,
    url: &str,
    status: u16,
    body: &str,
) -> Transaction {
    RecordTransactionUseCase::new(catalog.clone(), SystemClock)
        .execute(Transaction {
            id: Default::default(),
            test_run_id: run.clone(),
            url: url.to_string(),
            status,
            request: body.to_string(),
            timestamp: String::new(),
        })
        .expect("record transaction")
}
