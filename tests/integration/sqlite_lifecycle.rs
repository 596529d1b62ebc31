use super::*;
use std::sync::Arc;
use tempfile::TempDir;
use txmatch_app::{CollectUseCase, ReportUseCase, RunLocks, SystemClock};
use txmatch_error::ErrorKind;
use txmatch_types::{MatchPolicy, TestRunStatus, TestStatus};

const CHARGE_300_USD: &str = r#"{"amount":{"total":300,"currency":"USD"}}"#;

fn collect(catalog: &SqliteCatalog, run: &TestRunId) -> TestRun {
    CollectUseCase::new(
        catalog.clone(),
        SystemClock,
        MatchPolicy::default(),
        Arc::new(RunLocks::new()),
    )
    .execute(run)
    .expect("collect run")
}

#[test]
fn full_lifecycle_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("data").join("txmatch.db");

    let run_id = {
        let catalog = open_catalog(&db);
        seed_payments(&catalog);
        let run = submit_run(&catalog);
        assert_eq!(run.status, TestRunStatus::Created);

        record(&catalog, &run.id, "/accounts/7/charges", 402, CHARGE_300_USD);
        record(&catalog, &run.id, "/accounts/7/charges", 201, CHARGE_300_USD);
        let collected = collect(&catalog, &run.id);
        assert_eq!(collected.test_results.len(), 2);
        run.id
    };

    let catalog = open_catalog(&db);
    let report = ReportUseCase::new(catalog.clone())
        .execute(&run_id)
        .expect("report");

    assert_eq!(report.test_suite.name, "Payments");
    assert_eq!(report.num_test_cases, 2);
    assert_eq!(report.num_tests_attempted, 1);
    assert_eq!(report.num_tests_passed, 1);
    assert_eq!(report.status, TestRunStatus::Complete);
    assert_eq!(report.test_case_reports[0].status, TestStatus::Success);
    assert_eq!(report.test_case_reports[1].status, TestStatus::NotAttempted);

    let stored = catalog.load_test_run(&run_id).unwrap();
    let decided_by = stored.test_results[0].transaction.as_ref().unwrap();
    assert_eq!(decided_by.status, 201);
}

#[test]
fn generated_transaction_ids_order_by_recency() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("tx.db"));
    seed_payments(&catalog);
    let run = submit_run(&catalog);

    let first = record(&catalog, &run.id, "/refunds", 500, r#"{"amount":{"currency":"usd"}}"#);
    let second = record(&catalog, &run.id, "/refunds", 200, r#"{"amount":{"currency":"usd"}}"#);
    let third = record(&catalog, &run.id, "/refunds", 503, r#"{"amount":{"currency":"usd"}}"#);

    let loaded: Vec<_> = catalog
        .load_transactions_for_run(&run.id)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(loaded, vec![third.id, second.id.clone(), first.id]);

    let collected = collect(&catalog, &run.id);
    let refund = &collected.test_results[1];
    assert_eq!(refund.status, TestStatus::Success);
    assert_eq!(refund.transaction.as_ref().map(|t| &t.id), Some(&second.id));
}

#[test]
fn recollection_picks_up_new_transactions() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("tx.db"));
    seed_payments(&catalog);
    let run = submit_run(&catalog);

    let before = collect(&catalog, &run.id);
    assert!(before
        .test_results
        .iter()
        .all(|r| r.status == TestStatus::NotAttempted));

    record(&catalog, &run.id, "/refunds", 200, r#"{"amount":{"currency":"USD"}}"#);
    let after = collect(&catalog, &run.id);
    assert_eq!(after.test_results.len(), 2);
    assert_eq!(after.test_results[1].status, TestStatus::Success);
}

#[test]
fn transactions_are_scoped_to_their_run() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("tx.db"));
    seed_payments(&catalog);
    let a = submit_run(&catalog);
    let b = submit_run(&catalog);

    record(&catalog, &a.id, "/refunds", 200, r#"{"amount":{"currency":"USD"}}"#);

    let collected = collect(&catalog, &b.id);
    assert!(collected
        .test_results
        .iter()
        .all(|r| r.transaction.is_none()));
}

#[test]
fn recording_against_unknown_run_is_not_found() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("tx.db"));

    let err = RecordTransactionUseCase::new(catalog, SystemClock)
        .execute(Transaction {
            id: Default::default(),
            test_run_id: "run-missing".into(),
            url: "/refunds".to_string(),
            status: 200,
            request: String::new(),
            timestamp: String::new(),
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn report_before_collection_is_internal_consistency_error() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("tx.db"));
    seed_payments(&catalog);
    let run = submit_run(&catalog);

    let err = ReportUseCase::new(catalog).execute(&run.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalConsistency);
}

#[test]
fn concurrent_collections_share_one_store() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("tx.db"));
    seed_payments(&catalog);
    let run = submit_run(&catalog);
    record(&catalog, &run.id, "/accounts/1/charges", 201, CHARGE_300_USD);

    let usecase = Arc::new(CollectUseCase::new(
        catalog.clone(),
        SystemClock,
        MatchPolicy::default(),
        Arc::new(RunLocks::new()),
    ));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let usecase = Arc::clone(&usecase);
            let id = run.id.clone();
            std::thread::spawn(move || usecase.execute(&id).map(|r| r.test_results.len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 2);
    }

    let stored = catalog.load_test_run(&run.id).unwrap();
    assert_eq!(stored.test_results.len(), 2);
    assert_eq!(stored.test_results[0].status, TestStatus::Success);
}
