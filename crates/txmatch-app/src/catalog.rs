//! Reference resolution over a [`Store`].
//!
//! Stored documents point at each other by id; the catalog dereferences them
//! into the resolved forms the domain works on.

use txmatch_adapters::{Document, Store};
use txmatch_error::{Error, Result};
use txmatch_types::{
    Predicate, PredicateId, TestCase, TestCaseId, TestCaseSpec, TestRun, TestRunId,
    TestRunRecord, TestSuite, TestSuiteId, TestSuiteSpec, Transaction,
};

#[derive(Debug, Clone)]
pub struct Catalog<S: Store> {
    store: S,
}

impl<S: Store> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn fetch<D: Document>(&self, id: &str) -> Result<D> {
        self.store
            .get::<D>(id)?
            .ok_or_else(|| Error::not_found(D::KIND.as_str(), id))
    }

    pub fn load_predicate(&self, id: &PredicateId) -> Result<Predicate> {
        self.fetch(id.as_str())
    }

    pub fn resolve_test_case(&self, spec: TestCaseSpec) -> Result<TestCase> {
        let predicates = spec
            .predicates
            .iter()
            .map(|id| self.load_predicate(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(TestCase {
            id: spec.id,
            name: spec.name,
            url: spec.url,
            expected_status: spec.expected_status,
            predicates,
        })
    }

    pub fn load_test_case(&self, id: &TestCaseId) -> Result<TestCase> {
        let spec: TestCaseSpec = self.fetch(id.as_str())?;
        self.resolve_test_case(spec)
    }

    pub fn resolve_test_suite(&self, spec: TestSuiteSpec) -> Result<TestSuite> {
        let test_cases = spec
            .test_cases
            .iter()
            .map(|id| self.load_test_case(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(TestSuite {
            id: spec.id,
            name: spec.name,
            test_cases,
        })
    }

    pub fn load_test_suite(&self, id: &TestSuiteId) -> Result<TestSuite> {
        let spec: TestSuiteSpec = self.fetch(id.as_str())?;
        self.resolve_test_suite(spec)
    }

    pub fn resolve_test_run(&self, record: TestRunRecord) -> Result<TestRun> {
        let test_suite = self.load_test_suite(&record.test_suite)?;
        Ok(TestRun {
            id: record.id,
            api_key: record.api_key,
            test_suite,
            test_results: record.test_results,
            status: record.status,
            timestamp: record.timestamp,
        })
    }

    /// The run with its suite, cases and predicates fully resolved.
    pub fn load_test_run(&self, id: &TestRunId) -> Result<TestRun> {
        let record: TestRunRecord = self.fetch(id.as_str())?;
        self.resolve_test_run(record)
    }

    pub fn test_run_exists(&self, id: &TestRunId) -> Result<bool> {
        Ok(self.store.get::<TestRunRecord>(id.as_str())?.is_some())
    }

    /// Newest first.
    pub fn load_transactions_for_run(&self, id: &TestRunId) -> Result<Vec<Transaction>> {
        Ok(self.store.transactions_for_run(id)?)
    }

    /// Store `run` in place of any previous version in one write.
    pub fn replace_test_run(&self, run: &TestRun) -> Result<()> {
        Ok(self.store.upsert(&run.to_record())?)
    }

    /// Insert a new document, generating an id when it has none.
    pub fn create<D: Document>(&self, mut doc: D) -> Result<D> {
        if doc.id().is_empty() {
            doc.set_id(crate::new_id());
        }
        self.store.insert(&doc)?;
        Ok(doc)
    }

    pub fn get<D: Document>(&self, id: &str) -> Result<D> {
        self.fetch(id)
    }

    pub fn list<D: Document>(&self) -> Result<Vec<D>> {
        Ok(self.store.list()?)
    }

    /// Fails with `NotFound` if nothing was deleted.
    pub fn delete<D: Document>(&self, id: &str) -> Result<()> {
        if self.store.delete::<D>(id)? {
            Ok(())
        } else {
            Err(Error::not_found(D::KIND.as_str(), id))
        }
    }
}
