//! Validated creation of predicates, test cases and suites.

use crate::Catalog;
use tracing::debug;
use txmatch_adapters::Store;
use txmatch_domain::{UrlPattern, parse_path};
use txmatch_error::{Error, Result};
use txmatch_types::{Predicate, TestCase, TestCaseSpec, TestSuite, TestSuiteSpec};

pub struct CreatePredicateUseCase<S: Store> {
    catalog: Catalog<S>,
}

impl<S: Store> CreatePredicateUseCase<S> {
    pub fn new(catalog: Catalog<S>) -> Self {
        Self { catalog }
    }

    /// Rejects attributes that are not a well-formed path.
    pub fn execute(&self, predicate: Predicate) -> Result<Predicate> {
        parse_path(&predicate.attribute).map_err(|e| {
            Error::InvalidInput(format!("attribute '{}': {e}", predicate.attribute))
        })?;
        let predicate = self.catalog.create(predicate)?;
        debug!(predicate = %predicate.id, attribute = %predicate.attribute, "created predicate");
        Ok(predicate)
    }
}

pub struct CreateTestCaseUseCase<S: Store> {
    catalog: Catalog<S>,
}

impl<S: Store> CreateTestCaseUseCase<S> {
    pub fn new(catalog: Catalog<S>) -> Self {
        Self { catalog }
    }

    /// Every referenced predicate must already exist.
    pub fn execute(&self, spec: TestCaseSpec) -> Result<TestCase> {
        if spec.url.is_empty() {
            return Err(Error::InvalidInput("test case url must not be empty".into()));
        }
        self.catalog.resolve_test_case(spec.clone())?;
        let spec = self.catalog.create(spec)?;
        debug!(
            test_case = %spec.id,
            url = %spec.url,
            params = ?UrlPattern::parse(&spec.url).param_names(),
            "created test case"
        );
        self.catalog.resolve_test_case(spec)
    }
}

pub struct CreateSuiteUseCase<S: Store> {
    catalog: Catalog<S>,
}

impl<S: Store> CreateSuiteUseCase<S> {
    pub fn new(catalog: Catalog<S>) -> Self {
        Self { catalog }
    }

    /// Every referenced test case, and each of its predicates, must resolve.
    pub fn execute(&self, spec: TestSuiteSpec) -> Result<TestSuite> {
        let mut suite = self.catalog.resolve_test_suite(spec.clone())?;
        let spec = self.catalog.create(spec)?;
        debug!(suite = %spec.id, test_cases = spec.test_cases.len(), "created test suite");
        suite.id = spec.id;
        Ok(suite)
    }
}
