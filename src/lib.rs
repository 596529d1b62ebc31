//! txmatch workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests:
//! the BDD/cucumber suite in `tests/cucumber.rs` and the SQLite lifecycle
//! tests in `tests/integration/`.
//!
//! The actual txmatch functionality is in the workspace member crates:
//! - `txmatch-types`: Documents, reports and config contracts
//! - `txmatch-error`: Shared error type and error kinds
//! - `txmatch-domain`: URL matching, predicate evaluation, transaction selection
//! - `txmatch-adapters`: In-memory and SQLite document stores
//! - `txmatch-config`: Config file discovery and resolution
//! - `txmatch-app`: Application use cases and renderers
//! - `txmatch-cli`: The `txmatch` binary
