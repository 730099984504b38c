//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The in-memory repositories mirror the transactional behavior of the
//! PostgreSQL adapters closely enough for service-level tests: recording a
//! match updates player counters, and edits adjust current ratings.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
