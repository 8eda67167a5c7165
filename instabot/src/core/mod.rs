//! Deterministic, pure logic for the action engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod backoff;
pub mod dedup;
pub mod eligibility;
pub mod limits;
pub mod quota;
pub mod report;
pub mod types;
