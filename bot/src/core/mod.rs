//! Deterministic, pure logic for the weekly rollover.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod error;
pub mod types;
pub mod weekly;
