//! Deterministic, pure logic for the transformation pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod error;
pub mod machine;
pub mod prompt;
pub mod types;
pub mod validator;
