//! Stable exit codes for the `grammar` CLI.
//!
//! Pipeline failures use 10 and up so they never collide with clap, which
//! exits with [`USAGE`] on bad arguments.

use crate::core::error::ErrorKind;

/// Command succeeded.
pub const OK: i32 = 0;
/// Configuration or storage error outside the pipeline.
pub const INVALID: i32 = 1;
/// Unknown flag or missing argument (reported by clap).
pub const USAGE: i32 = 2;
/// Empty input text or a blank required parameter.
pub const INVALID_INPUT: i32 = 10;
/// No usable API key or HTTP client.
pub const CAPABILITY_UNAVAILABLE: i32 = 11;
/// The model call failed.
pub const MODEL_FAILURE: i32 = 12;
/// The model answered with blank text.
pub const EMPTY_MODEL_RESPONSE: i32 = 13;
/// Interrupted or past `--timeout`.
pub const CANCELLED: i32 = 14;

/// Exit code for a pipeline failure.
pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidInput => INVALID_INPUT,
        ErrorKind::CapabilityUnavailable => CAPABILITY_UNAVAILABLE,
        ErrorKind::ModelFailure => MODEL_FAILURE,
        ErrorKind::EmptyModelResponse => EMPTY_MODEL_RESPONSE,
        ErrorKind::Cancelled => CANCELLED,
    }
}
