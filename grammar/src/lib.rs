//! Mixed Tamil–English text transformation pipeline.
//!
//! Turns English text sprinkled with phonetically written Tamil into
//! grammatical Tamil-script output, plus summarize, translate, elaborate,
//! augment and next-sentence suggestions. All language understanding is
//! delegated to a generative model; this crate owns the orchestration:
//!
//! - **[`core`]**: Pure logic (prompt building, result validation, the stage
//!   state machine). No I/O, fully testable in isolation.
//! - **[`io`]**: The model backend, configuration and credential storage.
//!   Isolated behind traits so tests can substitute fakes.
//!
//! [`orchestrator::Orchestrator`] ties the two together; [`commands`]
//! implements the CLI on top of it.

pub mod cancel;
pub mod commands;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod orchestrator;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::cancel::{CancelReason, CancelToken};
pub use crate::core::error::{ErrorKind, PipelineError, PipelineOutcome};
pub use crate::core::types::{
    DEFAULT_CONTEXT, Operation, Stage, StageResult, SuggestLanguage, TransformRequest,
};
pub use crate::io::generator::Generator;
pub use crate::orchestrator::Orchestrator;
