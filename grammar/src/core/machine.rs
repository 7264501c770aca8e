//! Linear pipeline state machine.
//!
//! `correct` runs `AwaitingTransliteration -> AwaitingCorrection -> Done`; every
//! other operation runs `AwaitingResult -> Done`. Each transition is gated by the
//! result validator, so a blank stage output halts the pipeline and nothing from
//! an earlier stage is ever returned as a partial result. The machine itself
//! performs no I/O: the orchestrator asks it for the next prompt, calls the
//! capability, and feeds the raw response back through [`Pipeline::advance`].

use tracing::debug;

use crate::core::error::PipelineError;
use crate::core::prompt::PromptBuilder;
use crate::core::types::{Operation, Stage, StageResult};
use crate::core::validator::{validate_operation, validate_stage_result};

/// Observable state of a running pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    AwaitingTransliteration,
    AwaitingCorrection,
    AwaitingResult,
}

#[derive(Debug, Clone)]
enum Phase {
    /// First stage of any operation, built from caller input.
    First(Operation),
    /// Second stage of `correct`, built from validated stage-1 output.
    Correction {
        transliterated: String,
        context: String,
    },
}

/// A pipeline waiting for the output of its current stage.
#[derive(Debug, Clone)]
pub struct Pipeline {
    phase: Phase,
}

/// Result of feeding a stage output into the machine.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Another stage must run.
    Continue(Pipeline),
    /// The operation finished with this text.
    Done(String),
}

impl Pipeline {
    /// Check preconditions and enter the first state.
    ///
    /// Fails with `InvalidInput` before any stage exists, so no capability call
    /// can happen for blank input.
    pub fn start(operation: Operation) -> Result<Self, PipelineError> {
        validate_operation(&operation)?;
        Ok(Self {
            phase: Phase::First(operation),
        })
    }

    pub fn state(&self) -> PipelineState {
        match &self.phase {
            Phase::First(Operation::Correct(_)) => PipelineState::AwaitingTransliteration,
            Phase::First(_) => PipelineState::AwaitingResult,
            Phase::Correction { .. } => PipelineState::AwaitingCorrection,
        }
    }

    /// The stage whose output the pipeline is waiting for.
    pub fn stage(&self) -> Stage {
        match &self.phase {
            Phase::First(operation) => operation.first_stage(),
            Phase::Correction { .. } => Stage::GrammarCorrect,
        }
    }

    /// Render the prompt for the current stage.
    pub fn prompt(&self, prompts: &PromptBuilder) -> String {
        match &self.phase {
            Phase::First(operation) => prompts.first_stage(operation),
            Phase::Correction {
                transliterated,
                context,
            } => prompts.correct_grammar(transliterated, context),
        }
    }

    /// Validate the raw output of the current stage and move to the next state.
    pub fn advance(self, raw: &str) -> Result<Transition, PipelineError> {
        let stage = self.stage();
        let result = StageResult::from_response(stage, raw);
        debug!(
            stage = %result.stage,
            succeeded = result.succeeded,
            bytes = result.text.len(),
            "stage result"
        );
        let text = validate_stage_result(result)?;

        match self.phase {
            Phase::First(Operation::Correct(request)) => Ok(Transition::Continue(Pipeline {
                phase: Phase::Correction {
                    transliterated: text,
                    context: request.context().to_string(),
                },
            })),
            Phase::First(_) | Phase::Correction { .. } => Ok(Transition::Done(text)),
        }
    }
}
