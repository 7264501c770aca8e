//! Shape checks applied to caller input and to every generation result.
//!
//! Generative backends sometimes "succeed" with blank text instead of raising
//! an error. Every stage result passes through [`validate_stage_result`] before
//! it may feed a later stage or reach the caller.

use crate::core::error::PipelineError;
use crate::core::types::{Operation, StageResult};

/// Reject empty or whitespace-only text. Returns the trimmed text.
pub fn validate_input(text: &str) -> Result<&str, PipelineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::empty_input());
    }
    Ok(trimmed)
}

/// Check every precondition of `operation` before any stage runs.
pub fn validate_operation(operation: &Operation) -> Result<(), PipelineError> {
    validate_input(operation.source_text())?;
    match operation {
        Operation::Augment { context, .. } => require(context, "Context cannot be empty"),
        Operation::Summarize { to_lang, .. } | Operation::Translate { to_lang, .. } => {
            require(to_lang, "Target language cannot be empty")
        }
        Operation::Correct(_) | Operation::Elaborate { .. } | Operation::SuggestNext { .. } => {
            Ok(())
        }
    }
}

/// Accept a stage result only if it carries non-blank text.
pub fn validate_stage_result(result: StageResult) -> Result<String, PipelineError> {
    if !result.succeeded || result.text.trim().is_empty() {
        return Err(PipelineError::EmptyModelResponse {
            stage: result.stage,
        });
    }
    Ok(result.text)
}

fn require(value: &str, message: &str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        return Err(PipelineError::InvalidInput(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::types::{Stage, TransformRequest};

    #[test]
    fn blank_input_is_rejected() {
        for text in ["", " ", "\n\t  "] {
            let err = validate_input(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            assert_eq!(err.message(), "Input text cannot be empty");
        }
        assert_eq!(validate_input("  naan  ").expect("valid"), "naan");
    }

    #[test]
    fn operation_parameters_are_checked() {
        let op = Operation::Translate {
            text: "vanakkam".into(),
            to_lang: " ".into(),
        };
        let err = validate_operation(&op).unwrap_err();
        assert_eq!(err.message(), "Target language cannot be empty");

        let op = Operation::Augment {
            text: "vanakkam".into(),
            context: String::new(),
        };
        assert_eq!(
            validate_operation(&op).unwrap_err().message(),
            "Context cannot be empty"
        );

        let op = Operation::Correct(TransformRequest::new("vanakkam"));
        assert!(validate_operation(&op).is_ok());
    }

    /// Empty text wins over bad parameters so every operation reports the same error.
    #[test]
    fn empty_text_is_reported_before_parameters() {
        let op = Operation::Summarize {
            text: "  ".into(),
            from_lang: String::new(),
            to_lang: String::new(),
        };
        assert_eq!(
            validate_operation(&op).unwrap_err().message(),
            "Input text cannot be empty"
        );
    }

    #[test]
    fn blank_stage_result_is_an_empty_model_response() {
        let err =
            validate_stage_result(StageResult::from_response(Stage::Translate, "   ")).unwrap_err();
        assert_eq!(
            err,
            PipelineError::EmptyModelResponse {
                stage: Stage::Translate
            }
        );

        let text = validate_stage_result(StageResult::from_response(Stage::Translate, " ok "))
            .expect("valid");
        assert_eq!(text, "ok");
    }
}
