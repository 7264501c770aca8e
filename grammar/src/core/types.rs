//! Request and stage types shared by the prompt builder, the pipeline state
//! machine and the orchestrator.
//!
//! These types carry no I/O and are immutable once built.

/// Context instruction used when a caller supplies none (or a blank one).
pub const DEFAULT_CONTEXT: &str = "convert english to tamil";

/// Input for the two-stage `correct` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    source_text: String,
    context: String,
}

impl TransformRequest {
    /// Build a request with the default context instruction.
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Replace the context instruction. Blank values keep the default.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !context.trim().is_empty() {
            self.context = context;
        }
        self
    }

    /// Like [`TransformRequest::with_context`], for optional caller input.
    pub fn with_optional_context(self, context: Option<&str>) -> Self {
        match context {
            Some(context) => self.with_context(context),
            None => self,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Output language for next-sentence suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestLanguage {
    Tamil,
    English,
}

/// One logical operation requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Transliterate, then grammar-correct under a context instruction.
    Correct(TransformRequest),
    /// Reshape mixed text according to a context instruction.
    Augment { text: String, context: String },
    Summarize {
        text: String,
        from_lang: String,
        to_lang: String,
    },
    Translate { text: String, to_lang: String },
    Elaborate { text: String },
    SuggestNext {
        text: String,
        language: SuggestLanguage,
    },
}

impl Operation {
    /// Stable operation name used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Correct(_) => "correct",
            Operation::Augment { .. } => "augment",
            Operation::Summarize { .. } => "summarize",
            Operation::Translate { .. } => "translate",
            Operation::Elaborate { .. } => "elaborate",
            Operation::SuggestNext {
                language: SuggestLanguage::Tamil,
                ..
            } => "suggest_next_tamil",
            Operation::SuggestNext {
                language: SuggestLanguage::English,
                ..
            } => "suggest_next_english",
        }
    }

    /// The caller-supplied text the operation transforms.
    pub fn source_text(&self) -> &str {
        match self {
            Operation::Correct(request) => request.source_text(),
            Operation::Augment { text, .. }
            | Operation::Summarize { text, .. }
            | Operation::Translate { text, .. }
            | Operation::Elaborate { text }
            | Operation::SuggestNext { text, .. } => text,
        }
    }

    /// Ordered stages this operation runs.
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Operation::Correct(_) => &[Stage::Transliterate, Stage::GrammarCorrect],
            Operation::Augment { .. } => &[Stage::ContextAugment],
            Operation::Summarize { .. } => &[Stage::Summarize],
            Operation::Translate { .. } => &[Stage::Translate],
            Operation::Elaborate { .. } => &[Stage::Elaborate],
            Operation::SuggestNext {
                language: SuggestLanguage::Tamil,
                ..
            } => &[Stage::SuggestNextTamil],
            Operation::SuggestNext {
                language: SuggestLanguage::English,
                ..
            } => &[Stage::SuggestNextEnglish],
        }
    }

    pub fn first_stage(&self) -> Stage {
        self.stages()[0]
    }
}

/// One request/response round trip with the generation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Transliterate,
    GrammarCorrect,
    ContextAugment,
    Summarize,
    Translate,
    Elaborate,
    SuggestNextTamil,
    SuggestNextEnglish,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Transliterate => "transliterate",
            Stage::GrammarCorrect => "grammar_correct",
            Stage::ContextAugment => "context_augment",
            Stage::Summarize => "summarize",
            Stage::Translate => "translate",
            Stage::Elaborate => "elaborate",
            Stage::SuggestNextTamil => "suggest_next_tamil",
            Stage::SuggestNextEnglish => "suggest_next_english",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape-checked output of a single stage.
///
/// `text` is already trimmed; `succeeded` is false when nothing remained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    pub text: String,
    pub succeeded: bool,
}

impl StageResult {
    pub fn from_response(stage: Stage, raw: &str) -> Self {
        let text = raw.trim().to_string();
        let succeeded = !text.is_empty();
        Self {
            stage,
            text,
            succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_context_keeps_default() {
        let request = TransformRequest::new("vanakkam").with_context("   ");
        assert_eq!(request.context(), DEFAULT_CONTEXT);

        let request = TransformRequest::new("vanakkam").with_optional_context(None);
        assert_eq!(request.context(), DEFAULT_CONTEXT);
    }

    #[test]
    fn explicit_context_is_kept_verbatim() {
        let request = TransformRequest::new("vanakkam").with_context("make it formal");
        assert_eq!(request.context(), "make it formal");
        assert_eq!(request.source_text(), "vanakkam");
    }

    #[test]
    fn correct_is_the_only_two_stage_operation() {
        let correct = Operation::Correct(TransformRequest::new("x"));
        assert_eq!(
            correct.stages(),
            &[Stage::Transliterate, Stage::GrammarCorrect]
        );

        let singles = [
            Operation::Augment {
                text: "x".into(),
                context: "c".into(),
            },
            Operation::Summarize {
                text: "x".into(),
                from_lang: "Tamil".into(),
                to_lang: "English".into(),
            },
            Operation::Translate {
                text: "x".into(),
                to_lang: "Tamil".into(),
            },
            Operation::Elaborate { text: "x".into() },
            Operation::SuggestNext {
                text: "x".into(),
                language: SuggestLanguage::Tamil,
            },
            Operation::SuggestNext {
                text: "x".into(),
                language: SuggestLanguage::English,
            },
        ];
        for op in &singles {
            assert_eq!(op.stages().len(), 1, "{} should be single-stage", op.name());
        }
    }

    #[test]
    fn stage_result_trims_and_flags_blank_output() {
        let ok = StageResult::from_response(Stage::Elaborate, "  நன்றி \n");
        assert_eq!(ok.text, "நன்றி");
        assert!(ok.succeeded);

        let blank = StageResult::from_response(Stage::Elaborate, " \n\t ");
        assert!(!blank.succeeded);
        assert!(blank.text.is_empty());
    }
}
