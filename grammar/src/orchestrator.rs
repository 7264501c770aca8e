//! Pipeline orchestrator: sequences stages against a generation capability.
//!
//! Each operation checks its preconditions, then loops: render the current
//! stage's prompt, call the capability once, validate the answer, and either
//! stop or feed the validated text into the next stage. Failures are returned
//! as [`PipelineError`] values; nothing is retried.

use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::core::error::{PipelineError, PipelineOutcome};
use crate::core::machine::{Pipeline, Transition};
use crate::core::prompt::PromptBuilder;
use crate::core::types::{Operation, Stage, SuggestLanguage, TransformRequest};
use crate::io::config::GrammarConfig;
use crate::io::gemini::{ApiKey, GeminiGenerator};
use crate::io::generator::Generator;

/// Runs pipeline operations against one exclusively owned capability.
///
/// Holds no per-invocation state, so `&self` operations may run concurrently.
pub struct Orchestrator<G> {
    generator: G,
    prompts: PromptBuilder,
}

impl Orchestrator<GeminiGenerator> {
    /// Bind a Gemini capability to `api_key`.
    ///
    /// Fails with `CapabilityUnavailable` for a missing or blank key; there is
    /// no half-usable orchestrator.
    pub fn connect(api_key: &str, config: &GrammarConfig) -> Result<Self, PipelineError> {
        let api_key = ApiKey::new(api_key)?;
        let generator = GeminiGenerator::new(api_key, config)?;
        Ok(Self::new(generator))
    }
}

impl<G: Generator> Orchestrator<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompts: PromptBuilder::new(),
        }
    }

    /// Run `operation` to completion, honoring `cancel`.
    #[instrument(skip_all, fields(operation = operation.name()))]
    pub async fn run(&self, operation: Operation, cancel: &CancelToken) -> PipelineOutcome {
        info!(stages = operation.stages().len(), "operation started");
        let mut pipeline = Pipeline::start(operation).inspect_err(|err| {
            warn!(error = %err, "rejected before any stage");
        })?;

        loop {
            let stage = pipeline.stage();
            let prompt = pipeline.prompt(&self.prompts);
            let raw = self.call(stage, &prompt, cancel).await?;
            match pipeline.advance(&raw) {
                Ok(Transition::Continue(next)) => pipeline = next,
                Ok(Transition::Done(text)) => {
                    info!(output_bytes = text.len(), "operation complete");
                    return Ok(text);
                }
                Err(err) => {
                    warn!(%stage, error = %err, "stage result rejected");
                    return Err(err);
                }
            }
        }
    }

    /// One capability round trip, raced against cancellation.
    async fn call(
        &self,
        stage: Stage,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<String, PipelineError> {
        if let Some(reason) = cancel.reason() {
            warn!(%stage, %reason, "cancelled before stage");
            return Err(PipelineError::Cancelled {
                stage,
                message: format!("operation {reason} before {stage}"),
            });
        }

        debug!(%stage, prompt_bytes = prompt.len(), "calling generator");
        tokio::select! {
            biased;
            reason = cancel.cancelled() => {
                warn!(%stage, %reason, "cancelled during stage");
                Err(PipelineError::Cancelled {
                    stage,
                    message: format!("operation {reason} during {stage}"),
                })
            }
            result = self.generator.generate(prompt) => result.map_err(|err| {
                let message = format!("{err:#}");
                warn!(%stage, error = %message, "generator failed");
                PipelineError::ModelFailure { stage, message }
            }),
        }
    }

    /// Transliterate phonetic Tamil, then correct grammar under `context`.
    ///
    /// A missing or blank `context` uses [`crate::core::types::DEFAULT_CONTEXT`].
    pub async fn correct(&self, text: &str, context: Option<&str>) -> PipelineOutcome {
        let request = TransformRequest::new(text).with_optional_context(context);
        self.run(Operation::Correct(request), &CancelToken::new())
            .await
    }

    pub async fn augment(&self, text: &str, context: &str) -> PipelineOutcome {
        let operation = Operation::Augment {
            text: text.to_string(),
            context: context.to_string(),
        };
        self.run(operation, &CancelToken::new()).await
    }

    pub async fn summarize(&self, text: &str, from_lang: &str, to_lang: &str) -> PipelineOutcome {
        let operation = Operation::Summarize {
            text: text.to_string(),
            from_lang: from_lang.to_string(),
            to_lang: to_lang.to_string(),
        };
        self.run(operation, &CancelToken::new()).await
    }

    pub async fn translate(&self, text: &str, to_lang: &str) -> PipelineOutcome {
        let operation = Operation::Translate {
            text: text.to_string(),
            to_lang: to_lang.to_string(),
        };
        self.run(operation, &CancelToken::new()).await
    }

    pub async fn elaborate(&self, text: &str) -> PipelineOutcome {
        let operation = Operation::Elaborate {
            text: text.to_string(),
        };
        self.run(operation, &CancelToken::new()).await
    }

    pub async fn suggest_next_tamil(&self, text: &str) -> PipelineOutcome {
        self.suggest_next(text, SuggestLanguage::Tamil).await
    }

    pub async fn suggest_next_english(&self, text: &str) -> PipelineOutcome {
        self.suggest_next(text, SuggestLanguage::English).await
    }

    async fn suggest_next(&self, text: &str, language: SuggestLanguage) -> PipelineOutcome {
        let operation = Operation::SuggestNext {
            text: text.to_string(),
            language,
        };
        self.run(operation, &CancelToken::new()).await
    }
}
