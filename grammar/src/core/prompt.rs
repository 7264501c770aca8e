//! Prompt builder: deterministic instruction text for every stage.
//!
//! Each stage has one minijinja template under `core/prompts/`. Templates spell
//! out negative constraints ("do not translate", "do not explain") because the
//! generation capability is a general instruction-follower that over-helps when
//! they are missing.

use minijinja::{Environment, Value, context};

use crate::core::types::{Operation, Stage, SuggestLanguage};

const TRANSLITERATE_TEMPLATE: &str = include_str!("prompts/transliterate.md");
const GRAMMAR_CORRECT_TEMPLATE: &str = include_str!("prompts/grammar_correct.md");
const CONTEXT_AUGMENT_TEMPLATE: &str = include_str!("prompts/context_augment.md");
const SUMMARIZE_TEMPLATE: &str = include_str!("prompts/summarize.md");
const TRANSLATE_TEMPLATE: &str = include_str!("prompts/translate.md");
const ELABORATE_TEMPLATE: &str = include_str!("prompts/elaborate.md");
const SUGGEST_NEXT_TAMIL_TEMPLATE: &str = include_str!("prompts/suggest_next_tamil.md");
const SUGGEST_NEXT_ENGLISH_TEMPLATE: &str = include_str!("prompts/suggest_next_english.md");

/// Rendered in place of a blank source language.
const AUTO_DETECT: &str = "auto-detect";

/// Maps `(stage, payload)` to the instruction string sent to the model.
///
/// Pure: no I/O and no randomness. The same inputs always render the same text.
#[derive(Clone)]
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for (stage, source) in [
            (Stage::Transliterate, TRANSLITERATE_TEMPLATE),
            (Stage::GrammarCorrect, GRAMMAR_CORRECT_TEMPLATE),
            (Stage::ContextAugment, CONTEXT_AUGMENT_TEMPLATE),
            (Stage::Summarize, SUMMARIZE_TEMPLATE),
            (Stage::Translate, TRANSLATE_TEMPLATE),
            (Stage::Elaborate, ELABORATE_TEMPLATE),
            (Stage::SuggestNextTamil, SUGGEST_NEXT_TAMIL_TEMPLATE),
            (Stage::SuggestNextEnglish, SUGGEST_NEXT_ENGLISH_TEMPLATE),
        ] {
            env.add_template(stage.as_str(), source)
                .expect("prompt templates should be valid");
        }
        Self { env }
    }

    /// Stage 1 of `correct`: phonetic Tamil words into Tamil script, nothing else.
    pub fn transliterate(&self, text: &str) -> String {
        self.render(Stage::Transliterate, context! { text => text.trim() })
    }

    /// Stage 2 of `correct`: grammar and orthography under a context instruction.
    ///
    /// `text` must be the validated stage-1 output, never the raw caller input.
    pub fn correct_grammar(&self, text: &str, context: &str) -> String {
        self.render(
            Stage::GrammarCorrect,
            context! { text => text.trim(), context => context },
        )
    }

    pub fn augment(&self, text: &str, context: &str) -> String {
        self.render(
            Stage::ContextAugment,
            context! { text => text.trim(), context => context },
        )
    }

    pub fn summarize(&self, text: &str, from_lang: &str, to_lang: &str) -> String {
        let from_lang = match from_lang.trim() {
            "" => AUTO_DETECT,
            lang => lang,
        };
        self.render(
            Stage::Summarize,
            context! { text => text.trim(), from_lang => from_lang, to_lang => to_lang.trim() },
        )
    }

    pub fn translate(&self, text: &str, to_lang: &str) -> String {
        self.render(
            Stage::Translate,
            context! { text => text.trim(), to_lang => to_lang.trim() },
        )
    }

    pub fn elaborate(&self, text: &str) -> String {
        self.render(Stage::Elaborate, context! { text => text.trim() })
    }

    pub fn suggest_next(&self, text: &str, language: SuggestLanguage) -> String {
        let stage = match language {
            SuggestLanguage::Tamil => Stage::SuggestNextTamil,
            SuggestLanguage::English => Stage::SuggestNextEnglish,
        };
        self.render(stage, context! { text => text.trim() })
    }

    /// Prompt for the first stage of `operation`, built from caller input.
    pub fn first_stage(&self, operation: &Operation) -> String {
        match operation {
            Operation::Correct(request) => self.transliterate(request.source_text()),
            Operation::Augment { text, context } => self.augment(text, context),
            Operation::Summarize {
                text,
                from_lang,
                to_lang,
            } => self.summarize(text, from_lang, to_lang),
            Operation::Translate { text, to_lang } => self.translate(text, to_lang),
            Operation::Elaborate { text } => self.elaborate(text),
            Operation::SuggestNext { text, language } => self.suggest_next(text, *language),
        }
    }

    fn render(&self, stage: Stage, ctx: Value) -> String {
        self.env
            .get_template(stage.as_str())
            .and_then(|template| template.render(ctx))
            .expect("prompt template rendering should not fail")
    }
}
