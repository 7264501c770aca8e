//! Behavioral properties of the orchestrator, driven through fake capabilities.
//!
//! Every test counts capability calls, so "no call was made" and "no later
//! stage ran" are asserted directly rather than inferred from the outcome.

use std::sync::Arc;
use std::time::Duration;

use grammar::test_support::{Scripted, ScriptedGenerator, TaggedGenerator};
use grammar::{
    CancelToken, DEFAULT_CONTEXT, ErrorKind, Operation, Orchestrator, Stage, TransformRequest,
};

fn scripted(script: Vec<Scripted>) -> (Arc<ScriptedGenerator>, Orchestrator<Arc<ScriptedGenerator>>) {
    let generator = Arc::new(ScriptedGenerator::new(script));
    let orchestrator = Orchestrator::new(Arc::clone(&generator));
    (generator, orchestrator)
}

/// Blank text is rejected by every operation before the capability is touched.
#[tokio::test]
async fn empty_input_is_rejected_without_calls() {
    let (generator, orchestrator) = scripted(vec![Scripted::reply("unused")]);

    for text in ["", "   ", "\n\t"] {
        let outcomes = [
            orchestrator.correct(text, None).await,
            orchestrator.correct(text, Some("formal")).await,
            orchestrator.augment(text, "formal").await,
            orchestrator.summarize(text, "Tamil", "English").await,
            orchestrator.translate(text, "Tamil").await,
            orchestrator.elaborate(text).await,
            orchestrator.suggest_next_tamil(text).await,
            orchestrator.suggest_next_english(text).await,
        ];
        for outcome in outcomes {
            let err = outcome.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            assert_eq!(err.message(), "Input text cannot be empty");
        }
    }
    assert_eq!(generator.calls(), 0);
}

/// A blank credential fails construction; there is no orchestrator to call.
#[test]
fn blank_credential_fails_construction() {
    for key in ["", "  \n"] {
        let err = Orchestrator::connect(key, &Default::default())
            .err()
            .expect("construction must fail");
        assert_eq!(err.kind(), ErrorKind::CapabilityUnavailable);
    }
}

/// A key that cannot travel as a header fails at construction, not on first call.
#[test]
fn unsendable_credential_fails_construction() {
    for key in ["abc\ndef", "key with\rreturn"] {
        let err = Orchestrator::connect(key, &Default::default())
            .err()
            .expect("construction must fail");
        assert_eq!(err.kind(), ErrorKind::CapabilityUnavailable);
        assert_eq!(err.stage(), None);
    }
}

/// Stage 2 is built from stage 1's validated output, never from raw input.
#[tokio::test]
async fn stage_two_consumes_stage_one_output() {
    let (generator, orchestrator) = scripted(vec![
        Scripted::reply("\n  STAGE-ONE-MARKER  \n"),
        Scripted::reply("final"),
    ]);

    let text = orchestrator
        .correct("vanakkam nanba, how are you", None)
        .await
        .expect("correct");
    assert_eq!(text, "final");

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("vanakkam nanba, how are you"));
    assert!(prompts[1].contains("<input>\nSTAGE-ONE-MARKER\n</input>"));
    assert!(!prompts[1].contains("vanakkam nanba"));
}

#[tokio::test]
async fn missing_context_uses_default_phrase() {
    let (generator, orchestrator) = scripted(vec![Scripted::reply("a"), Scripted::reply("b")]);
    orchestrator.correct("vanakkam", None).await.expect("correct");
    assert!(generator.prompts()[1].contains(DEFAULT_CONTEXT));

    let (generator, orchestrator) = scripted(vec![Scripted::reply("a"), Scripted::reply("b")]);
    orchestrator
        .correct("vanakkam", Some(""))
        .await
        .expect("correct");
    assert!(generator.prompts()[1].contains(DEFAULT_CONTEXT));
}

#[tokio::test]
async fn explicit_context_is_sent_verbatim() {
    let context = "Write it as a polite letter to a colleague";
    let (generator, orchestrator) = scripted(vec![Scripted::reply("a"), Scripted::reply("b")]);
    orchestrator
        .correct("vanakkam", Some(context))
        .await
        .expect("correct");

    let prompts = generator.prompts();
    assert!(prompts[1].contains(context));
    assert!(!prompts[1].contains(DEFAULT_CONTEXT));
    assert!(!prompts[0].contains(context), "stage 1 ignores context");
}

/// Blank output at stage 1 halts before stage 2 runs.
#[tokio::test]
async fn empty_stage_one_response_halts_pipeline() {
    for blank in ["", "   ", "\n"] {
        let (generator, orchestrator) =
            scripted(vec![Scripted::reply(blank), Scripted::reply("never used")]);
        let err = orchestrator.correct("vanakkam", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyModelResponse);
        assert_eq!(err.message(), "Empty response from model");
        assert_eq!(err.stage(), Some(Stage::Transliterate));
        assert_eq!(generator.calls(), 1);
    }
}

#[tokio::test]
async fn empty_stage_two_response_is_reported() {
    let (generator, orchestrator) =
        scripted(vec![Scripted::reply("வணக்கம்"), Scripted::reply("  ")]);
    let err = orchestrator.correct("vanakkam", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyModelResponse);
    assert_eq!(err.stage(), Some(Stage::GrammarCorrect));
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn empty_response_on_single_stage_operations() {
    let (_, orchestrator) = scripted(vec![
        Scripted::reply(""),
        Scripted::reply(" "),
        Scripted::reply("\t"),
        Scripted::reply(""),
        Scripted::reply(""),
        Scripted::reply(""),
    ]);
    let outcomes = [
        orchestrator.summarize("text", "", "Tamil").await,
        orchestrator.translate("text", "Tamil").await,
        orchestrator.elaborate("text").await,
        orchestrator.augment("text", "formal").await,
        orchestrator.suggest_next_tamil("text").await,
        orchestrator.suggest_next_english("text").await,
    ];
    for outcome in outcomes {
        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::EmptyModelResponse);
    }
}

/// A failure at stage 2 discards stage 1's output instead of returning it.
#[tokio::test]
async fn stage_two_failure_discards_stage_one_output() {
    let (generator, orchestrator) = scripted(vec![
        Scripted::reply("PARTIAL-RESULT"),
        Scripted::fail("connection reset by peer"),
    ]);
    let err = orchestrator.correct("vanakkam", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelFailure);
    assert_eq!(err.stage(), Some(Stage::GrammarCorrect));
    assert!(err.message().contains("connection reset by peer"));
    assert!(!err.message().contains("PARTIAL-RESULT"));
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn stage_one_failure_is_not_retried() {
    let (generator, orchestrator) = scripted(vec![
        Scripted::fail("503 service unavailable"),
        Scripted::reply("would succeed on retry"),
    ]);
    let err = orchestrator.correct("vanakkam", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelFailure);
    assert_eq!(generator.calls(), 1);
}

/// Tag-routed fake: "Transliterate" prompts get "X", "Context" prompts get "Y".
#[tokio::test]
async fn tagged_capability_scenario() {
    let generator = Arc::new(
        TaggedGenerator::new()
            .route("Transliterate", "X")
            .route("Context", "Y"),
    );
    let orchestrator = Orchestrator::new(Arc::clone(&generator));

    let text = orchestrator.correct("hello", None).await.expect("correct");
    assert_eq!(text, "Y");
    assert_eq!(generator.calls(), 2);
    let prompts = generator.prompts();
    assert!(prompts[1].contains("X"));
    assert!(!prompts[1].contains("Transliterate"));
}

#[tokio::test]
async fn single_stage_operations_make_exactly_one_call() {
    let (generator, orchestrator) = scripted(vec![
        Scripted::reply("summary"),
        Scripted::reply("translation"),
        Scripted::reply("elaboration"),
        Scripted::reply("augmented"),
        Scripted::reply("அடுத்து"),
        Scripted::reply("next"),
    ]);
    assert_eq!(
        orchestrator
            .summarize("long text", "English", "Tamil")
            .await
            .expect("summarize"),
        "summary"
    );
    assert_eq!(
        orchestrator.translate("text", "Tamil").await.expect("translate"),
        "translation"
    );
    assert_eq!(orchestrator.elaborate("text").await.expect("elaborate"), "elaboration");
    assert_eq!(
        orchestrator.augment("text", "formal").await.expect("augment"),
        "augmented"
    );
    assert_eq!(
        orchestrator.suggest_next_tamil("text").await.expect("tamil"),
        "அடுத்து"
    );
    assert_eq!(
        orchestrator.suggest_next_english("text").await.expect("english"),
        "next"
    );
    assert_eq!(generator.calls(), 6);

    let prompts = generator.prompts();
    assert!(prompts[0].contains("Target language: Tamil"));
    assert!(prompts[1].contains("Target language: Tamil"));
    assert!(prompts[2].contains("### Elaborate"));
    assert!(prompts[3].contains("formal"));
    assert!(prompts[4].contains("in Tamil only"));
    assert!(prompts[5].contains("in English only"));
}

#[tokio::test]
async fn blank_target_language_is_invalid_input() {
    let (generator, orchestrator) = scripted(vec![Scripted::reply("unused")]);
    let err = orchestrator.translate("vanakkam", " ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(generator.calls(), 0);
}

/// Cancelling while stage 1 is pending aborts it; stage 2 never starts.
#[tokio::test]
async fn cancel_during_stage_aborts_pipeline() {
    let (generator, orchestrator) = scripted(vec![Scripted::Hang, Scripted::reply("never")]);
    let cancel = CancelToken::new();

    let trigger = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };
    let err = orchestrator
        .run(
            Operation::Correct(TransformRequest::new("vanakkam")),
            &cancel,
        )
        .await
        .unwrap_err();
    trigger.await.expect("trigger");

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.stage(), Some(Stage::Transliterate));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_cancels_a_hanging_call() {
    let (generator, orchestrator) = scripted(vec![Scripted::reply("வணக்கம்"), Scripted::Hang]);
    let cancel = CancelToken::new().with_timeout(Duration::from_secs(30));

    let err = orchestrator
        .run(
            Operation::Correct(TransformRequest::new("vanakkam")),
            &cancel,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.stage(), Some(Stage::GrammarCorrect));
    assert!(err.message().contains("deadline exceeded"));
    assert_eq!(generator.calls(), 2);
}

/// Independent invocations share only the capability and may run in parallel.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_are_independent() {
    let generator = Arc::new(
        TaggedGenerator::new()
            .route("### Transliterate", "stage-one")
            .route("### Grammar Correction", "corrected")
            .route("### Summarize", "summary")
            .route("### Translate", "translation")
            .route("### Elaborate", "elaboration"),
    );
    let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&generator)));

    let mut handles = Vec::new();
    for i in 0..8 {
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            match i % 4 {
                0 => orchestrator.correct("vanakkam", None).await,
                1 => orchestrator.summarize("text", "", "Tamil").await,
                2 => orchestrator.translate("text", "Tamil").await,
                _ => orchestrator.elaborate("text").await,
            }
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.expect("join").expect("outcome"));
    }
    assert_eq!(
        results,
        vec![
            "corrected",
            "summary",
            "translation",
            "elaboration",
            "corrected",
            "summary",
            "translation",
            "elaboration",
        ]
    );
    // Two calls per correct, one per single-stage operation.
    assert_eq!(generator.calls(), 10);
}
