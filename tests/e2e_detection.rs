// tests/e2e_detection.rs
// Whole-pipeline scenarios: anachronistic fabrication, loaded-language
// propaganda, machine-generated text, and a plain factual sentence.

use veracity_engine::signals::Prediction;
use veracity_engine::{
    DetectionConfig, DetectionEngine, DetectorSignal, KeyFactor, RawSignalBundle, Verdict,
};

fn engine() -> DetectionEngine {
    // RUST_LOG=debug cargo test -- --nocapture shows the per-term log lines.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    DetectionEngine::default()
}

#[test]
fn medieval_year_with_modern_tech_is_fake() {
    let text = "In 1205 the king's engineers unveiled a revolutionary smartphone \
                to an amazed crowd, sources say.";
    let eval = engine().evaluate(
        text,
        &RawSignalBundle::new(),
        None,
        None,
        None,
        &DetectionConfig::default(),
    );

    assert!(!eval.consistency.temporal.is_consistent);
    assert_eq!(eval.prediction.prediction, Verdict::Fake);
    assert!(eval
        .prediction
        .explanation
        .key_factors
        .contains(&KeyFactor::SevereTemporalError));
    assert!(eval
        .prediction
        .explanation
        .key_factors
        .contains(&KeyFactor::InconsistentInformation));
}

#[test]
fn loaded_language_raises_the_score() {
    let plain = "The committee released its report on schedule.";
    let loaded = "WAKE UP! The committee they don't want you to know about is hiding \
                  the SHOCKING truth, share before it's deleted, experts say!";

    let cfg = DetectionConfig::default();
    let a = engine().evaluate(plain, &RawSignalBundle::new(), None, None, None, &cfg);
    let b = engine().evaluate(loaded, &RawSignalBundle::new(), None, None, None, &cfg);

    assert!(
        b.prediction.explanation.rhetorical_adjustment
            > a.prediction.explanation.rhetorical_adjustment
    );
    assert!(b.prediction.fake_probability > a.prediction.fake_probability);
}

#[test]
fn strong_generative_signal_flags_ai_and_raises_score() {
    let bundle = RawSignalBundle {
        style: Some(DetectorSignal::scored(0.5, 0.5, Prediction::Unknown)),
        generative: Some(DetectorSignal::generative(6.0, true, 0.9)),
        ..RawSignalBundle::new()
    };
    let neutral = RawSignalBundle::new();
    let cfg = DetectionConfig::fusion_only();
    let text = "A perfectly ordinary paragraph of prose.";

    let hot = engine().evaluate(text, &bundle, None, None, None, &cfg);
    let cold = engine().evaluate(text, &neutral, None, None, None, &cfg);

    assert!(hot.fusion.ai_generated);
    assert!(!cold.fusion.ai_generated);
    assert!(hot.fusion.fake_probability > cold.fusion.fake_probability);
    assert_eq!(hot.prediction.prediction, Verdict::Fake);
}

#[test]
fn plain_factual_text_stays_out_of_the_fake_band() {
    let bundle = RawSignalBundle {
        style: Some(DetectorSignal::scored(0.2, 0.8, Prediction::Real)),
        generative: Some(DetectorSignal::generative(1.5, false, 0.7)),
        token_rank: Some(DetectorSignal::scored(0.3, 0.6, Prediction::Real)),
        zero_shot: Some(DetectorSignal::scored(0.25, 0.7, Prediction::Real)),
        image_text: None,
    };
    let eval = engine().evaluate(
        "The transport ministry opened the new rail line on Monday.",
        &bundle,
        None,
        None,
        None,
        &DetectionConfig::default(),
    );
    assert_ne!(eval.prediction.prediction, Verdict::Fake);
    assert!(eval.prediction.fake_probability < 0.6);
}
