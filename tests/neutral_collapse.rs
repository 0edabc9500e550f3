// tests/neutral_collapse.rs
// With every sub-analysis disabled the final score collapses to the bare
// fusion base score, exactly, and repeated calls are bit-identical.

use veracity_engine::signals::Prediction;
use veracity_engine::{DetectionConfig, DetectionEngine, DetectorSignal, RawSignalBundle};

fn bundle() -> RawSignalBundle {
    RawSignalBundle {
        style: Some(DetectorSignal::scored(0.62, 0.71, Prediction::Fake)),
        generative: Some(DetectorSignal::generative(4.4, true, 0.8)),
        token_rank: Some(DetectorSignal::scored(0.55, 0.6, Prediction::Fake)),
        zero_shot: Some(DetectorSignal::scored(0.3, 0.5, Prediction::Real)),
        image_text: None,
    }
}

#[test]
fn final_score_equals_fusion_base_exactly() {
    let engine = DetectionEngine::default();
    let eval = engine.evaluate(
        "Any text at all, even with a year like 2019 in it.",
        &bundle(),
        None,
        None,
        None,
        &DetectionConfig::fusion_only(),
    );
    assert!(!eval.fast_path);
    assert_eq!(
        eval.prediction.fake_probability,
        eval.fusion.fake_probability
    );
    assert_eq!(
        eval.prediction.explanation.base_fusion_score,
        eval.prediction.explanation.final_score
    );
    assert!(eval.prediction.explanation.total_adjustment_magnitude() == 0.0);
    assert!(eval.prediction.explanation.key_factors.is_empty() || {
        // Only the baseline tag may appear, and only for a high base score.
        eval.fusion.fake_probability > 0.7
    });
}

#[test]
fn skipped_bundle_stays_near_uncertain() {
    let engine = DetectionEngine::default();
    let neutral = RawSignalBundle::new();
    let eval = engine.evaluate("Probe.", &neutral, None, None, None, &DetectionConfig::fusion_only());
    // Every missing detector feature contributes its 0.5 neutral; the zeroed
    // default emotional features pull the score only slightly below center.
    // 0.5 * (1.10 - 0.04) / 1.10
    assert!((eval.prediction.fake_probability - 0.53 / 1.10).abs() < 1e-4);
    assert_eq!(
        eval.prediction.prediction,
        veracity_engine::Verdict::Misleading
    );
}

#[test]
fn evaluation_is_idempotent() {
    let engine = DetectionEngine::default();
    let config = DetectionConfig::default();
    let text = "Scientists announced a discovery in 2021 that experts say is remarkable.";

    let a = engine.evaluate(text, &bundle(), None, None, None, &config);
    let b = engine.evaluate(text, &bundle(), None, None, None, &config);
    assert_eq!(a, b);

    let ja = serde_json::to_string(&a).unwrap();
    let jb = serde_json::to_string(&b).unwrap();
    assert_eq!(ja, jb);
}
