// tests/failed_verification.rs
// A failed or timed-out verification report is strongly negative evidence by
// default, asymmetric with an absent report; the neutral flag restores
// symmetry.

use veracity_engine::{
    DetectionConfig, DetectionEngine, KeyFactor, RawSignalBundle, VerificationReport,
};

const TEXT: &str = "The ministry confirmed the budget figures on Tuesday.";

fn engine() -> DetectionEngine {
    DetectionEngine::default()
}

#[test]
fn failed_report_is_penalized_by_default() {
    let failed = VerificationReport::failed("search", "timeout");
    let with_failed = engine().evaluate(
        TEXT,
        &RawSignalBundle::new(),
        None,
        None,
        Some(failed),
        &DetectionConfig::default(),
    );
    let without = engine().evaluate(
        TEXT,
        &RawSignalBundle::new(),
        None,
        None,
        None,
        &DetectionConfig::default(),
    );

    assert!(
        with_failed.prediction.fake_probability > without.prediction.fake_probability,
        "failed verification must push the score up"
    );
    // Zeroed score and coverage: full adjustment plus the low-verification penalty.
    assert!((with_failed.prediction.explanation.verification_adjustment - 0.35).abs() < 1e-6);
    assert!(with_failed.prediction.explanation.contradiction_penalty > 0.0);
    assert!(with_failed
        .prediction
        .explanation
        .key_factors
        .contains(&KeyFactor::ExtremelyLowVerification));
}

#[test]
fn neutral_flag_restores_symmetry_with_absent_report() {
    let failed = VerificationReport::failed("search", "timeout");
    let neutral_cfg = DetectionConfig {
        failed_verification_as_neutral: true,
        ..DetectionConfig::default()
    };

    let with_flag = engine().evaluate(TEXT, &RawSignalBundle::new(), None, None, Some(failed), &neutral_cfg);
    let without = engine().evaluate(
        TEXT,
        &RawSignalBundle::new(),
        None,
        None,
        None,
        &DetectionConfig::default(),
    );

    assert_eq!(with_flag.prediction, without.prediction);
    // The raw report is still echoed for audit.
    assert!(with_flag.verification.is_some());
}

#[test]
fn successful_report_is_unaffected_by_the_neutral_flag() {
    let report = VerificationReport {
        overall_score: 0.4,
        coverage: 0.5,
        entities_checked: 2,
        entities_found: 1,
        claims_checked: 2,
        claims_verified: 1,
        entity_results: Vec::new(),
        claim_results: Vec::new(),
        provider: "search".into(),
        error: None,
    };
    let neutral_cfg = DetectionConfig {
        failed_verification_as_neutral: true,
        ..DetectionConfig::default()
    };

    let a = engine().evaluate(
        TEXT,
        &RawSignalBundle::new(),
        None,
        None,
        Some(report.clone()),
        &DetectionConfig::default(),
    );
    let b = engine().evaluate(TEXT, &RawSignalBundle::new(), None, None, Some(report), &neutral_cfg);
    assert_eq!(a.prediction, b.prediction);
}

#[test]
fn verification_weight_zero_silences_all_verification_terms() {
    let failed = VerificationReport::failed("search", "timeout");
    let cfg = DetectionConfig {
        verification_weight: 0.0,
        ..DetectionConfig::default()
    };
    let eval = engine().evaluate(TEXT, &RawSignalBundle::new(), None, None, Some(failed), &cfg);
    assert!(eval.prediction.explanation.verification_adjustment.abs() < 1e-6);
    assert!(eval.prediction.explanation.contradiction_penalty.abs() < 1e-6);
}
