//! calibrate.rs — Final score calibration: fusion base score plus consistency,
//! rhetorical, and verification terms, mapped to a three-way verdict.
//!
//! Every additive term is computed even when it ends up zero, so the
//! explanation schema is complete on every request. Penalty terms may stack
//! (two year-based penalties can both fire on the same text); each one is
//! surfaced separately in the explanation so tests can assert on the
//! decomposition rather than the final number.

use tracing::{info, warn};

use crate::consistency::{mentions_year, ConsistencyReport};
use crate::fusion::FusionResult;
use crate::rhetorical::RhetoricalFeatures;
use crate::verdict::{clamp01, ExplanationRecord, FinalPrediction, KeyFactor, Verdict};
use crate::verification::VerificationReport;
use crate::weights::CalibrationWeights;

/// Adjustment terms above this magnitude earn a key-factor tag.
const KEY_FACTOR_TERM_CUTOFF: f32 = 0.1;
/// Loaded language tags at a lower bar; its ratios are small by construction.
const KEY_FACTOR_LOADED_CUTOFF: f32 = 0.05;
/// A base fusion score above this is itself worth a tag.
const KEY_FACTOR_BASELINE_CUTOFF: f32 = 0.7;

/// Combine all signals into the final prediction.
///
/// `verification` is the report as the engine decided to present it: `None`
/// when verification is disabled or a failed report is being treated as
/// neutral. `text` is consulted only for the years-mentioned check.
#[allow(clippy::too_many_arguments)]
pub fn calibrate(
    fusion: &FusionResult,
    consistency: &ConsistencyReport,
    rhetorical: &RhetoricalFeatures,
    verification: Option<&VerificationReport>,
    text: &str,
    w: &CalibrationWeights,
    verification_weight: f32,
    threshold: f32,
) -> FinalPrediction {
    let base = fusion.fake_probability;
    let mut explanation = ExplanationRecord::baseline(base);

    // (1) consistency term, with stacking temporal penalties
    let temporal_score = consistency.temporal.score;
    let mut consistency_adjustment = (1.0 - consistency.overall_score) * w.consistency_gap;
    if temporal_score < w.severe_temporal_cutoff {
        let penalty = (1.0 - temporal_score) * w.severe_temporal_gap;
        consistency_adjustment += penalty;
        warn!(temporal_score, penalty, "severe temporal penalty applied");
    }
    if temporal_score < w.anachronism_cutoff {
        consistency_adjustment += w.anachronism_flat;
        warn!(temporal_score, penalty = w.anachronism_flat, "anachronism penalty applied");
    }
    explanation.consistency_adjustment = consistency_adjustment;

    // (2) rhetorical term
    let rhetorical_adjustment = rhetorical.loaded_language.total() * w.loaded_language;
    explanation.rhetorical_adjustment = rhetorical_adjustment;

    // (3)-(5) verification terms
    let mut verification_adjustment = 0.0;
    let mut contradiction_penalty = 0.0;
    let mut verification_boost = 0.0;
    if let Some(report) = verification {
        let score = report.overall_score;
        let coverage = report.coverage;
        let claims_ratio = report.claims_ratio();

        verification_adjustment =
            ((1.0 - score) * w.unverified_gap + (1.0 - coverage) * w.uncovered_gap)
                * verification_weight;

        if score < w.low_score_cutoff || coverage < w.low_coverage_cutoff {
            contradiction_penalty += w.low_verification_penalty * verification_weight;
            warn!(score, coverage, "low verification penalty applied");
        }
        if coverage >= w.claim_gap_min_coverage
            && score >= w.claim_gap_min_score
            && claims_ratio < w.claim_gap_max_ratio
        {
            contradiction_penalty += w.claim_gap_penalty * verification_weight;
            warn!(coverage, claims_ratio, "claim-gap contradiction penalty applied");
        }
        if mentions_year(text) && claims_ratio < w.year_claim_max_ratio {
            contradiction_penalty += w.year_claim_penalty * verification_weight;
            warn!(claims_ratio, "year-claim contradiction penalty applied");
        }

        if score >= w.strong_boost_min_score {
            verification_boost = -w.strong_boost;
            info!(score, boost = verification_boost, "high verification boost");
        } else if coverage >= w.coverage_boost_min_coverage && score >= w.coverage_boost_min_score {
            verification_boost = -w.coverage_boost;
            info!(coverage, score, boost = verification_boost, "high coverage boost");
        }

        explanation.verification_details = Some(report.summary());
    }
    explanation.verification_adjustment = verification_adjustment;
    explanation.contradiction_penalty = contradiction_penalty;
    explanation.verification_boost = verification_boost;

    let final_score = clamp01(
        base + consistency_adjustment
            + rhetorical_adjustment
            + verification_adjustment
            + contradiction_penalty
            + verification_boost,
    );

    // Sharpened distance-from-center confidence, bumped when significant
    // adjustments were made.
    let mut confidence = ((final_score - 0.5).abs() * 2.0).powf(w.confidence_power);
    if explanation.total_adjustment_magnitude() > w.adjusted_confidence_cutoff {
        confidence += w.adjusted_confidence_bonus;
    }
    let confidence = clamp01(confidence);

    explanation.final_score = final_score;
    explanation.confidence = confidence;

    // Symbolic tags for the dominant terms.
    if consistency_adjustment > KEY_FACTOR_TERM_CUTOFF {
        explanation.key_factors.push(KeyFactor::InconsistentInformation);
    }
    if temporal_score < w.severe_temporal_cutoff {
        explanation.key_factors.push(KeyFactor::SevereTemporalError);
    }
    if rhetorical_adjustment > KEY_FACTOR_LOADED_CUTOFF {
        explanation.key_factors.push(KeyFactor::LoadedLanguage);
    }
    if contradiction_penalty > 0.0 {
        explanation.key_factors.push(KeyFactor::ExtremelyLowVerification);
    } else if verification_adjustment > KEY_FACTOR_TERM_CUTOFF {
        explanation.key_factors.push(KeyFactor::LowVerification);
    }
    if verification_boost < -KEY_FACTOR_TERM_CUTOFF {
        explanation.key_factors.push(KeyFactor::HighVerification);
    }
    if base > KEY_FACTOR_BASELINE_CUTOFF {
        explanation.key_factors.push(KeyFactor::BaselineDetection);
    }

    FinalPrediction::new(
        verdict_for(final_score, w),
        final_score,
        confidence,
        explanation,
        threshold,
    )
}

/// Band mapping, boundary-inclusive on both sides.
pub fn verdict_for(fake_probability: f32, w: &CalibrationWeights) -> Verdict {
    if fake_probability >= w.fake_band {
        Verdict::Fake
    } else if fake_probability <= w.real_band {
        Verdict::Real
    } else {
        Verdict::Misleading
    }
}
