//! Declarative weight and threshold tables for fusion, calibration, and the
//! verification fast path.
//!
//! Every tunable constant of the scoring pipeline lives here, in one table per
//! adjustment category, so tests can perturb weights without touching control
//! flow. Tables load from JSON with silent fallback to built-in defaults:
//!
//! ```json
//! { "fusion": { "generative_sensitivity": 0.80 }, "calibration": {}, "fast_path": {} }
//! ```
//!
//! Missing fields keep their defaults, so a partial file is a valid override.

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

/// Weights for the deterministic weighted-heuristic fusion.
///
/// The generative-detector sensitivity dominates the normalized weight mass by
/// design; the remaining detector and rhetorical features share the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub style_fake_score: f32,
    pub style_confidence: f32,
    pub generative_sensitivity: f32,
    pub generative_flag: f32,
    pub token_rank_high_ratio: f32,
    pub token_rank_avg_prob: f32,
    pub zero_shot_fake_score: f32,
    pub zero_shot_confidence: f32,
    pub image_text_consistency: f32,
    pub image_text_flag: f32,
    pub emotional_positive: f32,
    pub emotional_negative: f32,
    /// Secondary bonus tiers keyed on the raw (0–10) generative sensitivity,
    /// checked top-down; the first tier that matches applies.
    pub ai_tiers: Vec<AiTier>,
}

/// One bonus tier for the raw generative-detector sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiTier {
    /// Tier applies when raw sensitivity is strictly above this value.
    pub min_sensitivity: f32,
    /// Additive score bonus.
    pub bonus: f32,
    /// Whether this tier is strong enough to flag `ai_generated`.
    pub flags_generated: bool,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            style_fake_score: 0.05,
            style_confidence: 0.04,
            generative_sensitivity: 0.80,
            generative_flag: 0.05,
            token_rank_high_ratio: 0.02,
            token_rank_avg_prob: 0.02,
            zero_shot_fake_score: 0.02,
            zero_shot_confidence: 0.02,
            image_text_consistency: 0.02,
            image_text_flag: 0.02,
            emotional_positive: 0.02,
            emotional_negative: 0.02,
            ai_tiers: vec![
                AiTier { min_sensitivity: 5.0, bonus: 0.20, flags_generated: true },
                AiTier { min_sensitivity: 4.2, bonus: 0.12, flags_generated: true },
                AiTier { min_sensitivity: 3.8, bonus: 0.08, flags_generated: false },
                AiTier { min_sensitivity: 3.5, bonus: 0.04, flags_generated: false },
            ],
        }
    }
}

impl FusionWeights {
    /// Total (un-normalized) weight mass. The weighted sum divides by this so
    /// table entries need not sum to 1.
    pub fn mass(&self) -> f32 {
        (self.style_fake_score
            + self.style_confidence
            + self.generative_sensitivity
            + self.generative_flag
            + self.token_rank_high_ratio
            + self.token_rank_avg_prob
            + self.zero_shot_fake_score
            + self.zero_shot_confidence
            + self.image_text_consistency
            + self.image_text_flag
            + self.emotional_positive
            + self.emotional_negative)
            .max(1e-6)
    }

    /// First matching bonus tier for a raw sensitivity value, if any.
    pub fn tier_for(&self, sensitivity: f32) -> Option<&AiTier> {
        self.ai_tiers.iter().find(|t| sensitivity > t.min_sensitivity)
    }
}

/// Weights and cutoffs for the final calibration pass.
///
/// Each group maps to one additive term of the final score; the terms are
/// independent and may stack, and every one of them is surfaced separately in
/// the explanation so tests can assert on the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationWeights {
    // -- consistency term --
    /// Penalty per unit of missing overall consistency.
    pub consistency_gap: f32,
    /// Extra penalty per unit of missing temporal consistency, applied below
    /// `severe_temporal_cutoff`.
    pub severe_temporal_gap: f32,
    pub severe_temporal_cutoff: f32,
    /// Flat penalty when temporal consistency falls below the anachronism cutoff.
    pub anachronism_flat: f32,
    pub anachronism_cutoff: f32,

    // -- rhetorical term --
    /// Multiplier on the summed loaded-language ratios.
    pub loaded_language: f32,

    // -- verification adjustment term --
    /// Penalty per unit of missing verification score.
    pub unverified_gap: f32,
    /// Penalty per unit of missing coverage.
    pub uncovered_gap: f32,

    // -- contradiction penalties (all may stack) --
    /// Applied when score < `low_score_cutoff` or coverage < `low_coverage_cutoff`.
    pub low_verification_penalty: f32,
    pub low_score_cutoff: f32,
    pub low_coverage_cutoff: f32,
    /// Applied when coverage and score are high but the claim ratio lags.
    pub claim_gap_penalty: f32,
    pub claim_gap_min_coverage: f32,
    pub claim_gap_min_score: f32,
    pub claim_gap_max_ratio: f32,
    /// Applied when the text mentions a 4-digit year and the claim ratio is
    /// not near-perfect.
    pub year_claim_penalty: f32,
    pub year_claim_max_ratio: f32,

    // -- verification boost --
    /// Subtracted when the verification score clears `strong_boost_min_score`.
    pub strong_boost: f32,
    pub strong_boost_min_score: f32,
    /// Weaker boost for high coverage with a moderate score.
    pub coverage_boost: f32,
    pub coverage_boost_min_coverage: f32,
    pub coverage_boost_min_score: f32,

    // -- verdict bands and confidence shaping --
    /// Inclusive lower bound of the "fake" band.
    pub fake_band: f32,
    /// Inclusive upper bound of the "real" band.
    pub real_band: f32,
    /// Exponent sharpening the distance-from-center confidence curve.
    pub confidence_power: f32,
    /// Confidence bump when the total adjustment magnitude is significant.
    pub adjusted_confidence_bonus: f32,
    pub adjusted_confidence_cutoff: f32,
}

impl Default for CalibrationWeights {
    fn default() -> Self {
        Self {
            consistency_gap: 0.25,
            severe_temporal_gap: 0.25,
            severe_temporal_cutoff: 0.5,
            anachronism_flat: 0.3,
            anachronism_cutoff: 0.2,
            loaded_language: 0.1,
            unverified_gap: 0.20,
            uncovered_gap: 0.15,
            low_verification_penalty: 0.15,
            low_score_cutoff: 0.5,
            low_coverage_cutoff: 0.6,
            claim_gap_penalty: 0.15,
            claim_gap_min_coverage: 0.8,
            claim_gap_min_score: 0.7,
            claim_gap_max_ratio: 0.7,
            year_claim_penalty: 0.15,
            year_claim_max_ratio: 0.9,
            strong_boost: 0.30,
            strong_boost_min_score: 0.5,
            coverage_boost: 0.15,
            coverage_boost_min_coverage: 0.75,
            coverage_boost_min_score: 0.4,
            fake_band: 0.6,
            real_band: 0.4,
            confidence_power: 1.5,
            adjusted_confidence_bonus: 0.1,
            adjusted_confidence_cutoff: 0.1,
        }
    }
}

/// Gate thresholds for the verification fast path. The gate fires only when
/// every condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastPathThresholds {
    pub min_overall_score: f32,
    pub min_coverage: f32,
    pub min_claims_ratio: f32,
    pub min_entities_ratio: f32,
    pub min_claims_checked: u32,
    pub min_entities_checked: u32,
    /// Base fake probability at exactly `min_overall_score`.
    pub prob_base: f32,
    /// Slope reducing the probability as the score rises above the minimum.
    pub prob_slope: f32,
    /// Confidence bump for a score strictly above `min_overall_score`.
    pub confidence_bonus: f32,
}

impl Default for FastPathThresholds {
    fn default() -> Self {
        Self {
            min_overall_score: 0.75,
            min_coverage: 0.65,
            min_claims_ratio: 0.75,
            min_entities_ratio: 0.70,
            min_claims_checked: 2,
            min_entities_checked: 2,
            prob_base: 0.15,
            prob_slope: 0.3,
            confidence_bonus: 0.15,
        }
    }
}

/// All tables in one deserializable bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineWeights {
    pub fusion: FusionWeights,
    pub calibration: CalibrationWeights,
    pub fast_path: FastPathThresholds,
}

impl EngineWeights {
    /// Load tables from a JSON file. Missing fields keep defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Load from a file if it exists and parses; defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_default()
    }
}
