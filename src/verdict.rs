//! verdict.rs — Final prediction, explanation record, and key-factor tags.
//!
//! The goal: a standardized, auditable output for fake/misleading/real plus
//! confidence, where every additive term that produced the final score is
//! surfaced separately so a test suite can assert on the decomposition, not
//! just the final number. Both the fast path and the full calibrator emit the
//! same schema; downstream consumers never branch on which path ran.

use serde::{Deserialize, Serialize};

/// Three-way verdict over the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Fake,
    Misleading,
    Real,
}

/// Symbolic tags naming which evidence drove the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFactor {
    InconsistentInformation,
    SevereTemporalError,
    LoadedLanguage,
    ExtremelyLowVerification,
    LowVerification,
    HighVerification,
    BaselineDetection,
    VerificationFastPath,
}

/// The exact verification numbers the calibrator (or fast path) consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub verification_score: f32,
    pub coverage: f32,
    pub entities_found: u32,
    pub entities_checked: u32,
    pub claims_verified: u32,
    pub claims_checked: u32,
}

/// Itemized breakdown of every additive term behind the final score.
///
/// All terms are present on both paths; on the fast path the non-verification
/// terms are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub base_fusion_score: f32,
    pub consistency_adjustment: f32,
    pub rhetorical_adjustment: f32,
    pub verification_adjustment: f32,
    pub contradiction_penalty: f32,
    pub verification_boost: f32,
    pub final_score: f32,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_factors: Vec<KeyFactor>,
    /// Set only when the fast path fired; records the triggering numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_path_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_details: Option<VerificationSummary>,
}

impl ExplanationRecord {
    /// All-zero skeleton around a base score; terms are filled in as they are
    /// computed so the schema is complete even when a term stays zero.
    pub fn baseline(base_fusion_score: f32) -> Self {
        Self {
            base_fusion_score,
            consistency_adjustment: 0.0,
            rhetorical_adjustment: 0.0,
            verification_adjustment: 0.0,
            contradiction_penalty: 0.0,
            verification_boost: 0.0,
            final_score: base_fusion_score,
            confidence: 0.0,
            key_factors: Vec::new(),
            fast_path_reason: None,
            verification_details: None,
        }
    }

    /// Sum of the absolute magnitudes of all adjustment terms.
    pub fn total_adjustment_magnitude(&self) -> f32 {
        self.consistency_adjustment.abs()
            + self.rhetorical_adjustment.abs()
            + self.verification_adjustment.abs()
            + self.contradiction_penalty.abs()
            + self.verification_boost.abs()
    }

    pub fn with_factor(mut self, factor: KeyFactor) -> Self {
        self.key_factors.push(factor);
        self
    }
}

/// Complete calibrated decision, the engine's primary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPrediction {
    pub prediction: Verdict,
    pub fake_probability: f32,
    pub confidence: f32,
    pub explanation: ExplanationRecord,
    pub threshold_used: f32,
}

impl FinalPrediction {
    pub fn new(
        prediction: Verdict,
        fake_probability: f32,
        confidence: f32,
        explanation: ExplanationRecord,
        threshold_used: f32,
    ) -> Self {
        Self {
            prediction,
            fake_probability: clamp01(fake_probability),
            confidence: clamp01(confidence),
            explanation,
            threshold_used,
        }
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_prediction_shape() {
        let expl = ExplanationRecord::baseline(0.42).with_factor(KeyFactor::BaselineDetection);
        let p = FinalPrediction::new(Verdict::Misleading, 0.42, 0.3, expl, 0.5);

        let v: serde_json::Value = serde_json::to_value(&p).unwrap();
        assert_eq!(v["prediction"], serde_json::json!("misleading"));

        let fp = v["fake_probability"].as_f64().unwrap();
        assert!((fp - 0.42).abs() < 1e-6, "fake_probability ~= 0.42, got {}", fp);

        // Every additive term is present even when zero.
        for key in [
            "base_fusion_score",
            "consistency_adjustment",
            "rhetorical_adjustment",
            "verification_adjustment",
            "contradiction_penalty",
            "verification_boost",
        ] {
            assert!(v["explanation"].get(key).is_some(), "missing term {}", key);
        }
        assert_eq!(
            v["explanation"]["key_factors"],
            serde_json::json!(["baseline_detection"])
        );
    }

    #[test]
    fn prediction_clamps_probabilities() {
        let p = FinalPrediction::new(Verdict::Fake, 1.4, -0.1, ExplanationRecord::baseline(1.4), 0.5);
        assert!((p.fake_probability - 1.0).abs() < 1e-6);
        assert!(p.confidence.abs() < 1e-6);
    }

    #[test]
    fn adjustment_magnitude_counts_boosts() {
        let mut e = ExplanationRecord::baseline(0.5);
        e.consistency_adjustment = 0.2;
        e.verification_boost = -0.3;
        assert!((e.total_adjustment_magnitude() - 0.5).abs() < 1e-6);
    }
}
