//! Per-request detection configuration.
//!
//! Supplied by the caller alongside the text and signal bundle; the engine
//! never mutates it. Toggles gate whole sub-analyses: a disabled sub-analysis
//! contributes its neutral default downstream, so turning everything off
//! collapses the final score to the bare fusion score.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Run the verification fast path and the verification-based calibration terms.
    pub use_verification: bool,
    /// Compute rhetorical features (emotional/loaded/readability/linguistic).
    pub use_rhetorical: bool,
    /// Compute temporal/spatial/logical consistency.
    pub use_consistency: bool,
    /// Caller's decision threshold, echoed back in the result.
    pub threshold: f32,
    /// Scales the verification adjustment and contradiction penalties.
    pub verification_weight: f32,
    /// Treat a failed/timed-out verification report as absent (neutral)
    /// instead of strongly negative evidence. Off by default: the reference
    /// behavior penalizes a failed report via the zeroed score/coverage, which
    /// differs from the 0.5 "unknown" convention used elsewhere.
    pub failed_verification_as_neutral: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            use_verification: true,
            use_rhetorical: true,
            use_consistency: true,
            threshold: 0.5,
            verification_weight: 1.0,
            failed_verification_as_neutral: false,
        }
    }
}

impl DetectionConfig {
    /// All sub-analyses off: the final score equals the fusion base score.
    pub fn fusion_only() -> Self {
        Self {
            use_verification: false,
            use_rhetorical: false,
            use_consistency: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let c = DetectionConfig::default();
        assert!(c.use_verification && c.use_rhetorical && c.use_consistency);
        assert!((c.threshold - 0.5).abs() < 1e-6);
        assert!((c.verification_weight - 1.0).abs() < 1e-6);
        assert!(!c.failed_verification_as_neutral);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: DetectionConfig = serde_json::from_str(r#"{"use_rhetorical": false}"#).unwrap();
        assert!(!c.use_rhetorical);
        assert!(c.use_verification);
        assert!((c.verification_weight - 1.0).abs() < 1e-6);
    }
}
