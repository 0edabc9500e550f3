//! signals.rs — Contract for upstream detector outputs.
//!
//! One `DetectorSignal` per upstream classifier, collected into a
//! `RawSignalBundle` with a fixed, named slot per detector family. The bundle
//! is produced once per request by external collaborators (the detector pool)
//! and is immutable once handed to the engine. Absent slots and entries with
//! `error` set are tolerated everywhere downstream.

use serde::{Deserialize, Serialize};

/// What a single detector claims about the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Fake,
    Real,
    Skipped,
    Unknown,
}

/// Output of one upstream detector.
///
/// `fake_score`/`real_score` are in [0,1] when present. `sensitivity` is the
/// generative-text detector's raw statistic on its native 0–10 scale; it is
/// normalized inside the fusion step but consumed raw by the tier bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSignal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_score: Option<f32>,
    pub confidence: f32,
    pub prediction: Prediction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectorSignal {
    /// A detector that produced a score.
    pub fn scored(fake_score: f32, confidence: f32, prediction: Prediction) -> Self {
        Self {
            fake_score: Some(fake_score.clamp(0.0, 1.0)),
            real_score: Some(1.0 - fake_score.clamp(0.0, 1.0)),
            confidence: confidence.clamp(0.0, 1.0),
            prediction,
            sensitivity: None,
            error: None,
        }
    }

    /// A generative-text detector: raw sensitivity on the 0–10 scale plus a
    /// binary generated/not-generated call.
    pub fn generative(sensitivity: f32, is_generated: bool, confidence: f32) -> Self {
        Self {
            fake_score: None,
            real_score: None,
            confidence: confidence.clamp(0.0, 1.0),
            prediction: if is_generated {
                Prediction::Fake
            } else {
                Prediction::Real
            },
            sensitivity: Some(sensitivity),
            error: None,
        }
    }

    /// A detector that ran but declined to judge.
    pub fn skipped() -> Self {
        Self {
            fake_score: None,
            real_score: None,
            confidence: 0.0,
            prediction: Prediction::Skipped,
            sensitivity: None,
            error: None,
        }
    }

    /// A detector that failed. Numeric fields default to the neutral 0.5 so
    /// accidental reads degrade toward uncertainty instead of a verdict.
    pub fn errored(reason: impl Into<String>) -> Self {
        Self {
            fake_score: Some(0.5),
            real_score: Some(0.5),
            confidence: 0.5,
            prediction: Prediction::Unknown,
            sensitivity: None,
            error: Some(reason.into()),
        }
    }

    /// Whether this entry is usable for feature extraction. Skipped and
    /// errored detectors are excluded so their slots degrade to the neutral
    /// default downstream.
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && self.prediction != Prediction::Skipped
    }
}

/// Per-request collection of detector outputs, one named slot per family.
///
/// A named struct instead of a string-keyed map: which detectors exist, and in
/// which order they feed the feature vector, is a compile-time contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSignalBundle {
    /// Style/stylometry classifier (e.g. a fine-tuned transformer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<DetectorSignal>,
    /// Generative-text detector (perturbation sensitivity, 0–10 scale).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generative: Option<DetectorSignal>,
    /// Token-rank detector (high-probability-token ratio / average rank prob).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_rank: Option<DetectorSignal>,
    /// Zero-shot topical classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_shot: Option<DetectorSignal>,
    /// Image-text consistency checker (multimodal inputs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_text: Option<DetectorSignal>,
}

impl RawSignalBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usable slot accessor: `None` when the slot is absent or errored.
    pub(crate) fn usable(slot: &Option<DetectorSignal>) -> Option<&DetectorSignal> {
        slot.as_ref().filter(|s| s.is_usable())
    }
}
