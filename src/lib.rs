// src/lib.rs
// Public library surface: signal fusion and calibration for fake-news
// detection. Pure library crate; callers supply detector scores and an
// optional verification provider, the engine returns a calibrated verdict
// with a full additive-term explanation.

pub mod calibrate;
pub mod config;
pub mod consistency;
pub mod engine;
pub mod fusion;
pub mod rhetorical;
pub mod signals;
pub mod verdict;
pub mod verification;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::config::DetectionConfig;
pub use crate::engine::{DetectionEngine, Evaluation};
pub use crate::fusion::{FusionClassifier, FusionResult};
pub use crate::rhetorical::{LinguisticAnalyzer, RhetoricalFeatures};
pub use crate::signals::{DetectorSignal, Prediction, RawSignalBundle};
pub use crate::verdict::{ExplanationRecord, FinalPrediction, KeyFactor, Verdict};
pub use crate::verification::{
    VerificationProvider, VerificationReport, DEFAULT_VERIFICATION_DEADLINE,
};
pub use crate::weights::EngineWeights;
