//! engine.rs — Pipeline entry point.
//!
//! `DetectionEngine` owns the weight tables and the optional collaborators
//! (trained fusion classifier, linguistic analyzer) and runs the whole
//! pipeline in one synchronous pass: fast-path gate, rhetorical and
//! consistency extraction, signal fusion, final calibration. Asynchrony lives
//! only at the edge, in `evaluate_with_provider`, which acquires the
//! verification report under a deadline before delegating to `evaluate`.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::calibrate::calibrate;
use crate::config::DetectionConfig;
use crate::consistency::ConsistencyReport;
use crate::fusion::{self, FusionClassifier, FusionResult};
use crate::rhetorical::{LinguisticAnalyzer, RhetoricalFeatures};
use crate::signals::RawSignalBundle;
use crate::verdict::FinalPrediction;
use crate::verification::{
    verify_with_deadline, FastPathGate, VerificationProvider, VerificationReport,
    DEFAULT_VERIFICATION_DEADLINE,
};
use crate::weights::EngineWeights;

/// Full audit record of one evaluation: the final prediction plus every
/// intermediate that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub prediction: FinalPrediction,
    pub fusion: FusionResult,
    pub rhetorical: RhetoricalFeatures,
    pub consistency: ConsistencyReport,
    /// The report as received, before any neutral-on-failure reinterpretation.
    /// Serialized only through `to_compat_json`, under its mirrored keys.
    #[serde(skip_serializing)]
    pub verification: Option<VerificationReport>,
    /// Whether the verification fast path produced the prediction.
    pub fast_path: bool,
}

impl Evaluation {
    /// Canonical JSON form. The verification block is mirrored under both the
    /// legacy `wikipedia_verification` key and the current
    /// `search_verification` key, built from the same report in one
    /// serialization step so the two can never drift apart.
    pub fn to_compat_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut root = serde_json::to_value(self)?;
        if let (Some(report), Some(map)) = (&self.verification, root.as_object_mut()) {
            let block = serde_json::to_value(report)?;
            map.insert("wikipedia_verification".to_string(), block.clone());
            map.insert("search_verification".to_string(), block);
        }
        Ok(root)
    }
}

/// The fusion and calibration pipeline.
pub struct DetectionEngine {
    weights: EngineWeights,
    gate: FastPathGate,
    classifier: Option<Box<dyn FusionClassifier>>,
    analyzer: Option<Box<dyn LinguisticAnalyzer>>,
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(EngineWeights::default())
    }
}

impl DetectionEngine {
    pub fn new(weights: EngineWeights) -> Self {
        let gate = FastPathGate::new(weights.fast_path);
        Self {
            weights,
            gate,
            classifier: None,
            analyzer: None,
        }
    }

    /// Replace the weight tables (rebuilds the fast-path gate).
    pub fn with_weights(mut self, weights: EngineWeights) -> Self {
        self.gate = FastPathGate::new(weights.fast_path);
        self.weights = weights;
        self
    }

    /// Install a trained fusion classifier; it takes precedence over the
    /// weighted heuristic.
    pub fn with_classifier(mut self, classifier: Box<dyn FusionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Install a linguistic-analysis collaborator for the syntactic and NER
    /// derived rhetorical ratios.
    pub fn with_analyzer(mut self, analyzer: Box<dyn LinguisticAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn weights(&self) -> &EngineWeights {
        &self.weights
    }

    /// Run the full pipeline over one text. Synchronous and pure given its
    /// inputs: identical arguments always produce an identical `Evaluation`.
    ///
    /// Callers that already extracted rhetorical features or ran the
    /// consistency checks pass them in; `None` computes them here. A disabled
    /// toggle always wins and substitutes the neutral default.
    ///
    /// When verification is enabled and the report is decisive, the fast path
    /// answers directly and the rhetorical, consistency, and fusion stages are
    /// skipped entirely; their fields carry neutral defaults in that case.
    pub fn evaluate(
        &self,
        text: &str,
        signals: &RawSignalBundle,
        rhetorical: Option<RhetoricalFeatures>,
        consistency: Option<ConsistencyReport>,
        verification: Option<VerificationReport>,
        config: &DetectionConfig,
    ) -> Evaluation {
        if config.use_verification {
            if let Some(report) = verification.as_ref() {
                if let Some(prediction) = self.gate.try_short_circuit(report, config.threshold) {
                    info!(
                        provider = %report.provider,
                        "verification fast path answered, model analysis cost skipped"
                    );
                    return Evaluation {
                        prediction,
                        fusion: FusionResult::neutral(),
                        rhetorical: RhetoricalFeatures::default(),
                        consistency: ConsistencyReport::no_issues(),
                        verification,
                        fast_path: true,
                    };
                }
            }
        }

        let rhetorical = if config.use_rhetorical {
            rhetorical.unwrap_or_else(|| crate::rhetorical::extract(text, self.analyzer.as_deref()))
        } else {
            RhetoricalFeatures::default()
        };

        let consistency = if config.use_consistency {
            consistency.unwrap_or_else(|| crate::consistency::check(text, None))
        } else {
            ConsistencyReport::no_issues()
        };

        let fusion = fusion::fuse(
            signals,
            &rhetorical,
            &self.weights.fusion,
            self.classifier.as_deref(),
        );
        debug!(
            base = fusion.fake_probability,
            method = ?fusion.method,
            features = fusion.features_used,
            "fusion complete"
        );

        // A failed report is strongly negative evidence by default; the
        // neutral reinterpretation treats it as if verification never ran.
        let report_for_calibration = match verification.as_ref() {
            Some(_) if !config.use_verification => None,
            Some(r) if r.error.is_some() && config.failed_verification_as_neutral => {
                debug!(provider = %r.provider, "failed verification treated as neutral");
                None
            }
            other => other,
        };

        let prediction = calibrate(
            &fusion,
            &consistency,
            &rhetorical,
            report_for_calibration,
            text,
            &self.weights.calibration,
            config.verification_weight,
            config.threshold,
        );
        info!(
            verdict = ?prediction.prediction,
            fake_probability = prediction.fake_probability,
            confidence = prediction.confidence,
            "evaluation complete"
        );

        Evaluation {
            prediction,
            fusion,
            rhetorical,
            consistency,
            verification,
            fast_path: false,
        }
    }

    /// Acquire a verification report from `provider` under `deadline`, then
    /// evaluate. With verification disabled the provider is never called.
    pub async fn evaluate_with_provider(
        &self,
        text: &str,
        signals: &RawSignalBundle,
        provider: &dyn VerificationProvider,
        deadline: Duration,
        config: &DetectionConfig,
    ) -> Evaluation {
        let report = if config.use_verification {
            Some(verify_with_deadline(provider, text, deadline).await)
        } else {
            None
        };
        self.evaluate(text, signals, None, None, report, config)
    }

    /// `evaluate_with_provider` with the default deadline.
    pub async fn evaluate_with_default_deadline(
        &self,
        text: &str,
        signals: &RawSignalBundle,
        provider: &dyn VerificationProvider,
        config: &DetectionConfig,
    ) -> Evaluation {
        self.evaluate_with_provider(text, signals, provider, DEFAULT_VERIFICATION_DEADLINE, config)
            .await
    }
}
