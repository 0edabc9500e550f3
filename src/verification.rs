//! verification.rs — External fact-verification contract and the fast-path gate.
//!
//! The engine never talks to a search API itself: a `VerificationProvider`
//! collaborator returns a `VerificationReport`, acquired through
//! `verify_with_deadline` so a slow third party can never starve the request
//! path. A timed-out or failed call resolves to a *failed* report
//! (`overall_score=0, coverage=0, error set`) — deliberately not the 0.5
//! neutral used elsewhere; see `DetectionConfig::failed_verification_as_neutral`
//! for the configurable interpretation.
//!
//! The gate short-circuits the whole pipeline when verification evidence is
//! already decisive, saving the cost of expensive model analysis.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::verdict::{
    clamp01, ExplanationRecord, FinalPrediction, KeyFactor, Verdict, VerificationSummary,
};
use crate::weights::FastPathThresholds;

/// Hard deadline for acquiring a verification report.
pub const DEFAULT_VERIFICATION_DEADLINE: Duration = Duration::from_secs(10);

/// One entity looked up against the external knowledge source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCheck {
    pub entity: String,
    pub exists: bool,
    pub confidence: f32,
}

/// One claim checked against the external knowledge source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimCheck {
    pub claim: String,
    pub verified: bool,
    pub verdict: String,
}

/// Result of checking the text's entities and claims externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub overall_score: f32,
    pub coverage: f32,
    pub entities_checked: u32,
    pub entities_found: u32,
    pub claims_checked: u32,
    pub claims_verified: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_results: Vec<EntityCheck>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claim_results: Vec<ClaimCheck>,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationReport {
    /// Sentinel for a timed-out or failed verification call. Scores are
    /// zeroed, so the full path reads this as strongly unverified input.
    pub fn failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            overall_score: 0.0,
            coverage: 0.0,
            entities_checked: 0,
            entities_found: 0,
            claims_checked: 0,
            claims_verified: 0,
            entity_results: Vec::new(),
            claim_results: Vec::new(),
            provider: provider.into(),
            error: Some(reason.into()),
        }
    }

    /// Verified-claims ratio; 0 when nothing was checked.
    pub fn claims_ratio(&self) -> f32 {
        if self.claims_checked == 0 {
            0.0
        } else {
            self.claims_verified as f32 / self.claims_checked as f32
        }
    }

    /// Found-entities ratio; 0 when nothing was checked.
    pub fn entities_ratio(&self) -> f32 {
        if self.entities_checked == 0 {
            0.0
        } else {
            self.entities_found as f32 / self.entities_checked as f32
        }
    }

    /// The numbers echoed into explanations.
    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary {
            verification_score: self.overall_score,
            coverage: self.coverage,
            entities_found: self.entities_found,
            entities_checked: self.entities_checked,
            claims_verified: self.claims_verified,
            claims_checked: self.claims_checked,
        }
    }
}

/// External verification collaborator (web search, knowledge base, ...).
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    async fn verify(&self, text: &str) -> anyhow::Result<VerificationReport>;
    /// Provider name for diagnostics and the report's `provider` field.
    fn provider_name(&self) -> &'static str;
}

/// Acquire a report under a hard deadline. Timeouts and provider errors never
/// propagate: both resolve to `VerificationReport::failed`.
pub async fn verify_with_deadline(
    provider: &dyn VerificationProvider,
    text: &str,
    deadline: Duration,
) -> VerificationReport {
    match tokio::time::timeout(deadline, provider.verify(text)).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            warn!(provider = provider.provider_name(), error = %e, "verification call failed");
            VerificationReport::failed(provider.provider_name(), e.to_string())
        }
        Err(_) => {
            warn!(
                provider = provider.provider_name(),
                deadline_secs = deadline.as_secs_f32(),
                "verification call timed out"
            );
            VerificationReport::failed(provider.provider_name(), "timeout")
        }
    }
}

/// Short-circuit gate over a verification report.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastPathGate {
    pub thresholds: FastPathThresholds,
}

impl FastPathGate {
    pub fn new(thresholds: FastPathThresholds) -> Self {
        Self { thresholds }
    }

    /// Whether the report alone is decisive enough to bypass the pipeline.
    pub fn fires(&self, report: &VerificationReport) -> bool {
        let t = &self.thresholds;
        report.error.is_none()
            && report.overall_score >= t.min_overall_score
            && report.coverage >= t.min_coverage
            && report.claims_ratio() >= t.min_claims_ratio
            && report.entities_ratio() >= t.min_entities_ratio
            && report.claims_checked >= t.min_claims_checked
            && report.entities_checked >= t.min_entities_checked
    }

    /// Produce the abbreviated verdict when the gate fires, `None` otherwise.
    ///
    /// The result carries the full additive-term schema of the calibrator with
    /// all non-verification terms zeroed, so explanation consumers never need
    /// to branch on which path ran.
    pub fn try_short_circuit(
        &self,
        report: &VerificationReport,
        threshold_used: f32,
    ) -> Option<FinalPrediction> {
        if !self.fires(report) {
            return None;
        }
        let t = &self.thresholds;

        let fake_probability =
            (t.prob_base - (report.overall_score - t.min_overall_score) * t.prob_slope).max(0.0);

        let mut confidence = ((fake_probability - 0.5).abs() * 2.0).powf(1.5);
        if report.overall_score > t.min_overall_score {
            confidence += t.confidence_bonus;
        }
        let confidence = clamp01(confidence);

        let reason = format!(
            "verification decisive (score: {:.2}, coverage: {:.2}, claims: {}/{}, entities: {}/{})",
            report.overall_score,
            report.coverage,
            report.claims_verified,
            report.claims_checked,
            report.entities_found,
            report.entities_checked
        );
        info!(
            provider = %report.provider,
            score = report.overall_score,
            coverage = report.coverage,
            "fast path fired, skipping full analysis"
        );

        let mut explanation = ExplanationRecord::baseline(fake_probability);
        explanation.verification_boost =
            -(0.35 + (report.overall_score - t.min_overall_score) * 0.4);
        explanation.final_score = fake_probability;
        explanation.confidence = confidence;
        explanation.key_factors =
            vec![KeyFactor::HighVerification, KeyFactor::VerificationFastPath];
        explanation.fast_path_reason = Some(reason);
        explanation.verification_details = Some(report.summary());

        Some(FinalPrediction::new(
            Verdict::Real,
            fake_probability,
            confidence,
            explanation,
            threshold_used,
        ))
    }
}
