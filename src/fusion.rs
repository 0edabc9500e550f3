//! fusion.rs — Assembles the fixed-order feature vector and computes the base
//! fake probability.
//!
//! The vector order is a compile-time contract (`FeatureId`), not a runtime
//! accident: detector pairs first (style, generative, token-rank, zero-shot,
//! image-text), then 5 emotional ratios, 5 loaded-language ratios, 3
//! readability metrics, 5 linguistic-pattern ratios. Errored detectors are
//! skipped; every entry carries its id so the vector is self-describing for
//! debugging and for plugging in a trained classifier later.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rhetorical::RhetoricalFeatures;
use crate::signals::{Prediction, RawSignalBundle};
use crate::verdict::clamp01;
use crate::weights::FusionWeights;

/// Every feature the fusion step can emit, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    StyleFakeScore,
    StyleConfidence,
    /// Raw generative-detector sensitivity (0–10 scale before normalization).
    GenerativeSensitivity,
    GenerativeFlag,
    /// Token-rank detector: ratio of high-probability tokens (in `fake_score`).
    TokenRankHighRatio,
    /// Token-rank detector: average token probability (in `confidence`).
    TokenRankAvgProb,
    ZeroShotFakeScore,
    ZeroShotConfidence,
    ImageTextConsistency,
    ImageTextFlag,
    EmotionalPositive,
    EmotionalNegative,
    EmotionalFear,
    EmotionalAnger,
    EmotionalExaggeration,
    LoadedConspiracy,
    LoadedUrgency,
    LoadedAuthority,
    LoadedVagueSources,
    LoadedEmotionalTriggers,
    FleschReadingEase,
    AvgSentenceLength,
    ComplexWordRatio,
    EntityDiversity,
    PronounRatio,
    AdjectiveRatio,
    ComplexSentenceRatio,
    PassiveVoiceRatio,
}

/// Named feature vector in fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub entries: Vec<(FeatureId, f32)>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: FeatureId) -> Option<f32> {
        self.entries.iter().find(|(fid, _)| *fid == id).map(|(_, v)| *v)
    }

    fn push(&mut self, id: FeatureId, value: f32) {
        self.entries.push((id, value));
    }
}

/// How the base probability was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
    TrainedFusion,
    WeightedHeuristic,
}

/// Base score before calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub fake_probability: f32,
    pub confidence: f32,
    pub method: FusionMethod,
    /// Set when the generative-detector tier bonus was strong enough to call
    /// the text machine-generated.
    pub ai_generated: bool,
    pub features_used: usize,
}

impl FusionResult {
    /// Neutral result for a caller that supplies no usable signals at all.
    pub fn neutral() -> Self {
        Self {
            fake_probability: 0.5,
            confidence: 0.0,
            method: FusionMethod::WeightedHeuristic,
            ai_generated: false,
            features_used: 0,
        }
    }
}

/// A trained model plugged in over the feature vector. When present, it
/// replaces the weighted heuristic.
pub trait FusionClassifier: Send + Sync {
    /// Returns `(fake_probability, confidence)`, both in [0,1].
    fn predict(&self, vector: &FeatureVector) -> (f32, f32);
}

/// Build the fixed-order vector from detector outputs and rhetorical features.
pub fn build_vector(bundle: &RawSignalBundle, rhetorical: &RhetoricalFeatures) -> FeatureVector {
    let mut v = FeatureVector::default();

    if let Some(s) = RawSignalBundle::usable(&bundle.style) {
        v.push(FeatureId::StyleFakeScore, s.fake_score.unwrap_or(0.5));
        v.push(FeatureId::StyleConfidence, s.confidence);
    }
    if let Some(s) = RawSignalBundle::usable(&bundle.generative) {
        v.push(FeatureId::GenerativeSensitivity, s.sensitivity.unwrap_or(0.0));
        v.push(
            FeatureId::GenerativeFlag,
            if s.prediction == Prediction::Fake { 1.0 } else { 0.0 },
        );
    }
    if let Some(s) = RawSignalBundle::usable(&bundle.token_rank) {
        v.push(FeatureId::TokenRankHighRatio, s.fake_score.unwrap_or(0.0));
        v.push(FeatureId::TokenRankAvgProb, s.confidence);
    }
    if let Some(s) = RawSignalBundle::usable(&bundle.zero_shot) {
        v.push(FeatureId::ZeroShotFakeScore, s.fake_score.unwrap_or(0.5));
        v.push(FeatureId::ZeroShotConfidence, s.confidence);
    }
    if let Some(s) = RawSignalBundle::usable(&bundle.image_text) {
        v.push(FeatureId::ImageTextConsistency, s.fake_score.unwrap_or(0.5));
        v.push(
            FeatureId::ImageTextFlag,
            if s.prediction == Prediction::Real { 1.0 } else { 0.0 },
        );
    }

    let e = &rhetorical.emotional_language;
    v.push(FeatureId::EmotionalPositive, e.positive);
    v.push(FeatureId::EmotionalNegative, e.negative);
    v.push(FeatureId::EmotionalFear, e.fear);
    v.push(FeatureId::EmotionalAnger, e.anger);
    v.push(FeatureId::EmotionalExaggeration, e.exaggeration);

    let l = &rhetorical.loaded_language;
    v.push(FeatureId::LoadedConspiracy, l.conspiracy);
    v.push(FeatureId::LoadedUrgency, l.urgency);
    v.push(FeatureId::LoadedAuthority, l.authority);
    v.push(FeatureId::LoadedVagueSources, l.vague_sources);
    v.push(FeatureId::LoadedEmotionalTriggers, l.emotional_triggers);

    let r = &rhetorical.readability;
    v.push(FeatureId::FleschReadingEase, r.flesch_reading_ease);
    v.push(FeatureId::AvgSentenceLength, r.avg_sentence_length);
    v.push(FeatureId::ComplexWordRatio, r.complex_word_ratio);

    let p = rhetorical.linguistic_patterns.unwrap_or_default();
    v.push(FeatureId::EntityDiversity, p.entity_diversity);
    v.push(FeatureId::PronounRatio, p.pronoun_ratio);
    v.push(FeatureId::AdjectiveRatio, p.adjective_ratio);
    v.push(FeatureId::ComplexSentenceRatio, p.complex_sentence_ratio);
    v.push(FeatureId::PassiveVoiceRatio, p.passive_voice_ratio);

    v
}

/// Normalize a raw feature into [0,1]: values on a 0–10 scale are divided by
/// 10; anything still out of range resets to the 0.5 neutral.
fn normalize(val: f32) -> f32 {
    let val = if val > 1.0 && val < 10.0 { val / 10.0 } else { val };
    if (0.0..=1.0).contains(&val) {
        val
    } else {
        0.5
    }
}

/// Weight assigned to a feature by the heuristic table; features outside the
/// table carry no weight.
fn weight_for(id: FeatureId, w: &FusionWeights) -> Option<f32> {
    use FeatureId::*;
    match id {
        StyleFakeScore => Some(w.style_fake_score),
        StyleConfidence => Some(w.style_confidence),
        GenerativeSensitivity => Some(w.generative_sensitivity),
        GenerativeFlag => Some(w.generative_flag),
        TokenRankHighRatio => Some(w.token_rank_high_ratio),
        TokenRankAvgProb => Some(w.token_rank_avg_prob),
        ZeroShotFakeScore => Some(w.zero_shot_fake_score),
        ZeroShotConfidence => Some(w.zero_shot_confidence),
        ImageTextConsistency => Some(w.image_text_consistency),
        ImageTextFlag => Some(w.image_text_flag),
        EmotionalPositive => Some(w.emotional_positive),
        EmotionalNegative => Some(w.emotional_negative),
        _ => None,
    }
}

const WEIGHTED_IDS: &[FeatureId] = &[
    FeatureId::StyleFakeScore,
    FeatureId::StyleConfidence,
    FeatureId::GenerativeSensitivity,
    FeatureId::GenerativeFlag,
    FeatureId::TokenRankHighRatio,
    FeatureId::TokenRankAvgProb,
    FeatureId::ZeroShotFakeScore,
    FeatureId::ZeroShotConfidence,
    FeatureId::ImageTextConsistency,
    FeatureId::ImageTextFlag,
    FeatureId::EmotionalPositive,
    FeatureId::EmotionalNegative,
];

/// Compute the base fake probability: trained classifier when available,
/// otherwise the deterministic weighted heuristic.
pub fn fuse(
    bundle: &RawSignalBundle,
    rhetorical: &RhetoricalFeatures,
    weights: &FusionWeights,
    classifier: Option<&dyn FusionClassifier>,
) -> FusionResult {
    let vector = build_vector(bundle, rhetorical);

    if let Some(model) = classifier {
        let (prob, confidence) = model.predict(&vector);
        return FusionResult {
            fake_probability: clamp01(prob),
            confidence: clamp01(confidence),
            method: FusionMethod::TrainedFusion,
            ai_generated: false,
            features_used: vector.len(),
        };
    }

    weighted_heuristic(bundle, &vector, weights)
}

/// Deterministic fallback: weighted sum over the fixed table, with the
/// generative sensitivity dominating by design, plus a tiered bonus on the
/// raw (pre-normalization) sensitivity.
fn weighted_heuristic(
    bundle: &RawSignalBundle,
    vector: &FeatureVector,
    weights: &FusionWeights,
) -> FusionResult {
    let mut acc = 0.0f32;
    for id in WEIGHTED_IDS {
        let w = weight_for(*id, weights).unwrap_or(0.0);
        // A feature missing from the vector (absent/errored detector)
        // contributes the 0.5 neutral, degrading toward uncertainty.
        let val = vector.get(*id).map(normalize).unwrap_or(0.5);
        acc += w * val;
    }
    let mut score = acc / weights.mass();

    let raw_sensitivity = RawSignalBundle::usable(&bundle.generative)
        .and_then(|s| s.sensitivity)
        .unwrap_or(0.0);

    let mut ai_generated = false;
    if let Some(tier) = weights.tier_for(raw_sensitivity) {
        debug!(
            sensitivity = raw_sensitivity,
            bonus = tier.bonus,
            "generative sensitivity tier bonus applied"
        );
        score += tier.bonus;
        ai_generated = tier.flags_generated;
    }

    let fake_probability = clamp01(score);
    FusionResult {
        fake_probability,
        confidence: (fake_probability - 0.5).abs() * 2.0,
        method: FusionMethod::WeightedHeuristic,
        ai_generated,
        features_used: vector.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::DetectorSignal;

    fn full_bundle() -> RawSignalBundle {
        RawSignalBundle {
            style: Some(DetectorSignal::scored(0.6, 0.9, Prediction::Fake)),
            generative: Some(DetectorSignal::generative(4.6, true, 0.8)),
            token_rank: Some(DetectorSignal::scored(0.4, 0.7, Prediction::Real)),
            zero_shot: Some(DetectorSignal::scored(0.55, 0.6, Prediction::Fake)),
            image_text: Some(DetectorSignal::scored(0.8, 0.9, Prediction::Real)),
        }
    }

    #[test]
    fn vector_order_is_fixed() {
        let v = build_vector(&full_bundle(), &RhetoricalFeatures::default());
        let ids: Vec<FeatureId> = v.entries.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            &ids[..6],
            &[
                FeatureId::StyleFakeScore,
                FeatureId::StyleConfidence,
                FeatureId::GenerativeSensitivity,
                FeatureId::GenerativeFlag,
                FeatureId::TokenRankHighRatio,
                FeatureId::TokenRankAvgProb,
            ]
        );
        // 10 detector fields + 18 rhetorical fields
        assert_eq!(v.len(), 28);
        assert_eq!(ids.last(), Some(&FeatureId::PassiveVoiceRatio));
    }

    #[test]
    fn errored_detector_is_skipped() {
        let mut bundle = full_bundle();
        bundle.style = Some(DetectorSignal::errored("model not loaded"));
        let v = build_vector(&bundle, &RhetoricalFeatures::default());
        assert!(v.get(FeatureId::StyleFakeScore).is_none());
        assert_eq!(v.len(), 26);
    }

    #[test]
    fn normalize_maps_ten_scale_and_resets_outliers() {
        assert!((normalize(4.6) - 0.46).abs() < 1e-6);
        assert!((normalize(0.7) - 0.7).abs() < 1e-6);
        assert!((normalize(42.0) - 0.5).abs() < 1e-6);
        assert!((normalize(-1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn high_sensitivity_dominates_heuristic() {
        let bundle = RawSignalBundle {
            generative: Some(DetectorSignal::generative(6.0, true, 0.8)),
            ..RawSignalBundle::default()
        };
        let r = fuse(&bundle, &RhetoricalFeatures::default(), &FusionWeights::default(), None);
        assert_eq!(r.method, FusionMethod::WeightedHeuristic);
        assert!(r.fake_probability > 0.7, "p = {}", r.fake_probability);
        assert!(r.ai_generated);
    }

    #[test]
    fn mid_tier_bonus_does_not_flag_generated() {
        let bundle = RawSignalBundle {
            generative: Some(DetectorSignal::generative(3.9, false, 0.8)),
            ..RawSignalBundle::default()
        };
        let r = fuse(&bundle, &RhetoricalFeatures::default(), &FusionWeights::default(), None);
        assert!(!r.ai_generated);
        // Bonus applied even below the flagging tiers.
        let baseline = fuse(
            &RawSignalBundle {
                generative: Some(DetectorSignal::generative(0.0, false, 0.8)),
                ..RawSignalBundle::default()
            },
            &RhetoricalFeatures::default(),
            &FusionWeights::default(),
            None,
        );
        assert!(r.fake_probability > baseline.fake_probability);
    }

    #[test]
    fn empty_bundle_stays_near_neutral() {
        let r = fuse(
            &RawSignalBundle::default(),
            &RhetoricalFeatures::default(),
            &FusionWeights::default(),
            None,
        );
        assert!((r.fake_probability - 0.5).abs() < 0.1, "p = {}", r.fake_probability);
        assert!(r.confidence < 0.2);
        assert!(!r.ai_generated);
    }

    #[test]
    fn heuristic_confidence_tracks_distance_from_center() {
        let bundle = RawSignalBundle {
            generative: Some(DetectorSignal::generative(6.0, true, 0.8)),
            ..RawSignalBundle::default()
        };
        let r = fuse(&bundle, &RhetoricalFeatures::default(), &FusionWeights::default(), None);
        assert!((r.confidence - (r.fake_probability - 0.5).abs() * 2.0).abs() < 1e-6);
    }

    struct ConstantModel;
    impl FusionClassifier for ConstantModel {
        fn predict(&self, _vector: &FeatureVector) -> (f32, f32) {
            (0.9, 0.8)
        }
    }

    #[test]
    fn trained_classifier_takes_precedence() {
        let r = fuse(
            &full_bundle(),
            &RhetoricalFeatures::default(),
            &FusionWeights::default(),
            Some(&ConstantModel),
        );
        assert_eq!(r.method, FusionMethod::TrainedFusion);
        assert!((r.fake_probability - 0.9).abs() < 1e-6);
    }
}
