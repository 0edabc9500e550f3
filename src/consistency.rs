//! consistency.rs — Self-referential plausibility checks of the text's
//! temporal, spatial, and logical claims.
//!
//! Independent of external facts: this only asks whether the text agrees with
//! itself and with the calendar. Each axis starts at 1.0 and loses score per
//! detected issue; 1.0 therefore means "no issues found", not "verified".

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An axis is considered consistent above this score.
pub const CONSISTENCY_THRESHOLD: f32 = 0.3;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("year regex"));
static MONTH_OR_RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(january|february|march|april|may|june|july|august|september|october|november|december|today|yesterday|tomorrow|now|recently|lately)\b",
    )
    .expect("time keyword regex")
});

/// Vocabulary that anchors a sentence in the modern era; a medieval year next
/// to one of these is an anachronism.
const MODERN_KEYWORDS: &[&str] = &[
    "tower", "building", "constructed", "built", "completed", "technology", "internet",
    "computer", "phone", "car", "airplane",
];

static LOCATION_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z]+ (?:City|Town|State|Country|Nation))\b").expect("location regex")
});
static LOCATION_PREP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:in|at|from|to) ([A-Z][a-z]+)\b").expect("preposition regex"));

/// Contradiction shapes scanned on the lowercased text.
static CONTRADICTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(not|no|never|none)\b.*\b(always|all|every|everyone)\b").unwrap(),
            "negation_contradiction",
        ),
        (
            Regex::new(r"\b(before|after)\b.*\b(before|after)\b").unwrap(),
            "temporal_contradiction",
        ),
        (
            Regex::new(r"\b(increased|rose|grew)\b.*\b(decreased|fell|dropped)\b").unwrap(),
            "trend_contradiction",
        ),
    ]
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalConsistency {
    pub score: f32,
    pub extracted_times: Vec<String>,
    pub issues: Vec<String>,
    pub is_consistent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialConsistency {
    pub score: f32,
    pub extracted_locations: Vec<String>,
    pub issues: Vec<String>,
    pub is_consistent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalConsistency {
    pub score: f32,
    pub contradictions: Vec<String>,
    pub is_consistent: bool,
}

/// Combined self-consistency verdict: `overall_score` is the weighted average
/// 0.3·temporal + 0.3·spatial + 0.4·logical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub temporal: TemporalConsistency,
    pub spatial: SpatialConsistency,
    pub logical: LogicalConsistency,
    pub overall_score: f32,
    pub is_globally_consistent: bool,
}

impl ConsistencyReport {
    /// The all-clear report used when the check is disabled by config.
    pub fn no_issues() -> Self {
        Self {
            temporal: TemporalConsistency {
                score: 1.0,
                extracted_times: Vec::new(),
                issues: Vec::new(),
                is_consistent: true,
            },
            spatial: SpatialConsistency {
                score: 1.0,
                extracted_locations: Vec::new(),
                issues: Vec::new(),
                is_consistent: true,
            },
            logical: LogicalConsistency {
                score: 1.0,
                contradictions: Vec::new(),
                is_consistent: true,
            },
            overall_score: 1.0,
            is_globally_consistent: true,
        }
    }
}

/// Run all three axes. `image_metadata` is accepted for interface symmetry
/// with multimodal callers; the current checks are text-only.
pub fn check(text: &str, image_metadata: Option<&serde_json::Value>) -> ConsistencyReport {
    check_with_year(text, image_metadata, chrono::Utc::now().year())
}

/// Same as [`check`], with an injectable "current year" for deterministic tests.
pub fn check_with_year(
    text: &str,
    _image_metadata: Option<&serde_json::Value>,
    current_year: i32,
) -> ConsistencyReport {
    let temporal = check_temporal(text, current_year);
    let spatial = check_spatial(text);
    let logical = check_logical(text);

    let overall_score = temporal.score * 0.3 + spatial.score * 0.3 + logical.score * 0.4;

    ConsistencyReport {
        temporal,
        spatial,
        logical,
        overall_score,
        is_globally_consistent: overall_score > CONSISTENCY_THRESHOLD,
    }
}

/// Whether the text mentions any 4-digit year. Used by the calibrator's
/// year-based contradiction penalty.
pub fn mentions_year(text: &str) -> bool {
    YEAR_RE.is_match(text)
}

/// Temporal axis: extract 4-digit years and month/relative keywords, then
/// penalize future dates, anachronisms, and era mismatches.
pub fn check_temporal(text: &str, current_year: i32) -> TemporalConsistency {
    let lower = text.to_lowercase();

    let mut extracted_times: Vec<String> = Vec::new();
    let mut years: Vec<i32> = Vec::new();
    for cap in YEAR_RE.captures_iter(&lower) {
        let raw = &cap[1];
        extracted_times.push(raw.to_string());
        if let Ok(y) = raw.parse::<i32>() {
            years.push(y);
        }
    }
    for m in MONTH_OR_RELATIVE_RE.find_iter(&lower) {
        extracted_times.push(m.as_str().to_string());
    }

    let mut score = 1.0f32;
    let mut issues = Vec::new();

    if !years.is_empty() {
        let future: Vec<i32> = years.iter().copied().filter(|y| *y > current_year + 1).collect();
        if !future.is_empty() {
            score -= 0.4;
            issues.push(format!("future_years: {:?}", future));
        }

        let very_old: Vec<i32> = years.iter().copied().filter(|y| *y < 1500).collect();
        let old: Vec<i32> = years.iter().copied().filter(|y| (1500..1800).contains(y)).collect();
        let recent_past: Vec<i32> = years
            .iter()
            .copied()
            .filter(|y| *y >= 1800 && *y < current_year - 50)
            .collect();

        let has_modern_context = MODERN_KEYWORDS.iter().any(|k| lower.contains(k));

        if !very_old.is_empty() && has_modern_context {
            // A pre-1500 year framed by modern vocabulary is near-certain fabrication.
            score -= 0.9;
            issues.push(format!("anachronism_detected: {:?} with modern context", very_old));
            warn!(years = ?very_old, "extreme temporal inconsistency: medieval years with modern keywords");
        } else if !very_old.is_empty() {
            score -= 0.5;
            issues.push(format!("medieval_years: {:?}", very_old));
        } else if !old.is_empty() && has_modern_context {
            score -= 0.5;
            issues.push(format!("historical_mismatch: {:?}", old));
        } else if !recent_past.is_empty() {
            // Old-but-plausible references cost a small penalty each.
            score -= 0.1 * recent_past.len() as f32;
            issues.push(format!("historical_reference: {:?}", recent_past));
        }
    }

    let score = score.max(0.0);
    TemporalConsistency {
        score,
        extracted_times,
        issues,
        is_consistent: score > CONSISTENCY_THRESHOLD,
    }
}

/// Spatial axis: capitalized place-like tokens; too many distinct locations
/// reads as fabricated scene-setting.
pub fn check_spatial(text: &str) -> SpatialConsistency {
    let mut locations: Vec<String> = Vec::new();
    for cap in LOCATION_SUFFIX_RE.captures_iter(text) {
        locations.push(cap[1].to_string());
    }
    for cap in LOCATION_PREP_RE.captures_iter(text) {
        locations.push(cap[1].to_string());
    }
    locations.sort();
    locations.dedup();

    let mut score = 1.0f32;
    let mut issues = Vec::new();
    if locations.len() > 3 {
        score -= 0.2;
        issues.push(format!("location_sprawl: {} distinct locations", locations.len()));
    }

    SpatialConsistency {
        score,
        extracted_locations: locations,
        issues,
        is_consistent: score > CONSISTENCY_THRESHOLD,
    }
}

/// Logical axis: three contradiction shapes, each costing 0.3.
pub fn check_logical(text: &str) -> LogicalConsistency {
    let lower = text.to_lowercase();

    let contradictions: Vec<String> = CONTRADICTION_PATTERNS
        .iter()
        .filter(|(re, _)| re.is_match(&lower))
        .map(|(_, name)| name.to_string())
        .collect();

    let score = (1.0 - 0.3 * contradictions.len() as f32).max(0.0);
    LogicalConsistency {
        score,
        contradictions,
        is_consistent: score > CONSISTENCY_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2026;

    #[test]
    fn clean_text_has_no_issues() {
        let r = check_with_year("The council met in spring and approved the budget.", None, YEAR);
        assert!((r.overall_score - 1.0).abs() < 1e-6);
        assert!(r.is_globally_consistent);
    }

    #[test]
    fn anachronism_floors_temporal_score() {
        let t = check_temporal("In 1205 the company unveiled new technology.", YEAR);
        assert!(t.score <= 0.1 + 1e-6, "score = {}", t.score);
        assert!(!t.is_consistent);
        assert!(t.issues.iter().any(|i| i.starts_with("anachronism_detected")));
    }

    #[test]
    fn medieval_year_without_modern_context_is_milder() {
        let t = check_temporal("The battle of 1205 reshaped the region.", YEAR);
        assert!((t.score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn future_years_are_penalized() {
        let t = check_temporal("By 2090 the city will have doubled.", YEAR);
        assert!((t.score - 0.6).abs() < 1e-6);
        assert!(t.issues.iter().any(|i| i.starts_with("future_years")));
    }

    #[test]
    fn historical_references_cost_per_year() {
        let t = check_temporal("Founded in 1850 and rebuilt in 1901.", YEAR);
        assert!((t.score - 0.8).abs() < 1e-6, "score = {}", t.score);
        assert!(t.is_consistent);
    }

    #[test]
    fn location_sprawl_is_flagged() {
        let s = check_spatial("He flew from Paris to Berlin, then in Madrid and at Lisbon he spoke.");
        assert!(s.extracted_locations.len() > 3);
        assert!((s.score - 0.8).abs() < 1e-6);
        assert!(!s.issues.is_empty());
    }

    #[test]
    fn trend_contradiction_detected() {
        let l = check_logical("Prices increased sharply, although they decreased overall.");
        assert_eq!(l.contradictions, vec!["trend_contradiction".to_string()]);
        assert!((l.score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn overall_weighting_favors_logical() {
        let r = check_with_year(
            "Never trust them; they always lie. It happened before the vote and after, before long.",
            None,
            YEAR,
        );
        // two contradictions -> logical 0.4; temporal/spatial clean
        assert!((r.logical.score - 0.4).abs() < 1e-6);
        let expected = 0.3 + 0.3 + 0.4 * 0.4;
        assert!((r.overall_score - expected).abs() < 1e-6);
    }

    #[test]
    fn no_issues_report_is_all_ones() {
        let r = ConsistencyReport::no_issues();
        assert!((r.overall_score - 1.0).abs() < 1e-6);
        assert!(r.temporal.is_consistent && r.spatial.is_consistent && r.logical.is_consistent);
    }
}
