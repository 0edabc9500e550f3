//! rhetorical.rs — Emotional, loaded-language, readability, and syntactic
//! features of the raw text.
//!
//! Keyword and regex tables are fixed; all ratios are normalized per word or
//! per sentence. The linguistic-pattern block needs a POS/NER collaborator
//! (`LinguisticAnalyzer`); without one it degrades to `None`, which downstream
//! treats as all-zero contributions. Nothing in this module errors: malformed
//! or empty text falls back to neutral defaults.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword tables for the five emotional categories.
const POSITIVE_WORDS: &[&str] = &[
    "amazing", "incredible", "fantastic", "wonderful", "brilliant", "outstanding",
];
const NEGATIVE_WORDS: &[&str] = &[
    "terrible", "horrible", "awful", "disgusting", "shocking", "appalling",
];
const FEAR_WORDS: &[&str] = &["fear", "terror", "panic", "dread", "anxiety", "worry"];
const ANGER_WORDS: &[&str] = &["fury", "rage", "outrage", "furious", "angry", "mad"];
const EXAGGERATION_WORDS: &[&str] = &[
    "extremely", "incredibly", "absolutely", "completely", "totally", "utterly",
];

/// Compiled regex tables for the five loaded-language categories.
static CONSPIRACY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(conspiracy|plot|cover.?up|secret|hidden)\b",
        r"\b(they|them)\b.*\b(hide|conceal)\b",
    ])
});
static URGENCY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(urgent|immediate|breaking|shocking|alarming)\b",
        r"\b(now|immediately|asap)\b",
    ])
});
static AUTHORITY_RES: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\b(experts?|officials?|sources?)\b.*\b(say|claim|reveal)\b"]));
static VAGUE_SOURCES_RES: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\b(according to|sources say|reportedly|allegedly)\b"]));
static EMOTIONAL_TRIGGERS_RES: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"\b(devastating|catastrophic|unprecedented|outrageous)\b"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("loaded-language pattern"))
        .collect()
}

/// Per-word keyword-occurrence ratios for emotionally charged vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalScores {
    pub positive: f32,
    pub negative: f32,
    pub fear: f32,
    pub anger: f32,
    pub exaggeration: f32,
}

/// Per-word regex-match ratios for manipulative phrasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedScores {
    pub conspiracy: f32,
    pub urgency: f32,
    pub authority: f32,
    pub vague_sources: f32,
    pub emotional_triggers: f32,
}

impl LoadedScores {
    /// Summed ratio across all categories; feeds the rhetorical adjustment.
    pub fn total(&self) -> f32 {
        self.conspiracy + self.urgency + self.authority + self.vague_sources + self.emotional_triggers
    }
}

/// Standard readability metrics with fixed neutral fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    pub flesch_reading_ease: f32,
    pub flesch_kincaid_grade: f32,
    pub avg_sentence_length: f32,
    pub avg_word_length: f32,
    pub complex_word_ratio: f32,
}

impl Default for Readability {
    /// Neutral constants used when computation is impossible (empty text).
    fn default() -> Self {
        Self {
            flesch_reading_ease: 50.0,
            flesch_kincaid_grade: 10.0,
            avg_sentence_length: 15.0,
            avg_word_length: 5.0,
            complex_word_ratio: 0.3,
        }
    }
}

/// Syntactic/NER-derived ratios; require a `LinguisticAnalyzer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinguisticPatterns {
    pub entity_diversity: f32,
    pub pronoun_ratio: f32,
    pub adjective_ratio: f32,
    pub complex_sentence_ratio: f32,
    pub passive_voice_ratio: f32,
}

/// All rhetorical features of one text. `Default` is fully neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RhetoricalFeatures {
    pub emotional_language: EmotionalScores,
    pub loaded_language: LoadedScores,
    pub readability: Readability,
    /// `None` when no linguistic-analysis collaborator is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linguistic_patterns: Option<LinguisticPatterns>,
}

// ------------------------------------------------------------
// Linguistic-analysis collaborator contract
// ------------------------------------------------------------

/// Coarse part-of-speech classes the extractor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    Pronoun,
    Adjective,
    Verb,
    Other,
}

/// One annotated token from the POS/NER provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenAnnotation {
    pub pos: PosTag,
    /// Past-participle verb form (the passive-voice signal).
    pub past_participle: bool,
    /// Core dependent of its head (subject/object role).
    pub core_dependent: bool,
}

/// One annotated sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnnotation {
    pub tokens: Vec<TokenAnnotation>,
}

impl SentenceAnnotation {
    /// Syntactically complex: more than 3 core dependents.
    fn is_complex(&self) -> bool {
        self.tokens.iter().filter(|t| t.core_dependent).count() > 3
    }
}

/// Parsed document as returned by the external POS/NER collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub sentences: Vec<SentenceAnnotation>,
    /// NER labels, one per recognized entity (e.g. "PERSON", "GPE").
    pub entity_labels: Vec<String>,
}

/// External POS/NER provider. Absence degrades linguistic patterns to `None`.
pub trait LinguisticAnalyzer: Send + Sync {
    fn parse(&self, text: &str) -> Option<ParsedDocument>;
}

// ------------------------------------------------------------
// Extraction
// ------------------------------------------------------------

/// Compute all rhetorical features for `text`.
pub fn extract(text: &str, analyzer: Option<&dyn LinguisticAnalyzer>) -> RhetoricalFeatures {
    RhetoricalFeatures {
        emotional_language: emotional_language(text),
        loaded_language: loaded_language(text),
        readability: readability(text),
        linguistic_patterns: analyzer
            .and_then(|a| a.parse(text))
            .map(|doc| linguistic_patterns(&doc)),
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive substring occurrence count over a keyword list.
fn keyword_ratio(lower: &str, words: &[&str], total_words: usize) -> f32 {
    if total_words == 0 {
        return 0.0;
    }
    let hits: usize = words.iter().map(|w| lower.matches(w).count()).sum();
    hits as f32 / total_words as f32
}

pub fn emotional_language(text: &str) -> EmotionalScores {
    let lower = text.to_lowercase();
    let n = word_count(text);
    EmotionalScores {
        positive: keyword_ratio(&lower, POSITIVE_WORDS, n),
        negative: keyword_ratio(&lower, NEGATIVE_WORDS, n),
        fear: keyword_ratio(&lower, FEAR_WORDS, n),
        anger: keyword_ratio(&lower, ANGER_WORDS, n),
        exaggeration: keyword_ratio(&lower, EXAGGERATION_WORDS, n),
    }
}

fn regex_ratio(lower: &str, res: &[Regex], total_words: usize) -> f32 {
    if total_words == 0 {
        return 0.0;
    }
    let hits: usize = res.iter().map(|re| re.find_iter(lower).count()).sum();
    hits as f32 / total_words as f32
}

pub fn loaded_language(text: &str) -> LoadedScores {
    let lower = text.to_lowercase();
    let n = word_count(text);
    LoadedScores {
        conspiracy: regex_ratio(&lower, &CONSPIRACY_RES, n),
        urgency: regex_ratio(&lower, &URGENCY_RES, n),
        authority: regex_ratio(&lower, &AUTHORITY_RES, n),
        vague_sources: regex_ratio(&lower, &VAGUE_SOURCES_RES, n),
        emotional_triggers: regex_ratio(&lower, &EMOTIONAL_TRIGGERS_RES, n),
    }
}

/// Flesch reading ease / Flesch–Kincaid grade plus simple length metrics.
/// Falls back to `Readability::default()` on empty input.
pub fn readability(text: &str) -> Readability {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Readability::default();
    }

    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let sentence_count = sentences.len().max(1);

    let total_words = words.len() as f32;
    let total_syllables: usize = words.iter().map(|w| syllables(w)).sum();

    let words_per_sentence = total_words / sentence_count as f32;
    let syllables_per_word = total_syllables as f32 / total_words;

    let avg_sentence_length = if sentences.is_empty() {
        Readability::default().avg_sentence_length
    } else {
        sentences
            .iter()
            .map(|s| s.split_whitespace().count() as f32)
            .sum::<f32>()
            / sentences.len() as f32
    };

    let avg_word_length =
        words.iter().map(|w| w.chars().count() as f32).sum::<f32>() / total_words;
    let complex_words = words.iter().filter(|w| w.chars().count() > 6).count();

    Readability {
        flesch_reading_ease: 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
        flesch_kincaid_grade: 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
        avg_sentence_length,
        avg_word_length,
        complex_word_ratio: complex_words as f32 / total_words,
    }
}

/// Vowel-group syllable estimate; every word counts at least one.
fn syllables(word: &str) -> usize {
    let mut count = 0usize;
    let mut in_group = false;
    for c in word.chars() {
        let vowel = matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !in_group {
            count += 1;
        }
        in_group = vowel;
    }
    count.max(1)
}

/// Ratios over a parsed document from the POS/NER collaborator.
pub fn linguistic_patterns(doc: &ParsedDocument) -> LinguisticPatterns {
    let tokens: Vec<&TokenAnnotation> =
        doc.sentences.iter().flat_map(|s| s.tokens.iter()).collect();
    let token_count = tokens.len();

    let entity_diversity = if doc.entity_labels.is_empty() {
        0.0
    } else {
        let distinct: std::collections::BTreeSet<&str> =
            doc.entity_labels.iter().map(String::as_str).collect();
        distinct.len() as f32 / doc.entity_labels.len() as f32
    };

    let ratio = |pred: &dyn Fn(&TokenAnnotation) -> bool| -> f32 {
        if token_count == 0 {
            0.0
        } else {
            tokens.iter().filter(|t| pred(t)).count() as f32 / token_count as f32
        }
    };

    let verbs = tokens.iter().filter(|t| t.pos == PosTag::Verb).count();
    let past_participles = tokens
        .iter()
        .filter(|t| t.pos == PosTag::Verb && t.past_participle)
        .count();

    LinguisticPatterns {
        entity_diversity,
        pronoun_ratio: ratio(&|t| t.pos == PosTag::Pronoun),
        adjective_ratio: ratio(&|t| t.pos == PosTag::Adjective),
        complex_sentence_ratio: if doc.sentences.is_empty() {
            0.0
        } else {
            doc.sentences.iter().filter(|s| s.is_complex()).count() as f32
                / doc.sentences.len() as f32
        },
        passive_voice_ratio: if verbs == 0 {
            0.0
        } else {
            past_participles as f32 / verbs as f32
        },
    }
}
