//! Title keyword comparison between analyzed and citing works.
//!
//! Titles are split three ways:
//! - content words: stems of lowercased letter runs longer than two characters
//!   that are neither English stop words nor generic scientific vocabulary
//! - compound words: hyphenated terms such as `machine-learning`
//! - scientific words: the generic scientific vocabulary itself, matched by stem
//!
//! Stemming uses the Snowball English algorithm, so `sensor` and `sensors`
//! count as one term.
//!
//! Each side keeps its fifty most frequent terms per kind. The normalized
//! table divides counts by the number of titles on each side so journals of
//! different size compare.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;

use super::{most_common, round_to};
use crate::models::{CitingEdge, WorkRecord};

/// Terms kept per kind and side.
const TOP_TERMS: usize = 50;

const SCIENTIFIC_WORDS: &[&str] = &[
    "activation", "adaptive", "advanced", "analysis", "application", "applications", "approach",
    "architecture", "artificial", "assessment", "based", "behavior", "capacity", "characteristics",
    "characterization", "coating", "coatings", "comparative", "computational", "composite", "composites",
    "control", "cycle", "damage", "data", "density", "design", "detection", "development", "device",
    "devices", "diagnosis", "discovery", "dynamic", "dynamics", "economic", "effect", "effects", "efficacy",
    "efficient", "energy", "engineering", "enhanced", "environmental", "evaluation", "experimental",
    "exploration", "factors", "failure", "fabrication", "field", "film", "films", "flow", "framework",
    "frequency", "functional", "growth", "high", "impact", "improved", "improvement", "induced", "influence",
    "information", "innovative", "intelligent", "interaction", "interface", "interfaces", "investigation",
    "knowledge", "layer", "layers", "learning", "magnetic", "management", "material", "materials",
    "measurement", "mechanism", "mechanisms", "medical", "method", "methods", "model", "models",
    "modification", "modulation", "molecular", "monitoring", "motion", "nanoparticle", "nanoparticles",
    "nanostructure", "nanostructures", "network", "neural", "new", "nonlinear", "novel", "numerical",
    "optical", "optimization", "pattern", "performance", "phenomenon", "potential", "power", "prediction",
    "preparation", "process", "processing", "production", "progression", "property", "properties",
    "quality", "regulation", "relationship", "reliability", "remote", "repair", "research", "resistance",
    "response", "review", "risk", "role", "safety", "sample", "samples", "scale", "screening", "separation",
    "signal", "simulation", "specific", "stability", "stable", "state", "storage", "strain", "strength",
    "stress", "structural", "structure", "study", "studies", "sustainable", "synergy", "synthesis", "system",
    "systems", "targeted", "techniques", "technology", "testing", "theoretical", "therapy", "thermal",
    "tissue", "tolerance", "toxicity", "transformation", "transition", "transmission", "transport", "type",
    "understanding", "using", "validation", "value", "variation", "virtual", "waste", "wave",
];

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s-]").expect("valid non-word regex pattern"));

static NON_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s]").expect("valid non-letter regex pattern"));

static COMPOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z]{2,}-[a-z]{2,}(?:-[a-z]{2,})*\b").expect("valid compound regex pattern")
});

/// Kind of title keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeywordKind {
    /// Topic-bearing word.
    Content,
    /// Hyphenated term.
    Compound,
    /// Generic scientific vocabulary.
    Scientific,
}

/// Keyword frequencies on one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordSide {
    /// Top content words.
    pub content_words: Vec<(String, usize)>,
    /// Top compound words.
    pub compound_words: Vec<(String, usize)>,
    /// Top scientific words.
    pub scientific_words: Vec<(String, usize)>,
    /// Non-empty titles.
    pub total_titles: usize,
}

impl KeywordSide {
    fn terms(&self, kind: KeywordKind) -> &[(String, usize)] {
        match kind {
            KeywordKind::Content => &self.content_words,
            KeywordKind::Compound => &self.compound_words,
            KeywordKind::Scientific => &self.scientific_words,
        }
    }

    fn count_of(&self, kind: KeywordKind, word: &str) -> usize {
        self.terms(kind).iter().find(|(w, _)| w == word).map_or(0, |(_, c)| *c)
    }
}

/// One row of the normalized keyword table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedKeyword {
    /// Position after sorting by citing frequency.
    pub rank: usize,
    /// Keyword kind.
    pub kind: KeywordKind,
    /// The keyword.
    pub keyword: String,
    /// Occurrences per analyzed title, 4 decimals.
    pub norm_analyzed: f64,
    /// Occurrences per citing title, 4 decimals.
    pub norm_citing: f64,
    /// Sum of both, 4 decimals.
    pub total_norm: f64,
    /// Analyzed over citing frequency, 2 decimals; `None` when the keyword
    /// never occurs on the citing side.
    pub ratio: Option<f64>,
}

/// Keyword frequencies for both sides plus the normalized comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordReport {
    /// Analyzed titles.
    pub analyzed: KeywordSide,
    /// Citing titles.
    pub citing: KeywordSide,
    /// Analyzed keywords compared to the citing side.
    pub normalized: Vec<NormalizedKeyword>,
}

/// Title tokenizer with the NLTK English stop words and an English stemmer.
pub struct KeywordAnalyzer {
    stemmer: Stemmer,
    stop_words: HashSet<String>,
    /// Stem of each scientific word, mapped to its first spelling in the list.
    scientific: HashMap<String, &'static str>,
}

impl Default for KeywordAnalyzer {
    fn default() -> Self {
        let stemmer = Stemmer::create(Algorithm::English);
        let stop_words = stop_words::get(stop_words::LANGUAGE::English).into_iter().map(|w| w.to_string()).collect();

        let mut scientific = HashMap::new();
        for word in SCIENTIFIC_WORDS {
            scientific.entry(stemmer.stem(word).into_owned()).or_insert(*word);
        }

        Self { stemmer, stop_words, scientific }
    }
}

impl fmt::Debug for KeywordAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordAnalyzer")
            .field("stop_words", &self.stop_words.len())
            .field("scientific", &self.scientific.len())
            .finish_non_exhaustive()
    }
}

impl KeywordAnalyzer {
    /// Stemmed content words of one title.
    #[must_use]
    pub fn content_words(&self, title: &str) -> Vec<String> {
        let lowered = title.to_lowercase();
        let cleaned = NON_WORD_RE.replace_all(&lowered, " ");
        cleaned
            .split_whitespace()
            .filter(|w| !w.contains('-'))
            .filter(|w| w.len() > 2 && !self.stop_words.contains(*w))
            .map(|w| self.stemmer.stem(w).into_owned())
            .filter(|stem| !self.scientific.contains_key(stem))
            .collect()
    }

    /// Hyphenated compounds of one title without stop-word parts.
    #[must_use]
    pub fn compound_words(&self, title: &str) -> Vec<String> {
        let lowered = title.to_lowercase();
        COMPOUND_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|w| !w.split('-').any(|part| self.stop_words.contains(part)))
            .map(str::to_string)
            .collect()
    }

    /// Generic scientific words of one title, reported by their listed
    /// spelling (`studies` is reported as `study`).
    #[must_use]
    pub fn scientific_words(&self, title: &str) -> Vec<String> {
        let lowered = title.to_lowercase();
        let cleaned = NON_LETTER_RE.replace_all(&lowered, " ");
        cleaned
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .filter_map(|w| self.scientific.get(&*self.stemmer.stem(w)))
            .map(|w| (*w).to_string())
            .collect()
    }

    fn side(&self, titles: &[&str]) -> KeywordSide {
        let mut content: HashMap<String, usize> = HashMap::new();
        let mut compound: HashMap<String, usize> = HashMap::new();
        let mut scientific: HashMap<String, usize> = HashMap::new();

        let valid: Vec<&str> = titles.iter().copied().filter(|t| !t.trim().is_empty()).collect();
        for title in &valid {
            for word in self.content_words(title) {
                *content.entry(word).or_default() += 1;
            }
            for word in self.compound_words(title) {
                *compound.entry(word).or_default() += 1;
            }
            for word in self.scientific_words(title) {
                *scientific.entry(word).or_default() += 1;
            }
        }

        let top = |counts: &HashMap<String, usize>| {
            let mut terms = most_common(counts);
            terms.truncate(TOP_TERMS);
            terms
        };

        KeywordSide {
            content_words: top(&content),
            compound_words: top(&compound),
            scientific_words: top(&scientific),
            total_titles: valid.len(),
        }
    }

    /// Compare keyword usage of analyzed titles against citing titles.
    #[must_use]
    pub fn analyze(&self, analyzed_titles: &[&str], citing_titles: &[&str]) -> KeywordReport {
        let analyzed = self.side(analyzed_titles);
        let citing = self.side(citing_titles);
        let normalized = normalize(&analyzed, &citing);
        KeywordReport { analyzed, citing, normalized }
    }
}

fn per_title(count: usize, titles: usize) -> f64 {
    if titles == 0 { 0.0 } else { count as f64 / titles as f64 }
}

fn normalize(analyzed: &KeywordSide, citing: &KeywordSide) -> Vec<NormalizedKeyword> {
    let mut rows = Vec::new();

    for kind in [KeywordKind::Content, KeywordKind::Compound, KeywordKind::Scientific] {
        for (word, count) in analyzed.terms(kind) {
            let norm_analyzed = per_title(*count, analyzed.total_titles);
            let norm_citing = per_title(citing.count_of(kind, word), citing.total_titles);
            rows.push(NormalizedKeyword {
                rank: 0,
                kind,
                keyword: word.clone(),
                norm_analyzed: round_to(norm_analyzed, 4),
                norm_citing: round_to(norm_citing, 4),
                total_norm: round_to(norm_analyzed + norm_citing, 4),
                ratio: (norm_citing > 0.0).then(|| round_to(norm_analyzed / norm_citing, 2)),
            });
        }
    }

    rows.sort_by(|a, b| b.norm_citing.total_cmp(&a.norm_citing));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// Keyword report over the titles of analyzed works and citing edges.
#[must_use]
pub fn title_keywords(analyzed: &[WorkRecord], citing: &[CitingEdge]) -> KeywordReport {
    let analyzed_titles: Vec<&str> = analyzed.iter().filter_map(WorkRecord::title).collect();
    let citing_titles: Vec<&str> = citing.iter().filter_map(CitingEdge::title).collect();
    KeywordAnalyzer::default().analyze(&analyzed_titles, &citing_titles)
}
