//! Tokenization and term-frequency vectors.
//!
//! Tokens are maximal runs of word characters (Unicode letters, digits,
//! underscore) taken from the lower-cased text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Split text into lower-cased word tokens, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sparse term-frequency vector.
///
/// Counts are integers, so dot products and squared norms are exact; only
/// the final division is floating point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFrequency {
    counts: HashMap<String, u64>,
    norm_sq: u64,
}

impl TermFrequency {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for token in tokens {
            *counts.entry(token.into()).or_default() += 1;
        }
        let norm_sq = counts.values().map(|c| c * c).sum();
        Self { counts, norm_sq }
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_tokens(tokenize(text))
    }

    /// Count for a term (0 when absent).
    pub fn get(&self, term: &str) -> u64 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct terms.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Cosine similarity over the union of both vocabularies.
    ///
    /// Terms missing from one side contribute 0 to the dot product, so only
    /// the shared terms need visiting. Returns 0.0 when either side has no
    /// tokens.
    pub fn cosine(&self, other: &TermFrequency) -> f64 {
        if self.norm_sq == 0 || other.norm_sq == 0 {
            return 0.0;
        }
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };
        let dot: u64 = small
            .counts
            .iter()
            .map(|(term, count)| count * large.get(term))
            .sum();
        let denom = (self.norm_sq as u128 * other.norm_sq as u128) as f64;
        dot as f64 / denom.sqrt()
    }
}

/// Cosine similarity between two texts' term-frequency vectors.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    TermFrequency::from_text(a).cosine(&TermFrequency::from_text(b))
}

/// A submission tokenized once and shared by every scorer.
#[derive(Debug, Clone)]
pub struct Document {
    tf: TermFrequency,
    vocabulary: HashSet<String>,
}

impl Document {
    pub fn new(text: &str) -> Self {
        let tf = TermFrequency::from_text(text);
        let vocabulary = tf.terms().map(str::to_string).collect();
        Self { tf, vocabulary }
    }

    pub fn term_frequency(&self) -> &TermFrequency {
        &self.tf
    }

    /// Unique tokens.
    pub fn vocabulary(&self) -> &HashSet<String> {
        &self.vocabulary
    }

    /// Whether the text produced no word tokens at all.
    pub fn is_empty(&self) -> bool {
        self.tf.is_empty()
    }
}
