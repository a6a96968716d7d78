//! Keyword-overlap scoring.

use std::collections::HashSet;

use super::tokenize::Document;
use super::{FilterMethod, Scorer};
use crate::category::CategoryDef;

/// Fraction of `keywords` present in `vocabulary`.
///
/// The denominator is the keyword list length, so the result is always in
/// [0, 1]. An empty keyword list scores 0.0 (validated configs never have one).
pub fn keyword_score(vocabulary: &HashSet<String>, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let matched = keywords.iter().filter(|kw| vocabulary.contains(kw.as_str())).count();
    matched as f64 / keywords.len() as f64
}

/// Scores a document by its overlap with each category's fixed keyword list.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatch;

impl Scorer for KeywordMatch {
    fn method(&self) -> FilterMethod {
        FilterMethod::Keywords
    }

    fn score(&self, doc: &Document, category: &CategoryDef) -> f64 {
        keyword_score(doc.vocabulary(), &category.keywords)
    }
}
