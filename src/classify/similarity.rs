//! Seed-similarity scoring.
//!
//! A category's score is the mean cosine similarity between the submission
//! and every seed text currently in that category's seed set.

use std::collections::HashMap;

use rayon::prelude::*;

use super::tokenize::{Document, TermFrequency};
use super::{FilterMethod, Scorer};
use crate::category::CategoryDef;

/// Seed sets at or above this size are compared on the rayon pool.
const PARALLEL_MIN_SEEDS: usize = 64;

/// Seed reference vectors per category, read from the store at call time.
#[derive(Debug, Clone, Default)]
pub struct SeedSimilarity {
    seeds: HashMap<String, Vec<TermFrequency>>,
}

impl SeedSimilarity {
    /// Build from `(category, seed texts)` pairs.
    pub fn from_seed_texts<I, T>(sets: I) -> Self
    where
        I: IntoIterator<Item = (String, T)>,
        T: IntoIterator<Item = String>,
    {
        let seeds = sets
            .into_iter()
            .map(|(category, texts)| {
                let vectors = texts
                    .into_iter()
                    .map(|t| TermFrequency::from_text(&t))
                    .collect();
                (category, vectors)
            })
            .collect();
        Self { seeds }
    }

    /// Number of seed texts held for a category.
    pub fn seed_count(&self, category: &str) -> usize {
        self.seeds.get(category).map_or(0, Vec::len)
    }
}

impl Scorer for SeedSimilarity {
    fn method(&self) -> FilterMethod {
        FilterMethod::Seeds
    }

    fn score(&self, doc: &Document, category: &CategoryDef) -> f64 {
        let Some(refs) = self.seeds.get(&category.name).filter(|r| !r.is_empty()) else {
            return 0.0;
        };
        let query = doc.term_frequency();

        // Collect first, then sum in seed order so the result does not
        // depend on how rayon split the work.
        let sims: Vec<f64> = if refs.len() >= PARALLEL_MIN_SEEDS {
            refs.par_iter().map(|r| query.cosine(r)).collect()
        } else {
            refs.iter().map(|r| query.cosine(r)).collect()
        };
        sims.iter().sum::<f64>() / sims.len() as f64
    }
}
