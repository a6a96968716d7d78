//! Corpus records and the views curators pull from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::{CategoryFlag, Classification, FilterMethod, ScoreCard};
use crate::fingerprint::Fingerprint;

/// Record identifier, allocated by the store.
pub type RecordId = u64;

/// A fully scored sample ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub content: String,
    pub fingerprint: Fingerprint,
    pub category: String,
    pub filter_method: FilterMethod,
    pub scores: ScoreCard,
}

impl NewRecord {
    /// Build from an accepted classification. Returns `None` if it was not accepted.
    pub fn from_classification(
        content: &str,
        fingerprint: Fingerprint,
        classification: &Classification,
    ) -> Option<Self> {
        let category = classification.category()?.to_string();
        Some(Self {
            content: content.to_string(),
            fingerprint,
            category,
            filter_method: classification.method,
            scores: classification.scores.clone(),
        })
    }

    pub fn into_record(self, id: RecordId) -> CorpusRecord {
        CorpusRecord {
            id,
            content: self.content,
            fingerprint: self.fingerprint,
            category: self.category,
            filter_method: self.filter_method,
            scores: self.scores,
        }
    }
}

/// A persisted sample. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub id: RecordId,
    pub content: String,
    pub fingerprint: Fingerprint,
    pub category: String,
    pub filter_method: FilterMethod,
    pub scores: ScoreCard,
}

impl CorpusRecord {
    /// Score of the selected category.
    pub fn selected_score(&self) -> f64 {
        self.scores.get(&self.category).unwrap_or(0.0)
    }

    pub fn flags(&self) -> Vec<CategoryFlag> {
        self.scores.flags()
    }

    pub fn training_sample(&self) -> TrainingSample {
        TrainingSample {
            id: self.id,
            content: self.content.clone(),
            fingerprint: self.fingerprint.clone(),
            flags: self.flags(),
        }
    }
}

/// Content plus one-hot category flags, the shape handed to model training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub id: RecordId,
    pub content: String,
    pub fingerprint: Fingerprint,
    pub flags: Vec<CategoryFlag>,
}

/// A seed-set entry: a copy of a promoted record's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub content: String,
    pub fingerprint: Fingerprint,
    pub category: String,
}

impl From<&CorpusRecord> for SeedEntry {
    fn from(record: &CorpusRecord) -> Self {
        Self {
            content: record.content.clone(),
            fingerprint: record.fingerprint.clone(),
            category: record.category.clone(),
        }
    }
}

/// Result of a seed-set mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedChange {
    pub id: RecordId,
    /// Whether the seed set actually changed.
    pub changed: bool,
    /// Total seed count after the operation.
    pub seed_count: u64,
}

/// Corpus-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub records: u64,
    pub seeds: u64,
    pub records_by_category: BTreeMap<String, u64>,
    pub records_by_method: BTreeMap<String, u64>,
    pub seeds_by_category: BTreeMap<String, u64>,
}

impl CorpusStats {
    pub(crate) fn count_record(&mut self, record: &CorpusRecord) {
        self.records += 1;
        *self
            .records_by_category
            .entry(record.category.clone())
            .or_default() += 1;
        *self
            .records_by_method
            .entry(record.filter_method.to_string())
            .or_default() += 1;
    }

    pub(crate) fn count_seed(&mut self, seed: &SeedEntry) {
        self.seeds += 1;
        *self.seeds_by_category.entry(seed.category.clone()).or_default() += 1;
    }
}

impl std::fmt::Display for CorpusStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "records: {}", self.records)?;
        for (category, n) in &self.records_by_category {
            writeln!(f, "  {category}: {n}")?;
        }
        for (method, n) in &self.records_by_method {
            writeln!(f, "  via {method}: {n}")?;
        }
        writeln!(f, "seeds: {}", self.seeds)?;
        for (category, n) in &self.seeds_by_category {
            writeln!(f, "  {category}: {n}")?;
        }
        Ok(())
    }
}
