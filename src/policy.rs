//! Curation policy: duplicate detection, classification, and persistence.
//!
//! Each submission moves through
//! `received → fingerprint-checked → {duplicate | scored → {below-threshold | accepted}}`
//! exactly once. Store failures abort the submission with an error and leave
//! nothing behind; rejections are ordinary [`SubmissionOutcome`]s.

use serde::Serialize;

use crate::classify::{
    CategoryScore, Document, FilterMethod, KeywordMatch, ScoreCard, Scorer, SeedSimilarity,
    classify, validate_threshold,
};
use crate::config::CurateConfig;
use crate::error::CurateResult;
use crate::fingerprint::Fingerprint;
use crate::record::{CorpusRecord, CorpusStats, NewRecord, RecordId, SeedChange, TrainingSample};
use crate::store::{CorpusStore, InsertOutcome, StoreResult};

/// Terminal state of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Stored with all scores.
    Accepted {
        id: RecordId,
        category: String,
        method: FilterMethod,
        scores: ScoreCard,
    },
    /// The content's fingerprint is already in the corpus.
    Duplicate { fingerprint: Fingerprint },
    /// The best score was below the acceptance threshold; nothing was stored.
    BelowThreshold {
        method: FilterMethod,
        scores: ScoreCard,
        best: Option<CategoryScore>,
        threshold: f64,
    },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Accepted { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted {
                id,
                category,
                method,
                scores,
            } => write!(f, "accepted as record {id} in category {category} via {method} ({scores})"),
            Self::Duplicate { fingerprint } => {
                write!(f, "rejected: duplicate content (fingerprint {fingerprint})")
            }
            Self::BelowThreshold {
                method,
                scores,
                best,
                threshold,
            } => {
                write!(f, "rejected: fits no category via {method} ")?;
                match best {
                    Some(b) => write!(f, "(best {}={:.4} < {threshold})", b.category, b.score)?,
                    None => write!(f, "(no categories)")?,
                }
                write!(f, " ({scores})")
            }
        }
    }
}

/// Orchestrates submissions and curation against a [`CorpusStore`].
pub struct Curator<S> {
    store: S,
    config: CurateConfig,
}

impl<S: CorpusStore> Curator<S> {
    pub fn new(store: S, config: CurateConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CurateConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submit using the configured acceptance threshold.
    pub fn submit(&self, content: &str, method: FilterMethod) -> CurateResult<SubmissionOutcome> {
        self.run_submission(content, method, self.config.threshold)
    }

    /// Submit with a one-off acceptance threshold.
    pub fn submit_with_threshold(
        &self,
        content: &str,
        method: FilterMethod,
        threshold: f64,
    ) -> CurateResult<SubmissionOutcome> {
        let threshold = validate_threshold(threshold)?;
        self.run_submission(content, method, threshold)
    }

    /// Classify against the current seed sets.
    pub fn submit_with_similarity(&self, content: &str) -> CurateResult<SubmissionOutcome> {
        self.submit(content, FilterMethod::Seeds)
    }

    /// Classify against the fixed keyword lists.
    pub fn submit_with_keywords(&self, content: &str) -> CurateResult<SubmissionOutcome> {
        self.submit(content, FilterMethod::Keywords)
    }

    fn run_submission(
        &self,
        content: &str,
        method: FilterMethod,
        threshold: f64,
    ) -> CurateResult<SubmissionOutcome> {
        let fingerprint = Fingerprint::of(content);
        if self.store.fingerprint_exists(&fingerprint)? {
            tracing::info!(%fingerprint, "rejected duplicate content");
            return Ok(SubmissionOutcome::Duplicate { fingerprint });
        }

        let doc = Document::new(content);
        let seeds;
        let scorer: &dyn Scorer = match method {
            FilterMethod::Seeds => {
                seeds = self.load_seed_scorer()?;
                &seeds
            }
            FilterMethod::Keywords => &KeywordMatch,
        };

        let classification = classify(scorer, &doc, &self.config.categories, threshold);
        for s in classification.scores.iter() {
            tracing::debug!(category = %s.category, score = s.score, %method, "category score");
        }

        let Some(record) = NewRecord::from_classification(content, fingerprint.clone(), &classification)
        else {
            tracing::info!(%method, threshold, "rejected content below threshold");
            return Ok(SubmissionOutcome::BelowThreshold {
                method,
                best: classification.best().cloned(),
                scores: classification.scores,
                threshold,
            });
        };

        let category = record.category.clone();
        match self.store.insert_record(record)? {
            InsertOutcome::Inserted(id) => {
                tracing::info!(id, %category, %method, "record accepted");
                Ok(SubmissionOutcome::Accepted {
                    id,
                    category,
                    method,
                    scores: classification.scores,
                })
            }
            InsertOutcome::Duplicate => {
                // Another submission stored the same content after our check.
                tracing::info!(%fingerprint, "rejected duplicate content at insert");
                Ok(SubmissionOutcome::Duplicate { fingerprint })
            }
        }
    }

    /// Read every configured category's seed texts in one store read.
    pub fn load_seed_scorer(&self) -> StoreResult<SeedSimilarity> {
        let mut all = self.store.seed_sets()?;
        let sets = self
            .config
            .categories
            .names()
            .map(|name| (name.to_string(), all.remove(name).unwrap_or_default()))
            .collect::<Vec<_>>();
        Ok(SeedSimilarity::from_seed_texts(sets))
    }

    /// Add a stored record's content to the seed set.
    pub fn promote_to_seed(&self, id: RecordId) -> CurateResult<SeedChange> {
        let change = self.store.add_to_seed(id)?;
        tracing::info!(id, changed = change.changed, seeds = change.seed_count, "promoted to seed");
        Ok(change)
    }

    /// Remove an entry from the seed set.
    pub fn demote_from_seed(&self, id: RecordId) -> CurateResult<SeedChange> {
        let change = self.store.remove_from_seed(id)?;
        tracing::info!(id, seeds = change.seed_count, "demoted from seed");
        Ok(change)
    }

    pub fn delete_record(&self, id: RecordId) -> CurateResult<()> {
        self.store.delete_record(id)?;
        tracing::info!(id, "record deleted");
        Ok(())
    }

    pub fn record_info(&self, id: RecordId) -> CurateResult<Option<CorpusRecord>> {
        Ok(self.store.lookup_record(id)?)
    }

    pub fn training_sample(&self, id: RecordId) -> CurateResult<Option<TrainingSample>> {
        Ok(self.store.lookup_record(id)?.map(|r| r.training_sample()))
    }

    /// Records whose selected-category score is `>= threshold`
    /// (configured `high_threshold` when `None`).
    pub fn high_quality(&self, threshold: Option<f64>) -> CurateResult<Vec<TrainingSample>> {
        let threshold = validate_threshold(threshold.unwrap_or(self.config.high_threshold))?;
        let ids = self.store.records_above(threshold)?;
        self.samples(ids)
    }

    /// Records whose selected-category score is `< threshold`
    /// (configured `low_threshold` when `None`).
    pub fn low_quality(&self, threshold: Option<f64>) -> CurateResult<Vec<TrainingSample>> {
        let threshold = validate_threshold(threshold.unwrap_or(self.config.low_threshold))?;
        let ids = self.store.records_below(threshold)?;
        self.samples(ids)
    }

    pub fn statistics(&self) -> CurateResult<CorpusStats> {
        Ok(self.store.statistics()?)
    }

    fn samples(&self, ids: Vec<RecordId>) -> CurateResult<Vec<TrainingSample>> {
        let mut samples = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.lookup_record(id)? {
                Some(record) => samples.push(record.training_sample()),
                None => tracing::debug!(id, "record vanished between queries"),
            }
        }
        Ok(samples)
    }
}
