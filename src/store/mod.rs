//! Corpus storage.
//!
//! [`CorpusStore`] is the only way the curation policy touches persistent
//! state. Two backends implement it:
//!
//! - [`DurableCorpus`]: ACID transactions in a redb file
//! - [`MemCorpus`]: concurrent hashmaps (DashMap), lost on exit
//!
//! Every method is one self-contained operation: a backend acquires whatever
//! transaction or lock it needs and releases it before returning, on success
//! and on failure alike.

pub mod durable;
pub mod mem;

pub use durable::DurableCorpus;
pub use mem::MemCorpus;

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use crate::record::{CorpusRecord, CorpusStats, NewRecord, RecordId, SeedChange};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of an atomic insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(RecordId),
    /// The fingerprint was already present when the insert ran.
    Duplicate,
}

/// Persistent corpus: records, their fingerprints, and the seed set.
pub trait CorpusStore {
    /// Whether a fingerprint exists among records or seeds.
    fn fingerprint_exists(&self, fingerprint: &Fingerprint) -> StoreResult<bool>;

    /// Seed texts for one category, in seed id order.
    fn list_seed_texts(&self, category: &str) -> StoreResult<Vec<String>>;

    /// Every seed text grouped by category, read from one consistent view
    /// of the seed set. Texts within a category are in seed id order.
    fn seed_sets(&self) -> StoreResult<BTreeMap<String, Vec<String>>>;

    /// Persist a fully scored record.
    ///
    /// The fingerprint is re-checked in the same transaction as the insert,
    /// so two racing submissions of the same content store at most one record.
    fn insert_record(&self, record: NewRecord) -> StoreResult<InsertOutcome>;

    /// Copy an existing record into the seed set.
    ///
    /// Fails with [`StoreError::RecordNotFound`] if no record has this id.
    /// Promoting an id that is already a seed leaves the set unchanged.
    fn add_to_seed(&self, id: RecordId) -> StoreResult<SeedChange>;

    /// Remove an entry from the seed set.
    ///
    /// Fails with [`StoreError::NotSeeded`] if the id is not a seed.
    fn remove_from_seed(&self, id: RecordId) -> StoreResult<SeedChange>;

    /// Delete a record. Its seed copy, if any, is kept.
    fn delete_record(&self, id: RecordId) -> StoreResult<()>;

    fn lookup_record(&self, id: RecordId) -> StoreResult<Option<CorpusRecord>>;

    /// Ids of records whose selected-category score is `>= threshold`, ascending.
    fn records_above(&self, threshold: f64) -> StoreResult<Vec<RecordId>>;

    /// Ids of records whose selected-category score is `< threshold`, ascending.
    fn records_below(&self, threshold: f64) -> StoreResult<Vec<RecordId>>;

    fn seed_count(&self) -> StoreResult<u64>;

    fn statistics(&self) -> StoreResult<CorpusStats>;
}

impl<S: CorpusStore + ?Sized> CorpusStore for Box<S> {
    fn fingerprint_exists(&self, fingerprint: &Fingerprint) -> StoreResult<bool> {
        (**self).fingerprint_exists(fingerprint)
    }

    fn list_seed_texts(&self, category: &str) -> StoreResult<Vec<String>> {
        (**self).list_seed_texts(category)
    }

    fn seed_sets(&self) -> StoreResult<BTreeMap<String, Vec<String>>> {
        (**self).seed_sets()
    }

    fn insert_record(&self, record: NewRecord) -> StoreResult<InsertOutcome> {
        (**self).insert_record(record)
    }

    fn add_to_seed(&self, id: RecordId) -> StoreResult<SeedChange> {
        (**self).add_to_seed(id)
    }

    fn remove_from_seed(&self, id: RecordId) -> StoreResult<SeedChange> {
        (**self).remove_from_seed(id)
    }

    fn delete_record(&self, id: RecordId) -> StoreResult<()> {
        (**self).delete_record(id)
    }

    fn lookup_record(&self, id: RecordId) -> StoreResult<Option<CorpusRecord>> {
        (**self).lookup_record(id)
    }

    fn records_above(&self, threshold: f64) -> StoreResult<Vec<RecordId>> {
        (**self).records_above(threshold)
    }

    fn records_below(&self, threshold: f64) -> StoreResult<Vec<RecordId>> {
        (**self).records_below(threshold)
    }

    fn seed_count(&self) -> StoreResult<u64> {
        (**self).seed_count()
    }

    fn statistics(&self) -> StoreResult<CorpusStats> {
        (**self).statistics()
    }
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization {
        message: format!("encode failed: {e}"),
    })
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        message: format!("decode failed: {e}"),
    })
}
