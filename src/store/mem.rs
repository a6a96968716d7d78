//! In-memory corpus store backed by DashMap.
//!
//! Used for `--memory` runs and tests. All data is lost on process exit.
//!
//! Lock order: no map guard is held while taking `seed_lock`; `fingerprints`
//! before `records` and `seed_fingerprints`; `seeds` before
//! `seed_fingerprints`. No path holds `records` or `seed_fingerprints` while
//! taking another map.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use crate::record::{CorpusRecord, CorpusStats, NewRecord, RecordId, SeedChange, SeedEntry};
use crate::store::{CorpusStore, InsertOutcome, StoreResult};

/// Concurrent in-memory corpus.
#[derive(Debug)]
pub struct MemCorpus {
    records: DashMap<RecordId, CorpusRecord>,
    fingerprints: DashMap<Fingerprint, RecordId>,
    seeds: DashMap<RecordId, SeedEntry>,
    seed_fingerprints: DashMap<Fingerprint, RecordId>,
    /// Held for writing while the seed set changes, for reading while it is
    /// listed, so a listing never sees half of a promotion.
    seed_lock: RwLock<()>,
    next_id: AtomicU64,
}

impl MemCorpus {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            fingerprints: DashMap::new(),
            seeds: DashMap::new(),
            seed_fingerprints: DashMap::new(),
            seed_lock: RwLock::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    fn records_where(&self, keep: impl Fn(f64) -> bool) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self
            .records
            .iter()
            .filter(|entry| keep(entry.value().selected_score()))
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for MemCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusStore for MemCorpus {
    fn fingerprint_exists(&self, fingerprint: &Fingerprint) -> StoreResult<bool> {
        Ok(self.fingerprints.contains_key(fingerprint) || self.seed_fingerprints.contains_key(fingerprint))
    }

    fn list_seed_texts(&self, category: &str) -> StoreResult<Vec<String>> {
        let _view = self.seed_lock.read().unwrap_or_else(PoisonError::into_inner);
        let mut seeds: Vec<(RecordId, String)> = self
            .seeds
            .iter()
            .filter(|entry| entry.value().category == category)
            .map(|entry| (*entry.key(), entry.value().content.clone()))
            .collect();
        seeds.sort_unstable_by_key(|(id, _)| *id);
        Ok(seeds.into_iter().map(|(_, text)| text).collect())
    }

    fn seed_sets(&self) -> StoreResult<BTreeMap<String, Vec<String>>> {
        let _view = self.seed_lock.read().unwrap_or_else(PoisonError::into_inner);
        let mut seeds: Vec<(RecordId, SeedEntry)> = self
            .seeds
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        seeds.sort_unstable_by_key(|(id, _)| *id);

        let mut sets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (_, seed) in seeds {
            sets.entry(seed.category).or_default().push(seed.content);
        }
        Ok(sets)
    }

    fn insert_record(&self, record: NewRecord) -> StoreResult<InsertOutcome> {
        // The vacant entry holds the fingerprint shard lock until the record is in.
        match self.fingerprints.entry(record.fingerprint.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                if self.seed_fingerprints.contains_key(&record.fingerprint) {
                    return Ok(InsertOutcome::Duplicate);
                }
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                self.records.insert(id, record.into_record(id));
                slot.insert(id);
                tracing::debug!(id, "record inserted");
                Ok(InsertOutcome::Inserted(id))
            }
        }
    }

    fn add_to_seed(&self, id: RecordId) -> StoreResult<SeedChange> {
        let record = self
            .records
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::RecordNotFound { id })?;

        let _change = self.seed_lock.write().unwrap_or_else(PoisonError::into_inner);
        let changed = match self.seeds.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.seed_fingerprints.insert(record.fingerprint.clone(), id);
                slot.insert(SeedEntry::from(&record));
                true
            }
        };
        let change = SeedChange {
            id,
            changed,
            seed_count: self.seeds.len() as u64,
        };
        tracing::debug!(id, changed, seeds = change.seed_count, "seed promote");
        Ok(change)
    }

    fn remove_from_seed(&self, id: RecordId) -> StoreResult<SeedChange> {
        let _change = self.seed_lock.write().unwrap_or_else(PoisonError::into_inner);
        let (_, seed) = self.seeds.remove(&id).ok_or(StoreError::NotSeeded { id })?;
        self.seed_fingerprints.remove(&seed.fingerprint);
        let change = SeedChange {
            id,
            changed: true,
            seed_count: self.seeds.len() as u64,
        };
        tracing::debug!(id, seeds = change.seed_count, "seed demote");
        Ok(change)
    }

    fn delete_record(&self, id: RecordId) -> StoreResult<()> {
        let (_, record) = self.records.remove(&id).ok_or(StoreError::RecordNotFound { id })?;
        self.fingerprints.remove(&record.fingerprint);
        tracing::debug!(id, "record deleted");
        Ok(())
    }

    fn lookup_record(&self, id: RecordId) -> StoreResult<Option<CorpusRecord>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    fn records_above(&self, threshold: f64) -> StoreResult<Vec<RecordId>> {
        Ok(self.records_where(|score| score >= threshold))
    }

    fn records_below(&self, threshold: f64) -> StoreResult<Vec<RecordId>> {
        Ok(self.records_where(|score| score < threshold))
    }

    fn seed_count(&self) -> StoreResult<u64> {
        Ok(self.seeds.len() as u64)
    }

    fn statistics(&self) -> StoreResult<CorpusStats> {
        let mut stats = CorpusStats::default();
        for entry in self.records.iter() {
            stats.count_record(entry.value());
        }
        for entry in self.seeds.iter() {
            stats.count_seed(entry.value());
        }
        Ok(stats)
    }
}
