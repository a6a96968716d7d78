//! ACID-durable corpus store backed by redb.
//!
//! Every trait method runs in exactly one transaction. Writes commit only
//! when the whole operation succeeded; any early return drops the write
//! transaction, which aborts it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use crate::record::{CorpusRecord, CorpusStats, NewRecord, RecordId, SeedChange, SeedEntry};
use crate::store::{CorpusStore, InsertOutcome, StoreResult, decode, encode};

/// Record id → bincode `CorpusRecord`.
const RECORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("records");
/// Fingerprint hex → record id.
const FINGERPRINTS: TableDefinition<&str, u64> = TableDefinition::new("fingerprints");
/// Originating record id → bincode `SeedEntry`.
const SEEDS: TableDefinition<u64, &[u8]> = TableDefinition::new("seeds");
/// Fingerprint hex → seed id.
const SEED_FINGERPRINTS: TableDefinition<&str, u64> = TableDefinition::new("seed_fingerprints");
/// Counters.
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ID_KEY: &str = "next_record_id";

fn redb<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Redb {
        message: format!("{op} failed: {e}"),
    }
}

/// Corpus store in a single redb file.
pub struct DurableCorpus {
    db: Arc<Database>,
}

impl DurableCorpus {
    /// Open or create the corpus database at `path`, creating parent directories.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;

        // Create every table up front so read transactions never see a missing one.
        let txn = db.begin_write().map_err(redb("begin_write"))?;
        {
            txn.open_table(RECORDS).map_err(redb("open_table"))?;
            txn.open_table(FINGERPRINTS).map_err(redb("open_table"))?;
            txn.open_table(SEEDS).map_err(redb("open_table"))?;
            txn.open_table(SEED_FINGERPRINTS).map_err(redb("open_table"))?;
            txn.open_table(META).map_err(redb("open_table"))?;
        }
        txn.commit().map_err(redb("commit"))?;

        tracing::debug!(path = %path.display(), "opened corpus database");
        Ok(Self { db: Arc::new(db) })
    }

    fn records_where(&self, keep: impl Fn(f64) -> bool) -> StoreResult<Vec<RecordId>> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let records = txn.open_table(RECORDS).map_err(redb("open_table"))?;
        let mut ids = Vec::new();
        for entry in records.iter().map_err(redb("iter"))? {
            let (key, value) = entry.map_err(redb("iter"))?;
            let record: CorpusRecord = decode(value.value())?;
            if keep(record.selected_score()) {
                ids.push(key.value());
            }
        }
        Ok(ids)
    }
}

impl CorpusStore for DurableCorpus {
    fn fingerprint_exists(&self, fingerprint: &Fingerprint) -> StoreResult<bool> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let fingerprints = txn.open_table(FINGERPRINTS).map_err(redb("open_table"))?;
        if fingerprints
            .get(fingerprint.as_str())
            .map_err(redb("get"))?
            .is_some()
        {
            return Ok(true);
        }
        let seed_fps = txn.open_table(SEED_FINGERPRINTS).map_err(redb("open_table"))?;
        Ok(seed_fps
            .get(fingerprint.as_str())
            .map_err(redb("get"))?
            .is_some())
    }

    fn list_seed_texts(&self, category: &str) -> StoreResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let seeds = txn.open_table(SEEDS).map_err(redb("open_table"))?;
        let mut texts = Vec::new();
        for entry in seeds.iter().map_err(redb("iter"))? {
            let (_, value) = entry.map_err(redb("iter"))?;
            let seed: SeedEntry = decode(value.value())?;
            if seed.category == category {
                texts.push(seed.content);
            }
        }
        Ok(texts)
    }

    fn seed_sets(&self) -> StoreResult<BTreeMap<String, Vec<String>>> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let seeds = txn.open_table(SEEDS).map_err(redb("open_table"))?;
        let mut sets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in seeds.iter().map_err(redb("iter"))? {
            let (_, value) = entry.map_err(redb("iter"))?;
            let seed: SeedEntry = decode(value.value())?;
            sets.entry(seed.category).or_default().push(seed.content);
        }
        Ok(sets)
    }

    fn insert_record(&self, record: NewRecord) -> StoreResult<InsertOutcome> {
        let txn = self.db.begin_write().map_err(redb("begin_write"))?;
        let outcome = {
            let mut fingerprints = txn.open_table(FINGERPRINTS).map_err(redb("open_table"))?;
            let seed_fps = txn.open_table(SEED_FINGERPRINTS).map_err(redb("open_table"))?;
            let fp = record.fingerprint.to_string();

            if fingerprints.get(fp.as_str()).map_err(redb("get"))?.is_some()
                || seed_fps.get(fp.as_str()).map_err(redb("get"))?.is_some()
            {
                InsertOutcome::Duplicate
            } else {
                let mut meta = txn.open_table(META).map_err(redb("open_table"))?;
                let id = meta
                    .get(NEXT_ID_KEY)
                    .map_err(redb("get"))?
                    .map(|g| g.value())
                    .unwrap_or(1);
                meta.insert(NEXT_ID_KEY, id + 1).map_err(redb("insert"))?;

                let bytes = encode(&record.into_record(id))?;
                let mut records = txn.open_table(RECORDS).map_err(redb("open_table"))?;
                records.insert(id, bytes.as_slice()).map_err(redb("insert"))?;
                fingerprints.insert(fp.as_str(), id).map_err(redb("insert"))?;
                InsertOutcome::Inserted(id)
            }
        };

        match outcome {
            InsertOutcome::Inserted(id) => {
                txn.commit().map_err(redb("commit"))?;
                tracing::debug!(id, "record inserted");
            }
            InsertOutcome::Duplicate => {
                txn.abort().map_err(redb("abort"))?;
            }
        }
        Ok(outcome)
    }

    fn add_to_seed(&self, id: RecordId) -> StoreResult<SeedChange> {
        let txn = self.db.begin_write().map_err(redb("begin_write"))?;
        let change = {
            let records = txn.open_table(RECORDS).map_err(redb("open_table"))?;
            let record: CorpusRecord = match records.get(id).map_err(redb("get"))? {
                Some(guard) => decode(guard.value())?,
                None => return Err(StoreError::RecordNotFound { id }),
            };

            let mut seeds = txn.open_table(SEEDS).map_err(redb("open_table"))?;
            let changed = if seeds.get(id).map_err(redb("get"))?.is_some() {
                false
            } else {
                let bytes = encode(&SeedEntry::from(&record))?;
                seeds.insert(id, bytes.as_slice()).map_err(redb("insert"))?;
                let mut seed_fps = txn.open_table(SEED_FINGERPRINTS).map_err(redb("open_table"))?;
                seed_fps
                    .insert(record.fingerprint.as_str(), id)
                    .map_err(redb("insert"))?;
                true
            };
            SeedChange {
                id,
                changed,
                seed_count: seeds.len().map_err(redb("len"))?,
            }
        };
        txn.commit().map_err(redb("commit"))?;
        tracing::debug!(id, changed = change.changed, seeds = change.seed_count, "seed promote");
        Ok(change)
    }

    fn remove_from_seed(&self, id: RecordId) -> StoreResult<SeedChange> {
        let txn = self.db.begin_write().map_err(redb("begin_write"))?;
        let change = {
            let mut seeds = txn.open_table(SEEDS).map_err(redb("open_table"))?;
            let seed: SeedEntry = match seeds.remove(id).map_err(redb("remove"))? {
                Some(guard) => decode(guard.value())?,
                None => return Err(StoreError::NotSeeded { id }),
            };
            let mut seed_fps = txn.open_table(SEED_FINGERPRINTS).map_err(redb("open_table"))?;
            seed_fps
                .remove(seed.fingerprint.as_str())
                .map_err(redb("remove"))?;
            SeedChange {
                id,
                changed: true,
                seed_count: seeds.len().map_err(redb("len"))?,
            }
        };
        txn.commit().map_err(redb("commit"))?;
        tracing::debug!(id, seeds = change.seed_count, "seed demote");
        Ok(change)
    }

    fn delete_record(&self, id: RecordId) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(redb("begin_write"))?;
        {
            let mut records = txn.open_table(RECORDS).map_err(redb("open_table"))?;
            let record: CorpusRecord = match records.remove(id).map_err(redb("remove"))? {
                Some(guard) => decode(guard.value())?,
                None => return Err(StoreError::RecordNotFound { id }),
            };
            let mut fingerprints = txn.open_table(FINGERPRINTS).map_err(redb("open_table"))?;
            fingerprints
                .remove(record.fingerprint.as_str())
                .map_err(redb("remove"))?;
        }
        txn.commit().map_err(redb("commit"))?;
        tracing::debug!(id, "record deleted");
        Ok(())
    }

    fn lookup_record(&self, id: RecordId) -> StoreResult<Option<CorpusRecord>> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let records = txn.open_table(RECORDS).map_err(redb("open_table"))?;
        match records.get(id).map_err(redb("get"))? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn records_above(&self, threshold: f64) -> StoreResult<Vec<RecordId>> {
        self.records_where(|score| score >= threshold)
    }

    fn records_below(&self, threshold: f64) -> StoreResult<Vec<RecordId>> {
        self.records_where(|score| score < threshold)
    }

    fn seed_count(&self) -> StoreResult<u64> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let seeds = txn.open_table(SEEDS).map_err(redb("open_table"))?;
        seeds.len().map_err(redb("len"))
    }

    fn statistics(&self) -> StoreResult<CorpusStats> {
        let txn = self.db.begin_read().map_err(redb("begin_read"))?;
        let mut stats = CorpusStats::default();

        let records = txn.open_table(RECORDS).map_err(redb("open_table"))?;
        for entry in records.iter().map_err(redb("iter"))? {
            let (_, value) = entry.map_err(redb("iter"))?;
            stats.count_record(&decode(value.value())?);
        }

        let seeds = txn.open_table(SEEDS).map_err(redb("open_table"))?;
        for entry in seeds.iter().map_err(redb("iter"))? {
            let (_, value) = entry.map_err(redb("iter"))?;
            stats.count_seed(&decode(value.value())?);
        }
        Ok(stats)
    }
}

impl std::fmt::Debug for DurableCorpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableCorpus").finish()
    }
}
