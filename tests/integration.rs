//! End-to-end integration tests for corpus curation.
//!
//! These tests drive the full submission and curation flow against the
//! redb-backed store: fingerprinting, both classifiers, persistence, seed
//! curation, and the quality queries.

use corpus_curate::category::{CategoryDef, CategorySet};
use corpus_curate::classify::FilterMethod;
use corpus_curate::config::CurateConfig;
use corpus_curate::error::{CurateError, StoreError};
use corpus_curate::fingerprint::Fingerprint;
use corpus_curate::policy::{Curator, SubmissionOutcome};
use corpus_curate::record::RecordId;
use corpus_curate::store::{CorpusStore, DurableCorpus};

fn durable_curator(dir: &std::path::Path) -> Curator<DurableCorpus> {
    let store = DurableCorpus::open(&dir.join("corpus.redb")).unwrap();
    Curator::new(store, CurateConfig::bundled().unwrap())
}

fn accepted(outcome: SubmissionOutcome) -> RecordId {
    match outcome {
        SubmissionOutcome::Accepted { id, .. } => id,
        other => panic!("expected acceptance, got: {other}"),
    }
}

#[test]
fn end_to_end_keywords_then_seeds() {
    let dir = tempfile::TempDir::new().unwrap();
    let curator = durable_curator(dir.path());

    // Bootstrap with the keyword classifier.
    let history = accepted(curator.submit_with_keywords("The ancient empire fell after a long war.").unwrap());
    let finance = accepted(curator.submit_with_keywords("Stock market investment and inflation.").unwrap());
    let physics = accepted(curator.submit_with_keywords("Quantum particle wave motion.").unwrap());
    let chemistry = accepted(curator.submit_with_keywords("An acid base reaction needs a catalyst.").unwrap());

    // Curate seeds from the accepted records.
    for id in [history, finance, physics, chemistry] {
        curator.promote_to_seed(id).unwrap();
    }
    assert_eq!(curator.store().seed_count().unwrap(), 4);

    // The similarity classifier now has references for every category.
    match curator
        .submit_with_similarity("a war between the empire and its rivals")
        .unwrap()
    {
        SubmissionOutcome::Accepted {
            category, method, ..
        } => {
            assert_eq!(category, "history");
            assert_eq!(method, FilterMethod::Seeds);
        }
        other => panic!("unexpected outcome: {other}"),
    }

    let stats = curator.statistics().unwrap();
    assert_eq!(stats.records, 5);
    assert_eq!(stats.seeds, 4);
    assert_eq!(stats.records_by_method["keywords"], 4);
    assert_eq!(stats.records_by_method["seeds"], 1);
    assert_eq!(stats.records_by_category["history"], 2);
}

#[test]
fn four_outcomes_are_distinguishable() {
    let dir = tempfile::TempDir::new().unwrap();
    let curator = durable_curator(dir.path());

    let first = curator.submit_with_keywords("quantum energy force field").unwrap();
    assert!(matches!(first, SubmissionOutcome::Accepted { ref category, .. } if category == "physics"));

    let second = curator.submit_with_keywords("quantum energy force field").unwrap();
    assert!(matches!(second, SubmissionOutcome::Duplicate { .. }));

    let third = curator.submit_with_keywords("...!!!").unwrap();
    assert!(matches!(third, SubmissionOutcome::BelowThreshold { .. }));

    let err = curator.promote_to_seed(404).unwrap_err();
    assert!(matches!(err, CurateError::Store(StoreError::RecordNotFound { id: 404 })));
}

#[test]
fn duplicates_detected_across_methods_and_seeds() {
    let dir = tempfile::TempDir::new().unwrap();
    let curator = durable_curator(dir.path());

    let content = "medieval dynasty and colonial revolution";
    let id = accepted(curator.submit_with_keywords(content).unwrap());
    curator.promote_to_seed(id).unwrap();

    // Delete the record; its seed copy still guards the fingerprint.
    curator.delete_record(id).unwrap();
    assert!(curator.record_info(id).unwrap().is_none());
    match curator.submit_with_similarity(content).unwrap() {
        SubmissionOutcome::Duplicate { fingerprint } => assert_eq!(fingerprint, Fingerprint::of(content)),
        other => panic!("unexpected outcome: {other}"),
    }

    // Demoting releases it.
    assert_eq!(curator.demote_from_seed(id).unwrap().seed_count, 0);
    assert!(curator.submit_with_keywords(content).unwrap().is_accepted());
}

#[test]
fn accepted_records_carry_all_scores_and_one_flag() {
    let dir = tempfile::TempDir::new().unwrap();
    let curator = durable_curator(dir.path());

    let id = accepted(curator.submit_with_keywords("bank capital and the chemical bond market").unwrap());
    let record = curator.record_info(id).unwrap().unwrap();
    assert_eq!(record.scores.len(), 4);
    assert_eq!(record.category, "finance");
    assert_eq!(record.scores.get("finance"), Some(0.3));
    assert_eq!(record.scores.get("chemistry"), Some(0.2));

    let sample = curator.training_sample(id).unwrap().unwrap();
    let flags: Vec<(&str, u8)> = sample.flags.iter().map(|f| (f.category.as_str(), f.flag)).collect();
    assert_eq!(
        flags,
        vec![("history", 0), ("finance", 1), ("physics", 0), ("chemistry", 0)]
    );
}

#[test]
fn quality_retrieval() {
    let dir = tempfile::TempDir::new().unwrap();
    let curator = durable_curator(dir.path());

    let weak = accepted(curator.submit_with_keywords("war empire").unwrap()); // 0.2
    let mid = accepted(curator.submit_with_keywords("stock market trade").unwrap()); // 0.3
    let strong = accepted(curator.submit_with_keywords("acid base organic compound bond").unwrap()); // 0.5

    let high: Vec<RecordId> = curator.high_quality(None).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(high, vec![strong]);

    let low: Vec<RecordId> = curator.low_quality(None).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(low, vec![weak]);

    let at_least_mid: Vec<RecordId> = curator.high_quality(Some(0.3)).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(at_least_mid, vec![mid, strong]);
}

#[test]
fn custom_category_set() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = DurableCorpus::open(&dir.path().join("corpus.redb")).unwrap();
    let mut config = CurateConfig::bundled().unwrap();
    config.categories = CategorySet::new(vec![
        CategoryDef::new("poetry", ["verse", "rhyme", "stanza", "meter"]),
        CategoryDef::new("law", ["court", "statute", "plaintiff", "appeal"]),
    ])
    .unwrap();
    let curator = Curator::new(store, config);

    match curator.submit_with_keywords("the plaintiff filed an appeal").unwrap() {
        SubmissionOutcome::Accepted { category, scores, .. } => {
            assert_eq!(category, "law");
            assert_eq!(scores.get("law"), Some(0.5));
            assert_eq!(scores.len(), 2);
        }
        other => panic!("unexpected outcome: {other}"),
    }
}
