// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # corpus-curate
//!
//! Curates a categorized text corpus. Loaders submit text samples, which are
//! fingerprinted for duplicate detection, classified into one of a fixed set
//! of topical categories, and stored with per-category scores. Accepters
//! review the corpus and promote records into the seed set that drives the
//! similarity classifier.
//!
//! ## Architecture
//!
//! - **Classification** (`classify`): term-frequency cosine similarity against
//!   seed texts, or keyword-list overlap; first-maximum selection with an
//!   acceptance threshold
//! - **Curation policy** (`policy`): duplicate check → classify → persist
//! - **Storage** (`store`): redb-backed ACID store, or an in-memory DashMap store
//! - **Configuration** (`config`): thresholds and categories from TOML
//!
//! ## Library usage
//!
//! ```no_run
//! use corpus_curate::config::CurateConfig;
//! use corpus_curate::policy::Curator;
//! use corpus_curate::store::MemCorpus;
//!
//! let curator = Curator::new(MemCorpus::new(), CurateConfig::bundled().unwrap());
//! let outcome = curator.submit_with_keywords("quantum energy force field").unwrap();
//! println!("{outcome}");
//! ```

pub mod category;
pub mod classify;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod paths;
pub mod policy;
pub mod record;
pub mod store;
