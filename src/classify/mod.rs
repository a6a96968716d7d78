//! Content-to-category classification.
//!
//! Two interchangeable [`Scorer`]s share one contract, `score(document, category)`:
//!
//! - [`SeedSimilarity`]: mean cosine similarity against each category's seed texts
//! - [`KeywordMatch`]: fraction of a category's keyword list present in the text
//!
//! [`classify`] scores every category independently, then applies the
//! selection rule: the best category is the first maximal score in
//! enumeration order, and it is accepted only if that score meets the
//! acceptance threshold.

pub mod keyword;
pub mod similarity;
pub mod tokenize;

use serde::{Deserialize, Serialize};

pub use keyword::{KeywordMatch, keyword_score};
pub use similarity::SeedSimilarity;
pub use tokenize::{Document, TermFrequency, cosine_similarity, tokenize};

use crate::category::{CategoryDef, CategorySet};
use crate::error::ClassifyError;

/// Which strategy produced a record's scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMethod {
    Seeds,
    Keywords,
}

impl FilterMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seeds => "seeds",
            Self::Keywords => "keywords",
        }
    }
}

impl std::fmt::Display for FilterMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "seeds" | "seed" | "similarity" => Ok(Self::Seeds),
            "keywords" | "keyword" => Ok(Self::Keywords),
            other => Err(format!("unknown filter method \"{other}\" (expected seeds or keywords)")),
        }
    }
}

/// A scoring strategy.
pub trait Scorer {
    /// The filter-method tag recorded with scores from this strategy.
    fn method(&self) -> FilterMethod;

    /// Score one category for a document.
    fn score(&self, doc: &Document, category: &CategoryDef) -> f64;
}

/// One category's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

/// One category's flag: 1 for the selected category, 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlag {
    pub category: String,
    pub flag: u8,
}

/// Scores for every category, in enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    scores: Vec<CategoryScore>,
}

impl ScoreCard {
    pub fn new(scores: Vec<CategoryScore>) -> Self {
        Self { scores }
    }

    /// Index of the first maximal score. `None` only for an empty card.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, s) in self.scores.iter().enumerate() {
            match best {
                Some((_, top)) if s.score <= top => {}
                _ => best = Some((i, s.score)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// The first maximal score.
    pub fn best(&self) -> Option<&CategoryScore> {
        self.best_index().map(|i| &self.scores[i])
    }

    /// Score for a category by name.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.score)
    }

    /// Flags derived from the scores: exactly one 1, on the best category.
    pub fn flags(&self) -> Vec<CategoryFlag> {
        let best = self.best_index();
        self.scores
            .iter()
            .enumerate()
            .map(|(i, s)| CategoryFlag {
                category: s.category.clone(),
                flag: u8::from(Some(i) == best),
            })
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryScore> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl std::fmt::Display for ScoreCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, s) in self.scores.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={:.4}", s.category, s.score)?;
        }
        Ok(())
    }
}

/// Result of one classification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub method: FilterMethod,
    pub scores: ScoreCard,
    pub threshold: f64,
    accepted: Option<usize>,
}

impl Classification {
    /// The accepted category, or `None` if the best score fell below the threshold.
    pub fn category(&self) -> Option<&str> {
        self.accepted
            .and_then(|i| self.scores.scores.get(i))
            .map(|s| s.category.as_str())
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted.is_some()
    }

    /// The best score regardless of acceptance.
    pub fn best(&self) -> Option<&CategoryScore> {
        self.scores.best()
    }
}

/// Reject thresholds that cannot be compared meaningfully.
pub fn validate_threshold(value: f64) -> Result<f64, ClassifyError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ClassifyError::InvalidThreshold { value })
    }
}

/// Score every category and apply the selection rule.
///
/// A best score equal to `threshold` is accepted; strictly below is not.
pub fn classify(
    scorer: &dyn Scorer,
    doc: &Document,
    categories: &CategorySet,
    threshold: f64,
) -> Classification {
    let scores = ScoreCard::new(
        categories
            .iter()
            .map(|def| CategoryScore {
                category: def.name.clone(),
                score: scorer.score(doc, def),
            })
            .collect(),
    );

    let accepted = scores
        .best_index()
        .filter(|&i| scores.scores[i].score >= threshold);

    Classification {
        method: scorer.method(),
        scores,
        threshold,
        accepted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CurateConfig;

    fn categories() -> CategorySet {
        CurateConfig::bundled().unwrap().categories
    }

    fn card(values: &[(&str, f64)]) -> ScoreCard {
        ScoreCard::new(
            values
                .iter()
                .map(|(c, s)| CategoryScore {
                    category: c.to_string(),
                    score: *s,
                })
                .collect(),
        )
    }

    #[test]
    fn physics_scenario() {
        let doc = Document::new("quantum energy force field");
        let c = classify(&KeywordMatch, &doc, &categories(), 0.2);
        assert_eq!(c.category(), Some("physics"));
        assert_eq!(c.scores.get("physics"), Some(0.3));
        assert_eq!(c.scores.get("history"), Some(0.0));
        assert_eq!(c.scores.get("finance"), Some(0.0));
        assert_eq!(c.scores.get("chemistry"), Some(0.0));
        assert_eq!(c.method, FilterMethod::Keywords);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // Two of ten finance keywords: exactly 0.2.
        let doc = Document::new("the market and the bank");
        let c = classify(&KeywordMatch, &doc, &categories(), 0.2);
        assert_eq!(c.scores.get("finance"), Some(0.2));
        assert_eq!(c.category(), Some("finance"));

        // One of ten: 0.1, strictly below.
        let doc = Document::new("the market");
        let c = classify(&KeywordMatch, &doc, &categories(), 0.2);
        assert_eq!(c.scores.get("finance"), Some(0.1));
        assert_eq!(c.category(), None);
        assert!(!c.is_accepted());
        assert_eq!(c.best().unwrap().category, "finance");
    }

    #[test]
    fn punctuation_only_is_unclassifiable() {
        let doc = Document::new("?!? ... ---");
        let c = classify(&KeywordMatch, &doc, &categories(), 0.2);
        assert!(c.scores.iter().all(|s| s.score == 0.0));
        assert_eq!(c.category(), None);
    }

    #[test]
    fn ties_go_to_first_in_enumeration_order() {
        // history and finance both match one keyword.
        let doc = Document::new("war market");
        let c = classify(&KeywordMatch, &doc, &categories(), 0.1);
        assert_eq!(c.category(), Some("history"));

        let c = card(&[("a", 0.0), ("b", 0.5), ("c", 0.5)]);
        assert_eq!(c.best().unwrap().category, "b");
    }

    #[test]
    fn all_zero_picks_first_category() {
        let c = card(&[("history", 0.0), ("finance", 0.0)]);
        assert_eq!(c.best_index(), Some(0));
    }

    #[test]
    fn flags_have_exactly_one_set_on_best() {
        let c = card(&[("history", 0.1), ("finance", 0.3), ("physics", 0.3), ("chemistry", 0.2)]);
        let flags = c.flags();
        assert_eq!(flags.iter().map(|f| f.flag).collect::<Vec<_>>(), vec![0, 1, 0, 0]);
        assert_eq!(flags.iter().filter(|f| f.flag == 1).count(), 1);
    }

    #[test]
    fn zero_threshold_accepts_anything() {
        let doc = Document::new("!!!");
        let c = classify(&KeywordMatch, &doc, &categories(), 0.0);
        assert_eq!(c.category(), Some("history"));
    }

    #[test]
    fn similarity_scorer_through_classify() {
        let scorer = SeedSimilarity::from_seed_texts([(
            "chemistry".to_string(),
            vec!["acid base reaction".to_string()],
        )]);
        let doc = Document::new("acid base reaction");
        let c = classify(&scorer, &doc, &categories(), 0.2);
        assert_eq!(c.category(), Some("chemistry"));
        assert_eq!(c.scores.get("chemistry"), Some(1.0));
        assert_eq!(c.method, FilterMethod::Seeds);
    }

    #[test]
    fn filter_method_parses() {
        assert_eq!("seeds".parse::<FilterMethod>().unwrap(), FilterMethod::Seeds);
        assert_eq!("Keywords".parse::<FilterMethod>().unwrap(), FilterMethod::Keywords);
        assert!("bayes".parse::<FilterMethod>().is_err());
        assert_eq!(FilterMethod::Seeds.to_string(), "seeds");
    }

    #[test]
    fn threshold_validation() {
        assert_eq!(validate_threshold(0.2).unwrap(), 0.2);
        assert!(validate_threshold(f64::NAN).is_err());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.1).is_err());
    }
}
