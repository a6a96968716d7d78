//! Topical categories and their keyword lists.
//!
//! A [`CategorySet`] is an ordered, validated, immutable list of categories.
//! Its order is the enumeration order used for tie-breaking and for laying
//! out per-category scores and flags.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};

/// One category: a name and its representative keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryDef {
    pub fn new<S: Into<String>>(name: impl Into<String>, keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered set of categories, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<CategoryDef>,
}

impl CategorySet {
    /// Validate and build a category set.
    ///
    /// Keywords are lower-cased so they compare against lower-cased tokens.
    pub fn new(categories: Vec<CategoryDef>) -> ConfigResult<Self> {
        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut names = HashSet::new();
        let mut normalized = Vec::with_capacity(categories.len());
        for def in categories {
            let name = def.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::InvalidCategory {
                    name: def.name,
                    message: "category name is empty".into(),
                });
            }
            if !names.insert(name.clone()) {
                return Err(ConfigError::InvalidCategory {
                    name,
                    message: "category is defined more than once".into(),
                });
            }
            if def.keywords.is_empty() {
                return Err(ConfigError::InvalidCategory {
                    name,
                    message: "keyword list is empty".into(),
                });
            }

            let mut seen = HashSet::new();
            let mut keywords = Vec::with_capacity(def.keywords.len());
            for kw in def.keywords {
                let kw = kw.trim().to_lowercase();
                if kw.is_empty() {
                    return Err(ConfigError::InvalidCategory {
                        name,
                        message: "keyword list contains an empty keyword".into(),
                    });
                }
                if crate::classify::tokenize(&kw) != [kw.as_str()] {
                    return Err(ConfigError::InvalidCategory {
                        name,
                        message: format!("keyword \"{kw}\" is not a single word token"),
                    });
                }
                if !seen.insert(kw.clone()) {
                    return Err(ConfigError::InvalidCategory {
                        name,
                        message: format!("keyword \"{kw}\" is listed more than once"),
                    });
                }
                keywords.push(kw);
            }
            normalized.push(CategoryDef { name, keywords });
        }

        Ok(Self {
            categories: normalized,
        })
    }

    /// Categories in enumeration order.
    pub fn iter(&self) -> std::slice::Iter<'_, CategoryDef> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category by name.
    pub fn get(&self, name: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category names in enumeration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn as_slice(&self) -> &[CategoryDef] {
        &self.categories
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a CategoryDef;
    type IntoIter = std::slice::Iter<'a, CategoryDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_lowercased() {
        let set = CategorySet::new(vec![CategoryDef::new("physics", ["Quantum", " Energy "])]).unwrap();
        assert_eq!(set.get("physics").unwrap().keywords, vec!["quantum", "energy"]);
    }

    #[test]
    fn order_is_preserved() {
        let set = CategorySet::new(vec![
            CategoryDef::new("b", ["x"]),
            CategoryDef::new("a", ["y"]),
        ])
        .unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn rejects_empty_set() {
        assert!(matches!(CategorySet::new(vec![]), Err(ConfigError::NoCategories)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = CategorySet::new(vec![
            CategoryDef::new("history", ["war"]),
            CategoryDef::new("history", ["empire"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCategory { .. }));
    }

    #[test]
    fn rejects_empty_keywords() {
        let err = CategorySet::new(vec![CategoryDef::new("finance", Vec::<String>::new())]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCategory { .. }));
    }

    #[test]
    fn rejects_keywords_that_never_match_a_token() {
        for bad in ["black hole", "co-op", "c++"] {
            let err = CategorySet::new(vec![CategoryDef::new("astro", [bad, "star"])]).unwrap_err();
            match err {
                ConfigError::InvalidCategory { name, message } => {
                    assert_eq!(name, "astro");
                    assert!(message.contains(bad), "{message}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(CategorySet::new(vec![CategoryDef::new("astro", ["star", "galaxy_cluster", "m31"])]).is_ok());
    }

    #[test]
    fn rejects_duplicate_keywords_after_normalization() {
        let err = CategorySet::new(vec![CategoryDef::new("finance", ["Bank", "bank"])]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCategory { .. }));
    }
}
