//! Curation configuration: thresholds and the category set.
//!
//! The default configuration is bundled into the binary (`data/curate.toml`).
//! An operator can override it with a TOML file of the same shape, either
//! passed explicitly or placed at `$XDG_CONFIG_HOME/corpus-curate/curate.toml`.
//! Configuration is loaded once at startup and is immutable afterwards.

use std::path::Path;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::category::{CategoryDef, CategorySet};
use crate::paths::CuratePaths;

/// Bundled default configuration.
pub const BUNDLED_CONFIG: &str = include_str!("../data/curate.toml");

/// Errors from loading or validating configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(curate::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {origin}: {message}")]
    #[diagnostic(
        code(curate::config::parse),
        help("Check the TOML syntax. `curate init` writes a commented default config.")
    )]
    Parse { origin: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(curate::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config defines no categories")]
    #[diagnostic(
        code(curate::config::no_categories),
        help("Add at least one [[categories]] table with a name and a keyword list.")
    )]
    NoCategories,

    #[error("invalid category \"{name}\": {message}")]
    #[diagnostic(
        code(curate::config::category),
        help("Category names must be unique and non-empty; keyword lists must be non-empty single words without repeats.")
    )]
    InvalidCategory { name: String, message: String },

    #[error("invalid {field}: {value}")]
    #[diagnostic(
        code(curate::config::threshold),
        help("Thresholds must be finite numbers between 0.0 and 1.0.")
    )]
    InvalidThreshold { field: &'static str, value: f64 },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Validated curation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CurateConfig {
    /// Minimum best-category score for a submission to be stored.
    pub threshold: f64,
    /// Default cut-off for high-quality retrieval (`>=`).
    pub high_threshold: f64,
    /// Default cut-off for low-quality retrieval (`<`).
    pub low_threshold: f64,
    /// Categories in enumeration order.
    pub categories: CategorySet,
}

// ── TOML deserialization helpers ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ConfigToml {
    #[serde(default)]
    acceptance: AcceptanceToml,
    #[serde(default)]
    quality: QualityToml,
    #[serde(default)]
    categories: Vec<CategoryDef>,
}

#[derive(Debug, Deserialize)]
struct AcceptanceToml {
    #[serde(default = "default_threshold")]
    threshold: f64,
}

#[derive(Debug, Deserialize)]
struct QualityToml {
    #[serde(default = "default_high_threshold")]
    high_threshold: f64,
    #[serde(default = "default_low_threshold")]
    low_threshold: f64,
}

fn default_threshold() -> f64 {
    0.2
}
fn default_high_threshold() -> f64 {
    0.4
}
fn default_low_threshold() -> f64 {
    0.3
}

impl Default for AcceptanceToml {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Default for QualityToml {
    fn default() -> Self {
        Self {
            high_threshold: default_high_threshold(),
            low_threshold: default_low_threshold(),
        }
    }
}

fn check_threshold(field: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold { field, value })
    }
}

impl CurateConfig {
    /// The configuration bundled into the binary.
    pub fn bundled() -> ConfigResult<Self> {
        Self::from_toml_str(BUNDLED_CONFIG, "<bundled>")
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_toml_str(toml_str: &str, origin: &str) -> ConfigResult<Self> {
        let parsed: ConfigToml = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            threshold: check_threshold("acceptance.threshold", parsed.acceptance.threshold)?,
            high_threshold: check_threshold("quality.high_threshold", parsed.quality.high_threshold)?,
            low_threshold: check_threshold("quality.low_threshold", parsed.quality.low_threshold)?,
            categories: CategorySet::new(parsed.categories)?,
        })
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Resolve the active configuration: an explicit path wins, then the
    /// config file under the XDG config directory, then the bundled default.
    pub fn resolve(explicit: Option<&Path>, paths: &CuratePaths) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = paths.config_file();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Self::bundled()
        }
    }

    /// Write the bundled default configuration to `path`, creating parents.
    pub fn write_default(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, BUNDLED_CONFIG).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_has_reference_categories() {
        let config = CurateConfig::bundled().unwrap();
        assert_eq!(config.threshold, 0.2);
        assert_eq!(config.high_threshold, 0.4);
        assert_eq!(config.low_threshold, 0.3);
        assert_eq!(
            config.categories.names().collect::<Vec<_>>(),
            vec!["history", "finance", "physics", "chemistry"]
        );
        for def in &config.categories {
            assert_eq!(def.keywords.len(), 10, "{} keyword count", def.name);
        }
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = CurateConfig::from_toml_str(
            r#"
            [[categories]]
            name = "poetry"
            keywords = ["verse", "rhyme"]
            "#,
            "test",
        )
        .unwrap();
        assert_eq!(config.threshold, 0.2);
        assert_eq!(config.categories.len(), 1);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let err = CurateConfig::from_toml_str(
            r#"
            [acceptance]
            threshold = 1.5

            [[categories]]
            name = "poetry"
            keywords = ["verse"]
            "#,
            "test",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThreshold {
                field: "acceptance.threshold",
                ..
            }
        ));
    }

    #[test]
    fn no_categories_rejected() {
        let err = CurateConfig::from_toml_str("[acceptance]\nthreshold = 0.2\n", "test").unwrap_err();
        assert!(matches!(err, ConfigError::NoCategories));
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let err = CurateConfig::from_toml_str("[[categories]\n", "broken.toml").unwrap_err();
        match err {
            ConfigError::Parse { origin, .. } => assert_eq!(origin, "broken.toml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_default_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("curate.toml");
        CurateConfig::write_default(&path).unwrap();
        assert_eq!(CurateConfig::load(&path).unwrap(), CurateConfig::bundled().unwrap());
    }

    #[test]
    fn resolve_prefers_explicit_then_xdg_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = CuratePaths {
            config_dir: dir.path().join("cfg"),
            data_dir: dir.path().join("data"),
        };

        // Nothing on disk: bundled.
        let config = CurateConfig::resolve(None, &paths).unwrap();
        assert_eq!(config.categories.len(), 4);

        // XDG file present.
        std::fs::create_dir_all(&paths.config_dir).unwrap();
        std::fs::write(
            paths.config_file(),
            "[[categories]]\nname = \"poetry\"\nkeywords = [\"verse\"]\n",
        )
        .unwrap();
        let config = CurateConfig::resolve(None, &paths).unwrap();
        assert_eq!(config.categories.names().collect::<Vec<_>>(), vec!["poetry"]);

        // Explicit path wins.
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, "[[categories]]\nname = \"law\"\nkeywords = [\"court\"]\n").unwrap();
        let config = CurateConfig::resolve(Some(&explicit), &paths).unwrap();
        assert_eq!(config.categories.names().collect::<Vec<_>>(), vec!["law"]);
    }
}
