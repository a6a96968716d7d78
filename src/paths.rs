//! XDG-compliant path resolution for corpus-curate.
//!
//! Resolves where the configuration file and the corpus database live,
//! following the XDG Base Directory Specification.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Directory name used under every XDG base directory.
const APP_DIR: &str = "corpus-curate";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(curate::paths::no_home),
        help("Set the HOME environment variable, or pass --data-dir and --config explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(curate::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Directories used by the curation tool.
#[derive(Debug, Clone)]
pub struct CuratePaths {
    /// `$XDG_CONFIG_HOME/corpus-curate/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/corpus-curate/`
    pub data_dir: PathBuf,
}

impl CuratePaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join(APP_DIR);

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Replace the data directory (e.g. from `--data-dir`).
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Create all directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("curate.toml")
    }

    /// Path to the corpus database.
    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("corpus.redb")
    }
}
