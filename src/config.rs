//! Factory configuration, persisted as TOML (`raven.toml`).
//!
//! Every field has a default, so a partial file (or none at all) works. The
//! configuration is an explicit value handed to the pipeline and the
//! transformer; nothing here is process-global.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::writer::{ArtifactLayout, EntryDefaults};
use crate::transform::ModelConfig;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "raven.toml";

/// Errors from configuration loading and directory bootstrap.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(raven::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(raven::config::parse),
        help("Check the TOML syntax; see `raven-factory init` for a complete example.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(raven::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(raven::config::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Input, output and index locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory the other paths are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Raw documents to ingest.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    /// Module artifacts; also the prefix of catalog urls.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// The library index.
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_input_dir() -> PathBuf {
    PathBuf::from("raw_data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("modules")
}
fn default_index_file() -> PathBuf {
    PathBuf::from("kutuphane.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            index_file: default_index_file(),
        }
    }
}

/// Extraction gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Text must be strictly longer than this many characters to be transformed.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
}

fn default_min_text_chars() -> usize {
    50
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
        }
    }
}

/// Complete factory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactoryConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub catalog: EntryDefaults,
}

impl FactoryConfig {
    /// Defaults rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: PathsConfig {
                root: root.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from `path` if given, else from `raven.toml` if it exists, else defaults.
    pub fn discover(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.paths.root.join(path)
        }
    }

    /// Resolved input directory.
    pub fn input_path(&self) -> PathBuf {
        self.resolve(&self.paths.input_dir)
    }

    /// Resolved output directory.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.paths.output_dir)
    }

    /// Resolved library index path.
    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.paths.index_file)
    }

    /// Catalog url prefix: the output directory as configured, `/`-separated.
    pub fn url_prefix(&self) -> String {
        self.paths.output_dir.to_string_lossy().replace('\\', "/")
    }

    /// Artifact layout for the catalog writer.
    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout {
            output_dir: self.output_path(),
            url_prefix: self.url_prefix(),
            index_path: self.index_path(),
        }
    }

    /// Create the input and output directories. Idempotent.
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        for dir in [self.input_path(), self.output_path()] {
            std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}
