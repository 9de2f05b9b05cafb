//! Pipeline driver: extract → transform → persist, one file at a time.
//!
//! Every eligible file in the input directory is processed to completion
//! before the next one starts. No per-file failure stops the run; each file
//! ends up as exactly one [`FileOutcome`] in the returned [`RunReport`].

use std::path::{Path, PathBuf};

use crate::config::FactoryConfig;
use crate::error::FactoryResult;
use crate::library::catalog::Upsert;
use crate::library::error::LibraryError;
use crate::library::model::{CatalogEntry, ContentFormat};
use crate::library::parser;
use crate::library::writer::{self, PersistOutcome};
use crate::transform::Transformer;

/// Why a file never reached the transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The extractor failed (I/O, encoding, corrupt document).
    Unreadable { message: String },
    /// Extracted text is not longer than the configured minimum.
    TooShort { chars: usize, min: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { message } => write!(f, "unreadable: {message}"),
            Self::TooShort { chars, min } => {
                write!(f, "too short: {chars} characters (needs more than {min})")
            }
        }
    }
}

/// Stage at which a file failed after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Transform,
    Write,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Transform => "transform",
            Self::Write => "write",
        })
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Artifact written and catalog updated.
    Ingested {
        entry: CatalogEntry,
        upsert: Upsert,
        artifact_path: PathBuf,
        catalog_reset: bool,
    },
    /// The model answered without a `modules` object; nothing was written.
    NoModules,
    Skipped(SkipReason),
    Failed { stage: FailureStage, message: String },
}

/// Outcome for a single input file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    /// File name within the input directory.
    pub file: String,
    pub format: ContentFormat,
    pub status: FileStatus,
}

/// Per-file outcomes of one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn ingested(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Ingested { .. }))
    }

    pub fn no_modules(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::NoModules))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    /// Times the library index was found corrupt and reset during the run.
    pub fn catalog_resets(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Ingested { catalog_reset: true, .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Supported files directly inside `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are ignored.
pub fn eligible_files(dir: &Path) -> std::io::Result<Vec<(PathBuf, ContentFormat)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match parser::detect_format(&path) {
            Some(format) => files.push((path, format)),
            None => tracing::debug!(path = %path.display(), "ignoring unsupported file"),
        }
    }
    files.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Sequential ingestion driver.
pub struct Pipeline<'a> {
    config: &'a FactoryConfig,
    transformer: &'a dyn Transformer,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a FactoryConfig, transformer: &'a dyn Transformer) -> Self {
        Self {
            config,
            transformer,
        }
    }

    /// Process every eligible file in the input directory.
    ///
    /// Only bootstrap problems (directories cannot be created or listed) are
    /// returned as errors.
    pub fn run(&self) -> FactoryResult<RunReport> {
        self.config.ensure_dirs()?;

        let input = self.config.input_path();
        let files = eligible_files(&input).map_err(|e| LibraryError::Read {
            path: input.display().to_string(),
            source: e,
        })?;

        let mut report = RunReport::default();
        if files.is_empty() {
            tracing::warn!(dir = %input.display(), "no supported files (txt, pdf, pptx) to process");
            return Ok(report);
        }

        tracing::info!(count = files.len(), "starting run");
        for (path, format) in files {
            report.outcomes.push(self.process_file(&path, format));
        }

        tracing::info!(
            ingested = report.ingested(),
            no_modules = report.no_modules(),
            skipped = report.skipped(),
            failed = report.failed(),
            "run complete"
        );
        Ok(report)
    }

    /// Run one file through all stages.
    pub fn process_file(&self, path: &Path, format: ContentFormat) -> FileOutcome {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let status = self.file_status(path, &file, format);
        FileOutcome {
            file,
            format,
            status,
        }
    }

    fn file_status(&self, path: &Path, file: &str, format: ContentFormat) -> FileStatus {
        let text = match parser::extract_file_as(path, format) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file, error = %e, "could not read file, skipping");
                return FileStatus::Skipped(SkipReason::Unreadable {
                    message: e.to_string(),
                });
            }
        };

        let chars = text.chars().count();
        let min = self.config.ingest.min_text_chars;
        if chars <= min {
            tracing::warn!(file, chars, min, "file is empty or too short, skipping");
            return FileStatus::Skipped(SkipReason::TooShort { chars, min });
        }

        let record = match self.transformer.transform(&text, file) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(file, error = %e, "transform failed");
                return FileStatus::Failed {
                    stage: FailureStage::Transform,
                    message: e.to_string(),
                };
            }
        };

        match writer::persist(&record, file, &self.config.layout(), &self.config.catalog) {
            Ok(PersistOutcome::Persisted {
                entry,
                upsert,
                artifact_path,
                catalog_reset,
            }) => FileStatus::Ingested {
                entry,
                upsert,
                artifact_path,
                catalog_reset,
            },
            Ok(PersistOutcome::NoModules) => FileStatus::NoModules,
            Err(e) => {
                tracing::error!(file, error = %e, "persist failed");
                FileStatus::Failed {
                    stage: FailureStage::Write,
                    message: e.to_string(),
                }
            }
        }
    }
}
