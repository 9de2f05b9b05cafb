//! Persistent library index backed by a single JSON array (`kutuphane.json`).
//!
//! Entries are keyed by `url` and keep their position forever: an update
//! replaces in place, a new url appends. Entries are held as raw JSON, so
//! entries written by other tools (extra fields, numeric `class`, `null`
//! values) are rewritten untouched. Persistence is read-all / write-all with
//! no locking; two concurrent runs race on the file.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::CatalogEntry;

/// Where an upserted entry ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// New url, appended at `position`.
    Inserted { position: usize },
    /// Existing url, replaced in place at `position`.
    Replaced { position: usize },
}

impl Upsert {
    pub fn position(&self) -> usize {
        match self {
            Self::Inserted { position } | Self::Replaced { position } => *position,
        }
    }
}

/// Ordered index of all module artifacts.
#[derive(Debug)]
pub struct LibraryCatalog {
    path: PathBuf,
    entries: Vec<Value>,
    reset_from_corruption: bool,
}

impl LibraryCatalog {
    /// Open the catalog file at `path`.
    ///
    /// A missing file is an empty catalog. A file that is not valid JSON, or
    /// whose top level is not an array, is also treated as empty, but the
    /// reset is recorded (see [`was_reset`](Self::was_reset)) and logged.
    /// The shape of individual entries is never checked. Other read failures
    /// are errors.
    pub fn open(path: &Path) -> LibraryResult<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path: path.to_path_buf(),
                    entries: Vec::new(),
                    reset_from_corruption: false,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(path = %path.display(), error = %e, "catalog is not UTF-8, starting empty");
                return Ok(Self::reset(path));
            }
            Err(e) => {
                return Err(LibraryError::CatalogIo {
                    message: format!("read {}: {e}", path.display()),
                });
            }
        };

        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Array(entries)) => Ok(Self {
                path: path.to_path_buf(),
                entries,
                reset_from_corruption: false,
            }),
            Ok(other) => {
                tracing::warn!(
                    path = %path.display(),
                    found = json_kind(&other),
                    "catalog is not a JSON array, starting empty"
                );
                Ok(Self::reset(path))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "catalog is corrupt, starting empty");
                Ok(Self::reset(path))
            }
        }
    }

    fn reset(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
            reset_from_corruption: true,
        }
    }

    /// Whether `open` discarded an unreadable catalog.
    pub fn was_reset(&self) -> bool {
        self.reset_from_corruption
    }

    fn position_of(&self, url: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.get("url").and_then(Value::as_str) == Some(url))
    }

    /// Insert or replace the entry with the same `url`. In-memory only.
    pub fn upsert(&mut self, entry: CatalogEntry) -> Upsert {
        let position = self.position_of(&entry.url);
        let value = entry.to_value();
        match position {
            Some(position) => {
                self.entries[position] = value;
                Upsert::Replaced { position }
            }
            None => {
                self.entries.push(value);
                Upsert::Inserted {
                    position: self.entries.len() - 1,
                }
            }
        }
    }

    /// Flush the catalog to disk, overwriting the previous file.
    pub fn flush(&self) -> LibraryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LibraryError::CatalogIo {
                message: format!("create dir {}: {e}", parent.display()),
            })?;
        }
        let mut json =
            serde_json::to_string_pretty(&self.entries).map_err(|e| LibraryError::CatalogIo {
                message: format!("serialize catalog: {e}"),
            })?;
        json.push('\n');
        std::fs::write(&self.path, json).map_err(|e| LibraryError::CatalogIo {
            message: format!("write {}: {e}", self.path.display()),
        })
    }

    /// Look up an entry by artifact url.
    pub fn get(&self, url: &str) -> Option<CatalogEntry> {
        self.position_of(url)
            .map(|i| CatalogEntry::from_value(&self.entries[i]))
    }

    /// All entries in catalog order, projected leniently.
    pub fn list(&self) -> Vec<CatalogEntry> {
        self.entries.iter().map(CatalogEntry::from_value).collect()
    }

    /// All entries in catalog order, exactly as stored.
    pub fn raw_entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
