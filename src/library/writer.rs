//! Catalog writer: persists a module record as an artifact and upserts its
//! summary into the library index.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::library::catalog::{LibraryCatalog, Upsert};
use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::{CatalogEntry, ModuleRecord};

/// Extension of module artifacts.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Values substituted into catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDefaults {
    /// Always written as the entry author, whatever the model produced.
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_code")]
    pub default_code: String,
    #[serde(default = "default_class")]
    pub default_class: String,
    #[serde(default = "default_block")]
    pub default_block: String,
}

fn default_author() -> String {
    "RA'VEN AI".into()
}
fn default_code() -> String {
    "GEM-01".into()
}
fn default_class() -> String {
    "3".into()
}
fn default_block() -> String {
    "GENEL".into()
}

impl Default for EntryDefaults {
    fn default() -> Self {
        Self {
            author: default_author(),
            default_code: default_code(),
            default_class: default_class(),
            default_block: default_block(),
        }
    }
}

/// Where artifacts and the index live.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    /// Directory artifacts are written to.
    pub output_dir: PathBuf,
    /// Prefix of catalog urls, normally the output directory as configured
    /// (relative, `/`-separated).
    pub url_prefix: String,
    /// Path of the library index file.
    pub index_path: PathBuf,
}

impl ArtifactLayout {
    /// Catalog url of an artifact file name.
    pub fn url_for(&self, artifact_name: &str) -> String {
        let prefix = self.url_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            artifact_name.to_string()
        } else {
            format!("{prefix}/{artifact_name}")
        }
    }
}

/// Result of persisting one record.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    /// Artifact written and catalog updated.
    Persisted {
        entry: CatalogEntry,
        upsert: Upsert,
        artifact_path: PathBuf,
        /// The existing index was unreadable and was replaced by an empty one.
        catalog_reset: bool,
    },
    /// The record had no `modules` object; nothing was touched.
    NoModules,
}

/// Artifact file name for a source file: the extension swapped for `.json`.
pub fn artifact_filename(source_filename: &str) -> String {
    let path = Path::new(source_filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_filename.to_string());
    format!("{stem}.{ARTIFACT_EXTENSION}")
}

/// Project a record into its catalog entry.
pub fn catalog_entry(record: &ModuleRecord, url: String, defaults: &EntryDefaults) -> CatalogEntry {
    CatalogEntry {
        id: record.module_field("id"),
        code: record
            .module_field("code")
            .unwrap_or_else(|| defaults.default_code.clone()),
        title: record.module_field("title"),
        author: defaults.author.clone(),
        tag: record.module_field("tag"),
        class: record
            .module_field("class")
            .unwrap_or_else(|| defaults.default_class.clone()),
        block: record
            .module_field("block")
            .unwrap_or_else(|| defaults.default_block.clone()),
        url,
    }
}

/// Write the artifact for `record` and upsert its entry into the index.
///
/// A record without a `modules` object is a no-op.
pub fn persist(
    record: &ModuleRecord,
    source_filename: &str,
    layout: &ArtifactLayout,
    defaults: &EntryDefaults,
) -> LibraryResult<PersistOutcome> {
    if record.modules().is_none() {
        tracing::warn!(file = source_filename, "record has no modules object, nothing persisted");
        return Ok(PersistOutcome::NoModules);
    }
    if record.module_field("id").is_none() {
        tracing::warn!(file = source_filename, "record has no modules.id");
    }

    let artifact_name = artifact_filename(source_filename);
    let artifact_path = layout.output_dir.join(&artifact_name);
    write_artifact(record, &artifact_path)?;
    tracing::info!(path = %artifact_path.display(), "module artifact written");

    let entry = catalog_entry(record, layout.url_for(&artifact_name), defaults);

    let mut catalog = LibraryCatalog::open(&layout.index_path)?;
    let catalog_reset = catalog.was_reset();
    let upsert = catalog.upsert(entry.clone());
    catalog.flush()?;

    match upsert {
        Upsert::Inserted { position } => {
            tracing::info!(title = entry.display_title(), position, "added to library")
        }
        Upsert::Replaced { position } => {
            tracing::info!(title = entry.display_title(), position, "library entry updated")
        }
    }

    Ok(PersistOutcome::Persisted {
        entry,
        upsert,
        artifact_path,
        catalog_reset,
    })
}

fn write_artifact(record: &ModuleRecord, path: &Path) -> LibraryResult<()> {
    let mut json = serde_json::to_string_pretty(record.raw()).map_err(|e| {
        LibraryError::Serialize {
            message: e.to_string(),
        }
    })?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| LibraryError::ArtifactWrite {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout(root: &Path) -> ArtifactLayout {
        let output_dir = root.join("modules");
        std::fs::create_dir_all(&output_dir).unwrap();
        ArtifactLayout {
            output_dir,
            url_prefix: "modules".into(),
            index_path: root.join("kutuphane.json"),
        }
    }

    fn record(title: &str) -> ModuleRecord {
        ModuleRecord::new(json!({
            "meta": { "title": title, "tag": "FİZYOLOJİ" },
            "modules": {
                "id": "kalp_dongusu",
                "code": "CARD-01",
                "title": title,
                "author": "Someone Else",
                "tag": "FİZYOLOJİ",
                "url": "modules/whatever.json",
                "summary": { "text": "<div class='summary-container'>…</div>" },
                "quiz": [ { "q": "Sistol nedir?", "a": ["Kasılma", "Gevşeme"], "correct": 0 } ]
            }
        }))
    }

    #[test]
    fn artifact_filename_swaps_extension() {
        assert_eq!(artifact_filename("intro.txt"), "intro.json");
        assert_eq!(artifact_filename("deck.pptx"), "deck.json");
        assert_eq!(artifact_filename("ders.notlari.pdf"), "ders.notlari.json");
        assert_eq!(artifact_filename("README"), "README.json");
    }

    #[test]
    fn url_joins_prefix() {
        let l = ArtifactLayout {
            output_dir: PathBuf::from("/tmp/x"),
            url_prefix: "modules/".into(),
            index_path: PathBuf::from("/tmp/k.json"),
        };
        assert_eq!(l.url_for("a.json"), "modules/a.json");
        let bare = ArtifactLayout {
            url_prefix: String::new(),
            ..l
        };
        assert_eq!(bare.url_for("a.json"), "a.json");
    }

    #[test]
    fn entry_applies_defaults_and_overrides_author() {
        let rec = ModuleRecord::new(json!({ "modules": { "id": "x", "author": "Model" } }));
        let entry = catalog_entry(&rec, "modules/x.json".into(), &EntryDefaults::default());
        assert_eq!(entry.id.as_deref(), Some("x"));
        assert_eq!(entry.code, "GEM-01");
        assert_eq!(entry.class, "3");
        assert_eq!(entry.block, "GENEL");
        assert_eq!(entry.author, "RA'VEN AI");
        assert!(entry.title.is_none());
        assert!(entry.tag.is_none());
    }

    #[test]
    fn persist_writes_artifact_verbatim_and_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = layout(dir.path());
        let rec = record("Kalp Döngüsü");

        let outcome = persist(&rec, "kalp.pdf", &layout, &EntryDefaults::default()).unwrap();
        let PersistOutcome::Persisted { entry, upsert, artifact_path, catalog_reset } = outcome
        else {
            panic!("expected Persisted");
        };
        assert_eq!(upsert, Upsert::Inserted { position: 0 });
        assert!(!catalog_reset);
        assert_eq!(artifact_path, dir.path().join("modules/kalp.json"));
        assert_eq!(entry.url, "modules/kalp.json");
        assert_eq!(entry.code, "CARD-01");

        let raw = std::fs::read_to_string(&artifact_path).unwrap();
        assert!(raw.contains("Kalp Döngüsü"));
        assert!(raw.contains("\n  \"meta\""));
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(&stored, rec.raw());
        // The artifact keeps the model's author; only the entry is overwritten.
        assert_eq!(stored["modules"]["author"], "Someone Else");

        let catalog = LibraryCatalog::open(&layout.index_path).unwrap();
        assert_eq!(catalog.list(), vec![entry]);
    }

    #[test]
    fn persist_twice_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = layout(dir.path());
        let defaults = EntryDefaults::default();

        persist(&record("İlk"), "kalp.txt", &layout, &defaults).unwrap();
        let second = persist(&record("İkinci"), "kalp.txt", &layout, &defaults).unwrap();
        assert!(matches!(
            second,
            PersistOutcome::Persisted { upsert: Upsert::Replaced { position: 0 }, .. }
        ));

        let catalog = LibraryCatalog::open(&layout.index_path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.list()[0].title.as_deref(), Some("İkinci"));
    }

    #[test]
    fn empty_modules_is_a_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = layout(dir.path());
        for raw in [json!({"meta": {"title": "x"}}), json!({"modules": {}})] {
            let outcome =
                persist(&ModuleRecord::new(raw), "x.txt", &layout, &EntryDefaults::default())
                    .unwrap();
            assert_eq!(outcome, PersistOutcome::NoModules);
        }
        assert!(!layout.output_dir.join("x.json").exists());
        assert!(!layout.index_path.exists());
    }

    #[test]
    fn corrupt_catalog_is_replaced_and_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = layout(dir.path());
        std::fs::write(&layout.index_path, "{ definitely not json").unwrap();

        let outcome = persist(&record("T"), "a.txt", &layout, &EntryDefaults::default()).unwrap();
        assert!(matches!(outcome, PersistOutcome::Persisted { catalog_reset: true, .. }));

        let catalog = LibraryCatalog::open(&layout.index_path).unwrap();
        assert!(!catalog.was_reset());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.list()[0].url, "modules/a.json");
    }

    #[test]
    fn missing_output_dir_is_write_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = ArtifactLayout {
            output_dir: dir.path().join("absent"),
            url_prefix: "absent".into(),
            index_path: dir.path().join("kutuphane.json"),
        };
        let err = persist(&record("T"), "a.txt", &layout, &EntryDefaults::default()).unwrap_err();
        assert!(matches!(err, LibraryError::ArtifactWrite { .. }));
        assert!(!layout.index_path.exists());
    }
}
