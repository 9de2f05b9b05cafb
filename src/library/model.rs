//! Core data types for the module library.
//!
//! A raw document is reduced to plain text, handed to the transformer, and
//! comes back as a [`ModuleRecord`]: an opaque JSON document that is stored
//! verbatim. The catalog only ever sees the flat [`CatalogEntry`] projection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Supported source document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFormat {
    PlainText,
    Pdf,
    SlideDeck,
}

impl ContentFormat {
    /// Human-readable name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Pdf => "pdf",
            Self::SlideDeck => "pptx",
        }
    }
}

impl std::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured output of the transformer for one source document.
///
/// The model is asked for a fixed shape (`meta` + `modules`) but nothing
/// enforces it, so the record keeps the parsed JSON untouched and every
/// accessor tolerates missing or mistyped keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    raw: Value,
}

impl ModuleRecord {
    /// Wrap an already parsed JSON document.
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Parse a JSON document from text, trimming surrounding whitespace first.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text.trim()).map(Self::new)
    }

    /// The full document as produced by the model.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The `modules` object, if present and non-empty.
    pub fn modules(&self) -> Option<&Map<String, Value>> {
        self.raw
            .get("modules")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
    }

    /// The `meta` object, if present.
    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.raw.get("meta").and_then(Value::as_object)
    }

    /// A string-ish field of `modules`.
    pub fn module_field(&self, key: &str) -> Option<String> {
        self.modules().and_then(|m| string_field(m, key))
    }
}

/// Read a field as a string. Numbers are stringified (models sometimes emit
/// `"class": 3`); every other JSON type, explicit `null` included, counts as
/// absent, so a `"class": null` from the model falls back to the configured
/// default instead of being copied through as `null`.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Flat summary of a module record, one per artifact in the library index.
///
/// Keyed by `url`, not by `id`: two records that claim the same id but live
/// at different paths are two entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub block: String,
    pub url: String,
}

impl CatalogEntry {
    /// Lenient projection of a stored index entry.
    ///
    /// Index files may be written by other tools, so mistyped or missing
    /// fields read as absent (strings become empty) instead of failing.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let field = |key: &str| string_field(map, key);
        Self {
            id: field("id"),
            code: field("code").unwrap_or_default(),
            title: field("title"),
            author: field("author").unwrap_or_default(),
            tag: field("tag"),
            class: field("class").unwrap_or_default(),
            block: field("block").unwrap_or_default(),
            url: field("url").unwrap_or_default(),
        }
    }

    /// The entry as written to the index, in index field order.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "code": self.code,
            "title": self.title,
            "author": self.author,
            "tag": self.tag,
            "class": self.class,
            "block": self.block,
            "url": self.url,
        })
    }

    /// Title for display, falling back to the artifact path.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}
