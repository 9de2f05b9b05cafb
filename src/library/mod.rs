//! Module library: text extraction from raw documents, module artifacts, and
//! the shared library index.
//!
//! Raw documents (txt, pdf, pptx) are reduced to plain text by the parsers.
//! Structured records coming back from the transformer are written to one
//! artifact per source file and summarized in an ordered index keyed by
//! artifact url.

pub mod catalog;
pub mod error;
pub mod model;
pub mod parser;
pub mod writer;

pub use catalog::{LibraryCatalog, Upsert};
pub use error::{LibraryError, LibraryResult};
pub use model::{CatalogEntry, ContentFormat, ModuleRecord};
pub use writer::{ArtifactLayout, EntryDefaults, PersistOutcome, persist};
