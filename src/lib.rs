// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # raven-factory
//!
//! Converts raw lecture material (plain text, PDF, slide decks) into
//! structured learning-module records with a generative model, and keeps a
//! shared library index (`kutuphane.json`) of every module produced.
//!
//! ## Architecture
//!
//! - **Extraction** (`library::parser`): format-specific text extraction behind `ContentExtractor`
//! - **Transformation** (`transform`): the `Transformer` capability, backed by a blocking Gemini client
//! - **Catalog** (`library::catalog`, `library::writer`): per-module artifacts plus an ordered index upserted by url
//! - **Driver** (`pipeline`): strictly sequential extract → transform → persist per file
//!
//! ## Library usage
//!
//! ```no_run
//! use raven_factory::config::FactoryConfig;
//! use raven_factory::pipeline::Pipeline;
//! use raven_factory::transform::GeminiClient;
//!
//! let config = FactoryConfig::default();
//! let client = GeminiClient::new(config.model.clone()).unwrap();
//! let report = Pipeline::new(&config, &client).run().unwrap();
//! println!("{} modules written", report.ingested());
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod transform;
