//! Top-level diagnostic error type.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives; `FactoryError` wraps them transparently so error codes and help
//! text survive up to the binary.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::library::error::LibraryError;
use crate::transform::TransformError;

/// Top-level error type for the module factory.
#[derive(Debug, Error, Diagnostic)]
pub enum FactoryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transform(#[from] TransformError),
}

/// Convenience alias for factory results.
pub type FactoryResult<T> = std::result::Result<T, FactoryError>;
