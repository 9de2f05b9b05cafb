//! Rich diagnostic error types for the module library.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from extraction, artifact writing, and catalog persistence.
#[derive(Debug, Error, Diagnostic)]
pub enum LibraryError {
    #[error("unsupported content format: \"{path}\"")]
    #[diagnostic(
        code(raven::library::unsupported_format),
        help("Supported formats are: .txt (UTF-8), .pdf and .pptx.")
    )]
    UnsupportedFormat { path: String },

    #[error("cannot read \"{path}\"")]
    #[diagnostic(
        code(raven::library::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {format} document \"{path}\": {message}")]
    #[diagnostic(
        code(raven::library::parse_error),
        help(
            "The document could not be parsed. Verify the file is valid {format} \
             and not corrupted. Plain text files must be UTF-8."
        )
    )]
    ParseError {
        format: String,
        path: String,
        message: String,
    },

    #[error("failed to write module artifact \"{path}\"")]
    #[diagnostic(
        code(raven::library::artifact_write),
        help("Check that the output directory exists and has correct permissions.")
    )]
    ArtifactWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog I/O error: {message}")]
    #[diagnostic(
        code(raven::library::catalog_io),
        help(
            "Failed to read or write the library index. Check that its directory \
             exists and has correct permissions."
        )
    )]
    CatalogIo { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(code(raven::library::serialize))]
    Serialize { message: String },
}

/// Convenience alias for library operation results.
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
