//! Text extraction and format detection.
//!
//! Each supported format (plain text, PDF, slide deck) implements
//! `ContentExtractor`. The `extractor_for()` factory returns the correct
//! extractor for a given format; `extract_file()` is the path-based entry
//! point the pipeline uses.

pub mod pdf;
pub mod pptx;

use std::path::Path;

use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::ContentFormat;

/// Trait for format-specific text extractors.
pub trait ContentExtractor {
    /// Extract plain text from raw file bytes.
    ///
    /// `origin` is only used in error messages.
    fn extract(&self, data: &[u8], origin: &str) -> LibraryResult<String>;

    /// The format this extractor handles.
    fn format(&self) -> ContentFormat;
}

/// Get the appropriate extractor for a content format.
pub fn extractor_for(format: ContentFormat) -> Box<dyn ContentExtractor> {
    match format {
        ContentFormat::PlainText => Box::new(PlainTextExtractor),
        ContentFormat::Pdf => Box::new(pdf::PdfExtractor),
        ContentFormat::SlideDeck => Box::new(pptx::PptxExtractor),
    }
}

/// Detect the content format from a file extension (case-insensitive).
pub fn detect_format(path: &Path) -> Option<ContentFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" => Some(ContentFormat::PlainText),
        "pdf" => Some(ContentFormat::Pdf),
        "pptx" => Some(ContentFormat::SlideDeck),
        _ => None,
    }
}

/// Read a file and extract its text, detecting the format from the extension.
pub fn extract_file(path: &Path) -> LibraryResult<String> {
    let format = detect_format(path).ok_or_else(|| LibraryError::UnsupportedFormat {
        path: path.display().to_string(),
    })?;
    extract_file_as(path, format)
}

/// Read a file and extract its text with an explicit format.
pub fn extract_file_as(path: &Path, format: ContentFormat) -> LibraryResult<String> {
    let origin = path.display().to_string();
    let data = std::fs::read(path).map_err(|e| LibraryError::Read {
        path: origin.clone(),
        source: e,
    })?;
    extractor_for(format).extract(&data, &origin)
}

/// Plain-text extractor: the whole file, which must be valid UTF-8.
struct PlainTextExtractor;

impl ContentExtractor for PlainTextExtractor {
    fn format(&self) -> ContentFormat {
        ContentFormat::PlainText
    }

    fn extract(&self, data: &[u8], origin: &str) -> LibraryResult<String> {
        String::from_utf8(data.to_vec()).map_err(|e| LibraryError::ParseError {
            format: self.format().to_string(),
            path: origin.into(),
            message: e.to_string(),
        })
    }
}
