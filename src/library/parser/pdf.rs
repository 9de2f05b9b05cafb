//! PDF extractor using the `pdf-extract` crate.
//!
//! Text is pulled page by page and each page's text is followed by a
//! newline. Any parse error discards the whole document.

use std::panic::{self, AssertUnwindSafe};

use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::ContentFormat;
use crate::library::parser::ContentExtractor;

/// PDF text extractor backed by `pdf-extract`.
pub struct PdfExtractor;

impl ContentExtractor for PdfExtractor {
    fn format(&self) -> ContentFormat {
        ContentFormat::Pdf
    }

    fn extract(&self, data: &[u8], origin: &str) -> LibraryResult<String> {
        let parse_error = |message: String| LibraryError::ParseError {
            format: "pdf".into(),
            path: origin.into(),
            message,
        };

        // pdf-extract panics on some malformed inputs instead of returning Err.
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }))
        .map_err(|payload| parse_error(panic_message(payload.as_ref())))?
        .map_err(|e| parse_error(e.to_string()))?;

        Ok(join_pages(&pages))
    }
}

/// Concatenate page texts, each followed by a newline.
fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("parser panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("parser panicked: {s}")
    } else {
        "parser panicked".into()
    }
}
