//! Input text extraction.

use autodeck_core::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Where the document text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<'a> {
    /// Text given directly on the command line.
    Inline(&'a str),
    /// Standard input.
    Stdin,
    /// A PDF or plain-text file.
    File(&'a Path),
}

/// Read the document text from `source`.
pub fn read_source(source: &Source<'_>) -> Result<String> {
    match source {
        Source::Inline(text) => Ok(text.to_string()),
        Source::Stdin => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| Error::ExtractionError(format!("Failed to read stdin: {}", e)))?;
            Ok(text)
        }
        Source::File(path) if is_pdf(path) => extract_pdf_text(path),
        Source::File(path) => std::fs::read_to_string(path)
            .map_err(|e| Error::ExtractionError(format!("Failed to read {}: {}", path.display(), e))),
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Concatenate the text of every page in page order, with no separator.
///
/// Pages whose text cannot be extracted contribute nothing.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let document = lopdf::Document::load(path)
        .map_err(|e| Error::ExtractionError(format!("Failed to open PDF {}: {}", path.display(), e)))?;

    let mut text = String::new();
    for page in document.get_pages().keys() {
        match document.extract_text(&[*page]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => log::warn!("No text extracted from page {}: {}", page, e),
        }
    }

    log::debug!("Extracted {} characters from {}", text.chars().count(), path.display());
    Ok(text)
}
