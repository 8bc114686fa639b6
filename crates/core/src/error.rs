//! Error types for deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a document into a slide deck.
///
/// Summarization failures are deliberately absent: they are absorbed into
/// [`ModelReply::Failure`](crate::ModelReply::Failure) and end up as slide
/// content instead of aborting a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read input or write output.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The requested chunk size is not a positive integer.
    #[error("Invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Failed to obtain text from the source document.
    #[error("Text extraction error: {0}")]
    ExtractionError(String),

    /// Failed to render or publish the output artifact.
    #[error("Assembly error: {0}")]
    AssemblyError(String),

    /// The HTTP client for the summarization service could not be built.
    #[error("HTTP client error: {0}")]
    HttpError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid or corrupted presentation file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// The caller cancelled the run before it finished.
    #[error("Run cancelled before completion")]
    Cancelled,
}
