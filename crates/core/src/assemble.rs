//! Deck serialization and artifact publishing.
//!
//! Rendering (deck to bytes) and publishing (bytes to storage) are separate
//! seams so the pipeline can be exercised without a file system.

use crate::error::{Error, Result};
use crate::types::Deck;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default file name of the generated presentation.
pub const DEFAULT_OUTPUT_FILENAME: &str = "autodeck_output.pptx";

/// Serializes a finished deck into a presentation file format.
pub trait DeckRenderer {
    /// Render every slide of `deck`, in order, into a single artifact.
    fn render(&self, deck: &Deck) -> Result<Vec<u8>>;
}

/// Stores a rendered artifact and names it.
pub trait DeckSink {
    /// Write `bytes` and return the artifact identifier (e.g. its path).
    fn publish(&self, bytes: &[u8]) -> Result<String>;
}

/// Render `deck` and publish it through `sink`.
///
/// Any failure is fatal and reported as [`Error::AssemblyError`].
pub fn assemble(deck: &Deck, renderer: &dyn DeckRenderer, sink: &dyn DeckSink) -> Result<String> {
    let bytes = renderer.render(deck).map_err(into_assembly)?;
    log::debug!("Rendered {} slides into {} bytes", deck.len(), bytes.len());

    let artifact = sink.publish(&bytes).map_err(into_assembly)?;
    log::info!("Published deck to {}", artifact);

    Ok(artifact)
}

fn into_assembly(error: Error) -> Error {
    match error {
        Error::AssemblyError(_) => error,
        other => Error::AssemblyError(other.to_string()),
    }
}

/// Sink that writes the artifact to a file on disk.
///
/// Bytes go to a temporary file next to the destination, which is renamed
/// into place only after everything was written. A failed write leaves no
/// file at `path`.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink that publishes to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_FILENAME)
    }
}

impl DeckSink for FileSink {
    fn publish(&self, bytes: &[u8]) -> Result<String> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".autodeck-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| {
            Error::AssemblyError(format!(
                "Failed to move output into place at {}: {}",
                self.path.display(),
                e.error
            ))
        })?;

        Ok(self.path.display().to_string())
    }
}

/// Sink that keeps the artifact in memory.
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemorySink {
    /// Create an empty in-memory sink reporting `name` as its identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: Mutex::new(None),
        }
    }

    /// The published bytes, if anything was published.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl DeckSink for MemorySink {
    fn publish(&self, bytes: &[u8]) -> Result<String> {
        let mut guard = self
            .bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(bytes.to_vec());
        Ok(self.name.clone())
    }
}
