//! PPTX (Office Open XML) backend for generated slide decks.
//!
//! Writes decks as .pptx packages (ZIP archives of XML parts) and reads
//! their outlines back.

pub mod reader;
pub mod template;
pub mod writer;

pub use reader::PptxReader;
pub use writer::{PptxWriter, BULLET_GLYPH};
