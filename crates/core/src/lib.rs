//! Core domain types, text chunking, reply parsing, and the pipeline that
//! turns document text into a slide deck.

pub mod assemble;
pub mod chunk;
pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod summarize;
pub mod types;

pub use assemble::{assemble, DeckRenderer, DeckSink, FileSink, MemorySink};
pub use chunk::TextChunker;
pub use config::{MissingContentPolicy, PipelineConfig, SummarizerConfig};
pub use error::{Error, Result};
pub use parse::parse_reply;
pub use pipeline::{CancelToken, Pipeline, RunOutcome, RunState};
pub use summarize::{slide_prompt, Summarizer};
pub use types::{Chunk, Deck, ModelReply, SlideRecord};
