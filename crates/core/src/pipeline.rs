//! Chunk-to-slide pipeline for one document.
//!
//! ```text
//! Idle -> Chunking -> Summarizing(1..N) -> Assembling -> Done
//!                                                     \-> Failed
//! ```
//!
//! Per-chunk summarization failures never fail the run; they become slide
//! content. Only artifact assembly (or cancellation) can fail it.

use crate::assemble::{assemble, DeckRenderer, DeckSink};
use crate::chunk::TextChunker;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::parse::parse_reply;
use crate::summarize::Summarizer;
use crate::types::{Chunk, Deck, ModelReply};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Progress of a document run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has started yet.
    Idle,
    /// Splitting the input text.
    Chunking,
    /// Waiting on the model for chunk `index` (0-based) of `total`.
    Summarizing { index: usize, total: usize },
    /// Rendering and publishing the deck.
    Assembling,
    /// The artifact was published, or there was nothing to process.
    Done,
    /// Assembly failed or the run was cancelled.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Chunking => write!(f, "chunking text"),
            Self::Summarizing { index, total } => {
                write!(f, "processing chunk {}/{}", index + 1, total)
            }
            Self::Assembling => write!(f, "assembling deck"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The input was empty or whitespace-only. No artifact was written.
    NothingToProcess,
    /// The deck was written.
    Completed {
        /// Identifier returned by the sink.
        artifact: String,
        /// Number of slides in the artifact.
        slides: usize,
    },
}

/// Cooperative cancellation flag shared between a caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Chunks not yet dispatched are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Observer = Box<dyn Fn(&RunState) + Send + Sync>;

/// Drives chunking, summarization, parsing and assembly for one document.
pub struct Pipeline<S> {
    chunker: TextChunker,
    concurrency: usize,
    summarizer: S,
    deck_title: Option<String>,
    cancel: CancelToken,
    observer: Option<Observer>,
    state: Mutex<RunState>,
}

impl<S: Summarizer> Pipeline<S> {
    /// Create a pipeline. Fails if the configured chunk size is zero.
    pub fn new(config: PipelineConfig, summarizer: S) -> Result<Self> {
        Ok(Self {
            chunker: TextChunker::new(config.chunk_size)?,
            concurrency: config.concurrency.max(1),
            summarizer,
            deck_title: None,
            cancel: CancelToken::new(),
            observer: None,
            state: Mutex::new(RunState::Idle),
        })
    }

    /// Title stored in the generated deck.
    pub fn with_deck_title(mut self, title: impl Into<String>) -> Self {
        self.deck_title = Some(title.into());
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Receive every state transition.
    pub fn with_observer(mut self, observer: impl Fn(&RunState) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Handle that cancels this pipeline's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Most recent state.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run the whole conversion and publish the deck.
    pub fn run(
        &self,
        text: &str,
        renderer: &dyn DeckRenderer,
        sink: &dyn DeckSink,
    ) -> Result<RunOutcome> {
        let deck = match self.build_deck(text) {
            Ok(Some(deck)) => deck,
            Ok(None) => return Ok(RunOutcome::NothingToProcess),
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(e);
            }
        };

        self.transition(RunState::Assembling);
        match assemble(&deck, renderer, sink) {
            Ok(artifact) => {
                self.transition(RunState::Done);
                Ok(RunOutcome::Completed {
                    artifact,
                    slides: deck.len(),
                })
            }
            Err(e) => {
                log::error!("Deck assembly failed: {}", e);
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    /// Produce the deck for `text` without publishing it.
    ///
    /// Returns `Ok(None)` for empty or whitespace-only input, without
    /// contacting the summarizer.
    pub fn build_deck(&self, text: &str) -> Result<Option<Deck>> {
        if text.trim().is_empty() {
            log::info!("Input text is empty; nothing to process");
            self.transition(RunState::Done);
            return Ok(None);
        }

        self.transition(RunState::Chunking);
        let chunks = self.chunker.chunk(text);
        log::info!(
            "Split {} characters into {} chunks of at most {}",
            text.chars().count(),
            chunks.len(),
            self.chunker.max_chars()
        );

        let replies = if self.concurrency > 1 && chunks.len() > 1 {
            self.summarize_concurrent(&chunks)?
        } else {
            self.summarize_sequential(&chunks)?
        };

        let mut deck = Deck::new();
        if let Some(title) = &self.deck_title {
            deck.title = Some(title.clone());
        }
        for reply in &replies {
            deck.add_slide(parse_reply(reply));
        }

        Ok(Some(deck))
    }

    fn summarize_sequential(&self, chunks: &[Chunk]) -> Result<Vec<ModelReply>> {
        let mut replies = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            replies.push(self.summarize_one(chunk, chunks.len()));
        }
        Ok(replies)
    }

    /// Summarize with a bounded worker pool. Replies land in a slot per
    /// chunk index, so completion order never affects slide order.
    fn summarize_concurrent(&self, chunks: &[Chunk]) -> Result<Vec<ModelReply>> {
        let workers = self.concurrency.min(chunks.len());
        let next = AtomicUsize::new(0);
        let slots: Vec<Mutex<Option<ModelReply>>> =
            chunks.iter().map(|_| Mutex::new(None)).collect();

        log::debug!("Summarizing {} chunks with {} workers", chunks.len(), workers);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(chunk) = chunks.get(index) else {
                        break;
                    };
                    let reply = self.summarize_one(chunk, chunks.len());
                    *slots[index]
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(reply);
                });
            }
        });

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        Ok(slots
            .into_iter()
            .map(|slot| {
                slot.into_inner()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .unwrap_or_else(|| ModelReply::failure("chunk was not summarized"))
            })
            .collect())
    }

    fn summarize_one(&self, chunk: &Chunk, total: usize) -> ModelReply {
        self.transition(RunState::Summarizing {
            index: chunk.index,
            total,
        });

        let reply = self.summarizer.summarize(&chunk.text);
        match &reply {
            ModelReply::Success(text) => {
                log::debug!("Chunk {} summarized ({} bytes)", chunk.index + 1, text.len())
            }
            ModelReply::Failure(reason) => {
                log::warn!("Chunk {} failed: {}", chunk.index + 1, reason)
            }
        }
        reply
    }

    fn transition(&self, next: RunState) {
        log::info!("{}", next);
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
        if let Some(observer) = &self.observer {
            observer(&next);
        }
    }
}
