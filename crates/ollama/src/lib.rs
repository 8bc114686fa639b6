//! Ollama chat backend for slide summarization.
//!
//! Sends each chunk to a locally hosted model over HTTP and hands the
//! reply back to the pipeline as a [`ModelReply`](autodeck_core::ModelReply).

pub mod client;

pub use client::OllamaClient;
