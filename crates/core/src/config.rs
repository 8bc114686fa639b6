//! Explicit run configuration.
//!
//! Everything the pipeline and the summarization client need is passed in
//! at construction time through these structures.

use crate::chunk::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the local Ollama service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// What to do when the service answers successfully but without content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingContentPolicy {
    /// Treat as success with a placeholder text.
    #[default]
    Placeholder,
    /// Treat as a failure marker.
    Failure,
}

/// Settings for the summarization client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Base URL of the chat service (without `/api/chat`).
    pub endpoint: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Upper bound on a single request, connect to last byte.
    pub timeout: Duration,

    /// Handling of replies without a `message.content` field.
    pub missing_content: MissingContentPolicy,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            missing_content: MissingContentPolicy::default(),
        }
    }
}

impl SummarizerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the missing-content policy.
    pub fn with_missing_content(mut self, policy: MissingContentPolicy) -> Self {
        self.missing_content = policy;
        self
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.endpoint.trim_end_matches('/'))
    }
}

/// Settings for one document run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,

    /// Number of chunks summarized at once. 1 means strictly sequential.
    pub concurrency: usize,

    /// Settings handed to the summarization client.
    pub summarizer: SummarizerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: 1,
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of concurrent summarization requests.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1); // At least one worker
        self
    }

    /// Set the summarization client settings.
    pub fn with_summarizer(mut self, summarizer: SummarizerConfig) -> Self {
        self.summarizer = summarizer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.summarizer.model, "llama3");
        assert_eq!(config.summarizer.timeout, Duration::from_secs(60));
        assert_eq!(
            config.summarizer.missing_content,
            MissingContentPolicy::Placeholder
        );
    }

    #[test]
    fn test_chat_url() {
        let config = SummarizerConfig::new();
        assert_eq!(config.chat_url(), "http://localhost:11434/api/chat");

        let config = config.with_endpoint("http://10.0.0.2:8080/");
        assert_eq!(config.chat_url(), "http://10.0.0.2:8080/api/chat");
    }

    #[test]
    fn test_concurrency_floor() {
        assert_eq!(PipelineConfig::new().with_concurrency(0).concurrency, 1);
        assert_eq!(PipelineConfig::new().with_concurrency(4).concurrency, 4);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = PipelineConfig::new()
            .with_chunk_size(800)
            .with_summarizer(SummarizerConfig::new().with_missing_content(MissingContentPolicy::Failure));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"missing_content\":\"failure\""));
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
