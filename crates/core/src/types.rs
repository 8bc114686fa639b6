//! Domain types for chunked documents and generated decks.

use serde::{Deserialize, Serialize};

/// Longest failure reason kept, in characters. It becomes a slide title.
pub const MAX_FAILURE_REASON_CHARS: usize = 200;

/// A bounded-length contiguous segment of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position of this chunk in the document.
    pub index: usize,

    /// The chunk text.
    pub text: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length of this chunk in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Outcome of one summarization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelReply {
    /// Raw text returned by the generative service.
    Success(String),
    /// Human-readable reason the request failed.
    Failure(String),
}

impl ModelReply {
    /// Build a failure marker from anything displayable.
    ///
    /// The reason is folded onto one line and truncated to
    /// [`MAX_FAILURE_REASON_CHARS`], so raw service output such as an HTML
    /// error page still yields a one-line title.
    pub fn failure(reason: impl std::fmt::Display) -> Self {
        let reason = reason.to_string();
        let mut line = reason.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some((cut, _)) = line.char_indices().nth(MAX_FAILURE_REASON_CHARS) {
            line.truncate(cut);
            line.push_str("...");
        }
        Self::Failure(format!("Error: {}", line))
    }

    /// Whether this reply is a failure marker.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Structured title + bullets derived from one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Single-line slide title.
    pub title: String,

    /// Bullet lines in order. May be empty.
    pub bullets: Vec<String>,
}

impl SlideRecord {
    /// Create a slide with a title and no bullets.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
        }
    }

    /// Add a bullet line.
    pub fn add_bullet(&mut self, text: impl Into<String>) {
        self.bullets.push(text.into());
    }

    /// Builder-style variant of [`add_bullet`](Self::add_bullet).
    pub fn with_bullet(mut self, text: impl Into<String>) -> Self {
        self.add_bullet(text);
        self
    }
}

/// The ordered collection of slides for one document run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Optional document title, stored in the artifact's properties.
    pub title: Option<String>,

    /// Slides in chunk order.
    pub slides: Vec<SlideRecord>,
}

impl Deck {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deck from slides that are already in order.
    pub fn from_slides(slides: Vec<SlideRecord>) -> Self {
        Self { title: None, slides }
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a slide to the end of the deck.
    pub fn add_slide(&mut self, slide: SlideRecord) {
        self.slides.push(slide);
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_prefix() {
        let reply = ModelReply::failure("connection refused");
        assert_eq!(reply, ModelReply::Failure("Error: connection refused".into()));
        assert!(reply.is_failure());
        assert!(!ModelReply::Success("ok".into()).is_failure());
    }

    #[test]
    fn test_failure_reason_is_one_line() {
        let reply = ModelReply::failure("<html>\n<head><title>502</title></head>\n\n  <body>nginx</body>\n</html>\n");
        assert_eq!(
            reply,
            ModelReply::Failure("Error: <html> <head><title>502</title></head> <body>nginx</body> </html>".into())
        );
    }

    #[test]
    fn test_failure_reason_is_truncated() {
        let ModelReply::Failure(reason) = ModelReply::failure("é".repeat(500)) else {
            panic!("expected failure");
        };
        assert_eq!(reason, format!("Error: {}...", "é".repeat(MAX_FAILURE_REASON_CHARS)));

        let exact = "x".repeat(MAX_FAILURE_REASON_CHARS);
        assert_eq!(ModelReply::failure(&exact), ModelReply::Failure(format!("Error: {}", exact)));
    }

    #[test]
    fn test_chunk_char_len_counts_characters() {
        let chunk = Chunk::new(0, "日本語");
        assert_eq!(chunk.char_len(), 3);
        assert_eq!(chunk.text.len(), 9);
    }

    #[test]
    fn test_deck_json_shape() {
        let deck = Deck::from_slides(vec![SlideRecord::new("Intro").with_bullet("One")])
            .with_title("Report");
        let json = serde_json::to_value(&deck).unwrap();
        assert_eq!(json["title"], "Report");
        assert_eq!(json["slides"][0]["title"], "Intro");
        assert_eq!(json["slides"][0]["bullets"][0], "One");
    }
}
