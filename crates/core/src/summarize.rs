//! The seam between the pipeline and a generative text service.

use crate::types::ModelReply;

/// Text returned in place of an absent `message.content` field.
pub const NO_CONTENT_PLACEHOLDER: &str = "The model returned no content.";

/// Build the instruction sent to the model for one chunk.
pub fn slide_prompt(chunk: &str) -> String {
    format!(
        "Summarize this for a slide:\n\n{}\n\nFormat: Title + 3-5 bullet points.",
        chunk
    )
}

/// Something that turns one chunk of text into a model reply.
///
/// Implementations must not panic or block forever: every error, including
/// a timeout, is reported as [`ModelReply::Failure`].
pub trait Summarizer: Sync {
    /// Summarize a single chunk.
    fn summarize(&self, chunk: &str) -> ModelReply;
}

impl<F> Summarizer for F
where
    F: Fn(&str) -> ModelReply + Sync,
{
    fn summarize(&self, chunk: &str) -> ModelReply {
        self(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_chunk() {
        let prompt = slide_prompt("Quarterly revenue rose.");
        assert_eq!(
            prompt,
            "Summarize this for a slide:\n\nQuarterly revenue rose.\n\nFormat: Title + 3-5 bullet points."
        );
    }

    #[test]
    fn test_closure_summarizer() {
        let echo = |chunk: &str| ModelReply::Success(chunk.to_uppercase());
        assert_eq!(echo.summarize("abc"), ModelReply::Success("ABC".into()));
    }
}
