//! Interpretation of model replies as slide content.
//!
//! The model is asked for "Title + 3-5 bullet points" but that format is
//! advisory. Whatever comes back is accepted: the first line is the title
//! and every following line is a bullet, however many there are.

use crate::types::{ModelReply, SlideRecord};

/// Parse one reply into exactly one slide.
///
/// A failure marker becomes a slide titled with the failure reason, so a
/// failed chunk stays visible in the deck.
pub fn parse_reply(reply: &ModelReply) -> SlideRecord {
    match reply {
        ModelReply::Failure(reason) => SlideRecord::new(reason.as_str()),
        ModelReply::Success(text) => parse_slide_text(text),
    }
}

/// Split reply text into a title line and bullet lines.
///
/// Blank lines after the title are kept as (empty) bullets.
pub fn parse_slide_text(text: &str) -> SlideRecord {
    let trimmed = text.trim();
    let mut lines = trimmed.lines().map(str::trim);

    let Some(title) = lines.next() else {
        return SlideRecord::new(trimmed);
    };

    SlideRecord {
        title: title.to_string(),
        bullets: lines.map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_bullets() {
        let slide = parse_reply(&ModelReply::Success("Title\nA\nB\nC".into()));
        assert_eq!(slide.title, "Title");
        assert_eq!(slide.bullets, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_failure_becomes_title() {
        let slide = parse_reply(&ModelReply::Failure("Error: timed out".into()));
        assert_eq!(slide.title, "Error: timed out");
        assert!(slide.bullets.is_empty());
    }

    #[test]
    fn test_empty_reply() {
        let slide = parse_reply(&ModelReply::Success(String::new()));
        assert_eq!(slide, SlideRecord::new(""));

        let slide = parse_reply(&ModelReply::Success("  \n \n".into()));
        assert_eq!(slide, SlideRecord::new(""));
    }

    #[test]
    fn test_lines_are_trimmed() {
        let slide = parse_slide_text("  Overview  \n   - first point\t\n\tsecond ");
        assert_eq!(slide.title, "Overview");
        assert_eq!(slide.bullets, vec!["- first point", "second"]);
    }

    #[test]
    fn test_blank_lines_kept_as_bullets() {
        let slide = parse_slide_text("Title\n\nA\n\nB");
        assert_eq!(slide.bullets, vec!["", "A", "", "B"]);
    }

    #[test]
    fn test_leading_blank_lines_skipped_for_title() {
        let slide = parse_slide_text("\n\n  Title\nA");
        assert_eq!(slide.title, "Title");
        assert_eq!(slide.bullets, vec!["A"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let slide = parse_slide_text("Title\r\nA\r\nB");
        assert_eq!(slide.title, "Title");
        assert_eq!(slide.bullets, vec!["A", "B"]);
    }

    #[test]
    fn test_bullet_count_not_enforced() {
        let text = format!("Title\n{}", vec!["x"; 12].join("\n"));
        assert_eq!(parse_slide_text(&text).bullets.len(), 12);
        assert!(parse_slide_text("Only a title").bullets.is_empty());
    }
}
