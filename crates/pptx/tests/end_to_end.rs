//! Document text to .pptx and back, with a scripted summarizer.

use autodeck_core::{
    CancelToken, Deck, Error, FileSink, MemorySink, ModelReply, Pipeline, PipelineConfig,
    RunOutcome, SlideRecord,
};
use autodeck_pptx::{PptxReader, PptxWriter};
use std::io::Cursor;
use std::time::Duration;

/// Title is the chunk number, bullets are the chunk's words.
fn scripted(chunk: &str) -> ModelReply {
    let words: Vec<&str> = chunk.split_whitespace().collect();
    ModelReply::Success(format!("Chunk of {} chars\n{}", chunk.chars().count(), words.join("\n")))
}

fn pipeline_with<F>(chunk_size: usize, summarize: F) -> Pipeline<F>
where
    F: Fn(&str) -> ModelReply + Sync,
{
    Pipeline::new(PipelineConfig::new().with_chunk_size(chunk_size), summarize).unwrap()
}

#[test]
fn test_slide_count_matches_chunks() {
    let text = "lorem ipsum dolor ".repeat(50); // 900 chars
    let sink = MemorySink::new("memory");

    let outcome = pipeline_with(100, scripted)
        .run(&text, &PptxWriter::new(), &sink)
        .unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            artifact: "memory".into(),
            slides: 9
        }
    );

    let bytes = sink.bytes().unwrap();
    let slides = PptxReader::new().read_outline(Cursor::new(bytes)).unwrap();
    assert_eq!(slides.len(), 9);
    assert!(slides.iter().all(|s| s.title == "Chunk of 100 chars"));
}

#[test]
fn test_outline_round_trip() {
    let deck = Deck::from_slides(vec![
        SlideRecord::new("Overview")
            .with_bullet("Sales grew 12%")
            .with_bullet("")
            .with_bullet("R&D <budget> doubled"),
        SlideRecord::new("Error: request timed out after 60s"),
        SlideRecord::new(""),
        SlideRecord::new("Already bulleted").with_bullet("\u{2022} keep my glyph"),
    ]);

    let bytes = autodeck_core::DeckRenderer::render(&PptxWriter::new(), &deck).unwrap();
    let slides = PptxReader::new().read_outline(Cursor::new(bytes)).unwrap();
    assert_eq!(slides, deck.slides);
}

#[test]
fn test_failed_chunk_visible_in_artifact() {
    let flaky = |chunk: &str| {
        if chunk.starts_with("bbbb") {
            ModelReply::failure("request timed out after 60s")
        } else {
            scripted(chunk)
        }
    };
    let text = format!("{}{}{}", "a".repeat(10), "b".repeat(10), "c".repeat(10));
    let sink = MemorySink::new("memory");

    pipeline_with(10, flaky)
        .run(&text, &PptxWriter::new(), &sink)
        .unwrap();

    let slides = PptxReader::new()
        .read_outline(Cursor::new(sink.bytes().unwrap()))
        .unwrap();
    assert_eq!(slides.len(), 3);
    assert_eq!(slides[1], SlideRecord::new("Error: request timed out after 60s"));
    assert_eq!(slides[0].bullets, vec!["a".repeat(10)]);
    assert_eq!(slides[2].bullets, vec!["c".repeat(10)]);
}

#[test]
fn test_file_artifact_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    let text = "Quarterly numbers. ".repeat(200);

    let outcome = pipeline_with(1500, scripted)
        .run(&text, &PptxWriter::new(), &FileSink::new(&path))
        .unwrap();

    let expected = text.chars().count().div_ceil(1500);
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            artifact: path.display().to_string(),
            slides: expected
        }
    );
    let file = std::fs::File::open(&path).unwrap();
    assert_eq!(PptxReader::new().slide_count(file).unwrap(), expected);
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");

    let outcome = pipeline_with(100, scripted)
        .run(" \n\t ", &PptxWriter::new(), &FileSink::new(&path))
        .unwrap();
    assert_eq!(outcome, RunOutcome::NothingToProcess);
    assert!(!path.exists());
}

#[test]
fn test_unwritable_destination_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("deck.pptx");

    let err = pipeline_with(100, scripted)
        .run("some text", &PptxWriter::new(), &FileSink::new(&path))
        .unwrap_err();
    assert!(matches!(err, Error::AssemblyError(_)));
    assert!(!path.exists());
}

#[test]
fn test_concurrent_run_keeps_order() {
    let text: String = (0..12).map(|i| format!("{:02}", i)).collect(); // 24 chars
    let slow_evens = |chunk: &str| {
        let n: u64 = chunk.parse().unwrap_or(0);
        if n % 2 == 0 {
            std::thread::sleep(Duration::from_millis(20));
        }
        ModelReply::Success(format!("Part {}", n))
    };
    let pipeline = Pipeline::new(
        PipelineConfig::new().with_chunk_size(2).with_concurrency(4),
        slow_evens,
    )
    .unwrap();
    let sink = MemorySink::new("memory");

    pipeline.run(&text, &PptxWriter::new(), &sink).unwrap();

    let titles: Vec<String> = PptxReader::new()
        .read_outline(Cursor::new(sink.bytes().unwrap()))
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    let expected: Vec<String> = (0..12).map(|i| format!("Part {}", i)).collect();
    assert_eq!(titles, expected);
}

#[test]
fn test_cancelled_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    let token = CancelToken::new();
    token.cancel();

    let err = pipeline_with(10, scripted)
        .with_cancel_token(token)
        .run(&"x".repeat(50), &PptxWriter::new(), &FileSink::new(&path))
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(!path.exists());
}
