//! CLI tool for turning documents into slide decks with a local LLM.

mod extract;

use anyhow::{Context, Result};
use autodeck_core::assemble::DEFAULT_OUTPUT_FILENAME;
use autodeck_core::chunk::DEFAULT_CHUNK_SIZE;
use autodeck_core::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use autodeck_core::{
    FileSink, MissingContentPolicy, Pipeline, PipelineConfig, RunOutcome, RunState,
    SummarizerConfig,
};
use autodeck_ollama::OllamaClient;
use autodeck_pptx::{PptxReader, PptxWriter, BULLET_GLYPH};
use clap::{Args, Parser, Subcommand};
use extract::Source;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Generate presentation slides from a document with a local LLM.
#[derive(Parser, Debug)]
#[command(name = "autodeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a document into a .pptx deck
    Generate(GenerateArgs),

    /// Print the titles and bullets of a .pptx deck
    Outline {
        /// Presentation to read
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Input document (.pdf or plain text); "-" reads stdin
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Use this text instead of reading a file
    #[arg(long)]
    text: Option<String>,

    /// Output presentation path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Model identifier
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the Ollama service
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-chunk request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Maximum chunk length in characters
    #[arg(short = 'c', long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Number of chunks summarized at once
    #[arg(short = 'j', long, default_value_t = 1)]
    concurrency: usize,

    /// Treat replies without content as failures instead of using a placeholder
    #[arg(long)]
    strict_content: bool,

    /// Print the deck as JSON instead of writing a presentation
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Command::Generate(args) => generate(args, cli.verbose),
        Command::Outline { input } => outline(input),
    }
}

/// Convert one document into a deck.
fn generate(args: &GenerateArgs, verbose: bool) -> Result<()> {
    let source = match (&args.text, &args.input) {
        (Some(text), _) => Source::Inline(text),
        (None, Some(path)) if path.as_os_str() == "-" => Source::Stdin,
        (None, Some(path)) => Source::File(path),
        (None, None) => anyhow::bail!("No input given"),
    };
    if verbose {
        eprintln!("Reading: {:?}", source);
    }
    let text = extract::read_source(&source).context("Failed to read input")?;

    let config = build_config(args);
    let client = OllamaClient::new(&config.summarizer)?;
    log::debug!("Using model {} at {}", client.model(), client.url());

    let mut pipeline = Pipeline::new(config, client)?;
    if let Some(title) = deck_title(&source) {
        pipeline = pipeline.with_deck_title(title);
    }
    if verbose {
        pipeline = pipeline.with_observer(|state| {
            if let RunState::Summarizing { .. } = state {
                eprintln!("  {}", state);
            }
        });
    }

    if args.json {
        match pipeline.build_deck(&text)? {
            Some(deck) => println!("{}", serde_json::to_string_pretty(&deck)?),
            None => eprintln!("Nothing to process: the input text is empty"),
        }
        return Ok(());
    }

    let sink = FileSink::new(&args.output);
    match pipeline
        .run(&text, &PptxWriter::new(), &sink)
        .with_context(|| format!("Failed to generate {}", args.output.display()))?
    {
        RunOutcome::NothingToProcess => {
            eprintln!("Nothing to process: the input text is empty");
        }
        RunOutcome::Completed { artifact, slides } => {
            if verbose {
                eprintln!("Written {} slides", slides);
            }
            println!("{}", artifact);
        }
    }

    Ok(())
}

fn build_config(args: &GenerateArgs) -> PipelineConfig {
    let missing_content = if args.strict_content {
        MissingContentPolicy::Failure
    } else {
        MissingContentPolicy::Placeholder
    };

    PipelineConfig::new()
        .with_chunk_size(args.chunk_size)
        .with_concurrency(args.concurrency)
        .with_summarizer(
            SummarizerConfig::new()
                .with_endpoint(&args.endpoint)
                .with_model(&args.model)
                .with_timeout(Duration::from_secs(args.timeout))
                .with_missing_content(missing_content),
        )
}

/// Deck title taken from the input file name.
fn deck_title(source: &Source<'_>) -> Option<String> {
    match source {
        Source::File(path) => path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Print the outline of an existing presentation.
fn outline(input: &Path) -> Result<()> {
    let file =
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let slides = PptxReader::new()
        .read_outline(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", input.display()))?;

    for (idx, slide) in slides.iter().enumerate() {
        println!("Slide {}: {}", idx + 1, slide.title);
        for bullet in &slide.bullets {
            println!("  {} {}", BULLET_GLYPH, bullet);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_generate_defaults() {
        let cli = parse(&["autodeck", "generate", "report.pdf"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };

        assert_eq!(args.input, Some(PathBuf::from("report.pdf")));
        assert_eq!(args.output, PathBuf::from("autodeck_output.pptx"));

        let config = build_config(&args);
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_generate_overrides() {
        let cli = parse(&[
            "autodeck",
            "generate",
            "--text",
            "hello",
            "-m",
            "mistral",
            "--endpoint",
            "http://gpu-box:11434",
            "--timeout",
            "5",
            "-c",
            "800",
            "-j",
            "3",
            "--strict-content",
            "-v",
        ]);
        assert!(cli.verbose);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };

        let config = build_config(&args);
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.summarizer.model, "mistral");
        assert_eq!(config.summarizer.chat_url(), "http://gpu-box:11434/api/chat");
        assert_eq!(config.summarizer.timeout, Duration::from_secs(5));
        assert_eq!(config.summarizer.missing_content, MissingContentPolicy::Failure);
    }

    #[test]
    fn test_input_and_text_conflict() {
        assert!(Cli::try_parse_from(["autodeck", "generate", "a.txt", "--text", "x"]).is_err());
        assert!(Cli::try_parse_from(["autodeck", "generate"]).is_err());
    }

    #[test]
    fn test_deck_title_from_file_stem() {
        let path = PathBuf::from("/tmp/Annual Report.pdf");
        assert_eq!(deck_title(&Source::File(&path)).as_deref(), Some("Annual Report"));
        assert_eq!(deck_title(&Source::Inline("text")), None);
        assert_eq!(deck_title(&Source::Stdin), None);
    }
}
