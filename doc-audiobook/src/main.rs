//! doc-audio - Convert PDF, text and HTML documents into narrated audiobooks

mod audio;
mod config;
mod pipeline;
mod session;
mod source;
mod text;

use anyhow::{Context, Result};
use audio::{Mp3Decoder, Mp3Encoder, OutputFormat, create_encoder};
use clap::{Parser, Subcommand};
use config::DocAudioConfig;
use env_logger::Env;
use pipeline::{FailurePolicy, Pipeline, PipelineOptions};
use session::GenerationSession;
use source::{FIRST_LETTER_YEAR, HttpFetcher, LAST_LETTER_YEAR, SourceCollector, SourceRequest};
use std::path::PathBuf;
use std::time::Duration;
use text::word_count;
use tts_client::{Accent, BackendKind};

/// Characters of extracted text shown by --show-text.
const PREVIEW_CHARS: usize = 5000;

#[derive(Parser, Debug)]
#[command(name = "doc-audio")]
#[command(about = "Convert PDF, text and HTML documents into narrated audiobooks")]
#[command(long_about = None)]
#[command(version)]
struct Args {
    /// Narrator accent (american, british, australian, indian, south-african)
    #[arg(long, global = true)]
    accent: Option<Accent>,

    /// Directory to write the audiobook to (default: current directory)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Maximum characters per synthesized chunk (default 3000)
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Output format: mp3 or wav
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Print the first part of the extracted text before converting
    #[arg(long, global = true, default_value_t = false)]
    show_text: bool,

    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Narrate Berkshire Hathaway shareholder letters for a range of years
    Letters {
        /// First year (1977-2024)
        #[arg(long, value_parser = parse_year)]
        start: u16,
        /// Last year, inclusive (1977-2024)
        #[arg(long, value_parser = parse_year)]
        end: u16,
    },
    /// Narrate a local PDF or text file
    File {
        /// Path to the document
        path: PathBuf,
    },
    /// Narrate a web page or PDF link
    Url {
        /// Address of the document
        url: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default accent
    SetAccent {
        /// american, british, australian, indian or south-african
        accent: Accent,
    },
    /// Set default output directory
    SetOutputDir {
        path: PathBuf,
    },
    /// Set default chunk size
    SetChunkSize {
        /// Characters per chunk
        size: usize,
    },
    /// Set what happens when a chunk cannot be synthesized
    SetOnError {
        /// abort or skip
        policy: FailurePolicy,
    },
}

fn parse_year(s: &str) -> Result<u16, String> {
    let year: u16 = s.parse().map_err(|_| format!("'{}' is not a year", s))?;
    if !(FIRST_LETTER_YEAR..=LAST_LETTER_YEAR).contains(&year) {
        return Err(format!(
            "year must be between {} and {}",
            FIRST_LETTER_YEAR, LAST_LETTER_YEAR
        ));
    }
    Ok(year)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let request = match &args.command {
        Commands::Config { action } => return handle_config_command(action),
        Commands::Letters { start, end } => {
            if start > end {
                anyhow::bail!("Start year must be before or equal to end year");
            }
            SourceRequest::Letters {
                start: *start,
                end: *end,
            }
        }
        Commands::File { path } => SourceRequest::File { path: path.clone() },
        Commands::Url { url } => SourceRequest::Url { url: url.clone() },
    };

    // Command-line flags override the config file
    let mut config = DocAudioConfig::load().context("Failed to load configuration")?;
    if let Some(accent) = args.accent {
        config.accent = accent;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(size) = args.chunk_size {
        config.chunk_size = size;
    }
    if let Some(format) = args.format {
        config.format = format;
    }

    if args.debug {
        eprintln!("Source: {:?}", request);
        eprintln!("Accent: {}", config.accent);
        eprintln!("Chunk size: {}", config.chunk_size);
        eprintln!("Output dir: {}", config.output_dir().display());
    }

    run(&config, &request, args.show_text).await
}

/// Collect, narrate and deliver one audiobook.
async fn run(config: &DocAudioConfig, request: &SourceRequest, show_text: bool) -> Result<()> {
    // Fail before any network work if the encoder cannot run
    if config.format == OutputFormat::Mp3 {
        let encoder = Mp3Encoder::new(config.ffmpeg_path.clone());
        if !encoder.is_available() {
            anyhow::bail!(
                "FFmpeg is required for MP3 output but was not found.\n\
                 Install FFmpeg, set ffmpeg_path in {}, or use --format wav",
                DocAudioConfig::config_path()?.display()
            );
        }
    }

    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let collector =
        SourceCollector::new(&fetcher).with_index_url(config.letters_index_url.clone());

    eprintln!("Collecting documents...");
    let text = collector
        .collect_text(request)
        .await
        .context("Failed to collect documents")?;

    eprintln!("Extracted text: ~{} words", word_count(&text));

    if show_text {
        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
        eprintln!("\n{}\n", preview);
        if text.chars().count() > PREVIEW_CHARS {
            eprintln!("[...]\n");
        }
    }

    let backend = tts_client::get_backend(BackendKind::GoogleTranslate, None)
        .context("Failed to create speech backend")?;
    let encoder = create_encoder(config.format, config.ffmpeg_path.as_deref());

    let pipeline = Pipeline::new(
        backend,
        Box::new(Mp3Decoder),
        encoder,
        PipelineOptions {
            accent: config.accent,
            chunk_size: config.chunk_size,
            retry: config.retry_policy(),
            on_error: config.on_error,
            show_progress: true,
        },
    );

    let filename = request.suggested_filename(pipeline.extension());
    eprintln!("Converting to speech ({} accent)...", config.accent);
    let audiobook = pipeline.generate(&text, &filename).await?;

    let duration = audiobook.duration;
    let (total, skipped) = (audiobook.chunks_total, audiobook.chunks_skipped);
    let size_mb = audiobook.size_mb();

    let mut session = GenerationSession::new();
    session.store(audiobook);
    let output_path = session.deliver(&config.output_dir())?;

    eprintln!(
        "Output: {} ({:.1} MB, {})",
        output_path.display(),
        size_mb,
        format_duration(duration)
    );
    if skipped > 0 {
        eprintln!(
            "Warning: {} of {} chunks could not be narrated and were left out",
            skipped, total
        );
    }

    Ok(())
}

/// Format a duration as h:mm:ss or m:ss.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Handle config subcommands.
fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = DocAudioConfig::load()?;
            println!("Configuration file: {:?}", DocAudioConfig::config_path()?);
            println!();
            println!("accent = \"{}\"", config.accent.id());
            println!("chunk_size = {}", config.chunk_size);
            match &config.output_dir {
                Some(dir) => println!("output_dir = \"{}\"", dir.display()),
                None => println!("output_dir = (current directory)"),
            }
            println!("format = {:?}", config.format);
            println!("on_error = {:?}", config.on_error);
            println!("max_attempts = {}", config.max_attempts);
            println!("initial_backoff_secs = {}", config.initial_backoff_secs);
            match &config.ffmpeg_path {
                Some(path) => println!("ffmpeg_path = \"{}\"", path.display()),
                None => println!("ffmpeg_path = (ffmpeg on PATH)"),
            }
        }
        ConfigAction::SetAccent { accent } => {
            let mut config = DocAudioConfig::load()?;
            config.accent = *accent;
            config.save()?;
            println!("Default accent set to: {}", accent);
        }
        ConfigAction::SetOutputDir { path } => {
            let mut config = DocAudioConfig::load()?;
            config.output_dir = Some(path.clone());
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
        ConfigAction::SetChunkSize { size } => {
            let mut config = DocAudioConfig::load()?;
            config.chunk_size = (*size).max(1);
            config.save()?;
            println!("Default chunk size set to: {}", config.chunk_size);
        }
        ConfigAction::SetOnError { policy } => {
            let mut config = DocAudioConfig::load()?;
            config.on_error = *policy;
            config.save()?;
            println!("Chunk failures will now: {:?}", policy);
        }
    }
    Ok(())
}
