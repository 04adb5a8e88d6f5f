use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use audiorag::asr::HttpAsr;
use audiorag::chunking::chunk_segments;
use audiorag::embed::{EmbedError, EmbeddingProvider, HttpEmbedder};
use audiorag::index::{HttpChromaIndex, VectorIndex};
use audiorag::pipeline::{self, QUERY_PREFIX};
use audiorag::transcript::TranscriptDocument;
use audiorag::{PipelineConfig, PipelineError};

#[derive(Parser)]
#[command(name = "audiorag", version, about = "Transcribe, chunk and index long-form audio")]
struct Cli {
    /// Configuration file (JSON); defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for transcript and manifest artifacts.
    #[arg(long, global = true, default_value = "out")]
    out: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: transcribe, chunk, embed and index.
    Run {
        audio: PathBuf,
        /// Title stored with every chunk; defaults to the audio file name.
        #[arg(long)]
        title: Option<String>,
        /// Group segments into semantic paragraphs before chunking.
        #[arg(long)]
        paragraphs: bool,
    },
    /// Transcribe only; writes the transcript JSON and stops.
    Transcribe {
        audio: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Chunk a previously saved transcript JSON and print the chunks.
    Chunk {
        transcript: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Embed a query and search the index.
    Query {
        text: String,
        #[arg(short = 'k', long, default_value_t = 5)]
        top: usize,
        /// Restrict hits to one recording.
        #[arg(long)]
        title: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply();

    if let Err(e) = result {
        eprintln!("failed to initialize logging: {e}");
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Command::Run {
            audio,
            title,
            paragraphs,
        } => {
            let mut config = config;
            if paragraphs {
                config.paragraphs.enabled = true;
            }
            let title = title.unwrap_or_else(|| file_title(&audio));

            let asr = HttpAsr::new(
                &config.asr.endpoint,
                &config.asr.model,
                config.asr.api_key.clone(),
            );
            let embedder = HttpEmbedder::new(
                &config.embedding.endpoint,
                &config.embedding.model,
                config.embedding.api_key.clone(),
            );
            let index = HttpChromaIndex::new(&config.index.base_url, &config.index.collection);

            let summary = pipeline::run_pipeline(
                &audio,
                &title,
                &config,
                &asr,
                &embedder,
                &index,
                index.collection(),
                &cli.out,
            )?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Transcribe { audio, title } => {
            let title = title.unwrap_or_else(|| file_title(&audio));
            let asr = HttpAsr::new(
                &config.asr.endpoint,
                &config.asr.model,
                config.asr.api_key.clone(),
            );
            let (transcript, path, parts) =
                pipeline::transcribe_recording(&audio, &title, &config, &asr, &cli.out)?;
            println!(
                "{} part(s), {} segment(s) -> {}",
                parts,
                transcript.segments.len(),
                path.display()
            );
        }

        Command::Chunk { transcript, title } => {
            let document = TranscriptDocument::load(&transcript)?;
            let title = title.unwrap_or_else(|| document.audio_file.clone());
            let result = document.into_result();
            let chunks = chunk_segments(&result.segments, &title, &config.chunking)?;

            for chunk in &chunks {
                println!(
                    "{}  [{}]  segments={:?}",
                    chunk.id, chunk.timestamp_range, chunk.segment_indices
                );
            }
            println!("{} chunk(s)", chunks.len());
        }

        Command::Query { text, top, title } => {
            let embedder = HttpEmbedder::new(
                &config.embedding.endpoint,
                &config.embedding.model,
                config.embedding.api_key.clone(),
            );
            let index = HttpChromaIndex::new(&config.index.base_url, &config.index.collection);

            let query_text = vec![format!("{QUERY_PREFIX}{text}")];
            let vectors = embedder.embed(&query_text)?;
            let vector = vectors
                .first()
                .ok_or_else(|| EmbedError::Malformed("no vector returned".to_string()))
                .map_err(PipelineError::Embed)?;

            let hits = index.query(vector, top, title.as_deref())?;
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "#{} dist={:.4} [{}] {}",
                    rank + 1,
                    hit.distance,
                    hit.metadata.audio_title,
                    hit.metadata.timestamp_range
                );
                let snippet: String = hit.document.chars().take(160).collect();
                println!("   {}", snippet.replace('\n', " "));
            }
        }
    }

    Ok(())
}

fn file_title(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("recording")
        .to_string()
}
