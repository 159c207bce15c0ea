// this_file: src/main.rs

//! pureshape CLI: shape text from the command line or JSONL batches from stdin.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use pureshape::{
    load_font_file, utils::format_glyphs, BatchShaper, ClusterLevel, Direction, Features,
    FontLoader, ShapeOptions, Shaper,
};
use std::io::{self, Read, Write};
use std::sync::Arc;

mod input;
mod job;

/// pureshape: pure Rust text shaping
#[derive(Parser)]
#[command(name = "pureshape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shape one string and print the positioned glyphs
    Shape {
        /// Font file (.ttf, .otf) or JSON font program (.json)
        font: Utf8PathBuf,

        /// Text to shape
        text: String,

        /// Size in pixels (positions are in font units when omitted)
        #[arg(long)]
        size: Option<f32>,

        /// Feature settings, e.g. "-liga,kern,salt=2"
        #[arg(long)]
        features: Option<String>,

        /// BCP-47 language tag
        #[arg(long)]
        language: Option<String>,

        /// Paragraph direction (ltr or rtl)
        #[arg(long)]
        direction: Option<Direction>,

        /// Assign clusters per grapheme instead of per codepoint
        #[arg(long)]
        graphemes: bool,

        /// Face index inside a font collection
        #[arg(long, default_value = "0")]
        face_index: u32,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Shape a batch of JSONL jobs from stdin, writing JSONL results to stdout
    Batch {
        /// Font cache size (number of font programs)
        #[arg(long, default_value = "512")]
        cache_size: usize,

        /// Number of parallel worker threads (0 = auto)
        #[arg(long = "jobs", default_value = "0", alias = "workers")]
        jobs: usize,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Shape {
            font,
            text,
            size,
            features,
            language,
            direction,
            graphemes,
            face_index,
            json,
            verbose,
        } => {
            init_logging(verbose);
            let mut options = ShapeOptions::default();
            if let Some(features) = features {
                options.features = features.parse::<Features>()?;
            }
            options.size = size;
            options.segment.language = language;
            options.segment.direction = direction;
            if graphemes {
                options.cluster_level = ClusterLevel::Graphemes;
            }
            run_shape(&font, face_index, &text, &options, json)?;
        }
        Commands::Batch {
            cache_size,
            jobs,
            verbose,
        } => {
            init_logging(verbose);
            run_batch_mode(cache_size, jobs)?;
        }
        Commands::Version => {
            println!("pureshape {}", env!("CARGO_PKG_VERSION"));
            println!("Pure Rust text shaping engine");
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run_shape(
    font_path: &Utf8PathBuf,
    face_index: u32,
    text: &str,
    options: &ShapeOptions,
    json: bool,
) -> anyhow::Result<()> {
    let font = load_font_file(font_path.as_std_path(), face_index)
        .with_context(|| format!("loading {font_path}"))?;
    let result = Shaper::new().shape(&font, text.into(), options)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        writeln!(handle, "{}", serde_json::to_string_pretty(&result)?)?;
    } else if !result.is_empty() {
        writeln!(handle, "{}", format_glyphs(&result.glyphs))?;
    }
    Ok(())
}

/// Run in batch mode: read all jobs from stdin, shape in parallel, output JSONL in input order.
fn run_batch_mode(cache_size: usize, workers: usize) -> anyhow::Result<()> {
    log::info!(
        "Starting batch mode (cache_size={}, jobs={})",
        cache_size,
        workers
    );

    let mut payload = String::new();
    io::stdin().lock().read_to_string(&mut payload)?;
    let jobs = input::parse_jobs_payload(&payload)?;
    log::info!("Loaded {} jobs from stdin", jobs.len());

    let loader = FontLoader::new(cache_size);
    let batch = BatchShaper::new(Arc::new(Shaper::new()));
    let results = job::run_jobs(&jobs, &loader, &batch, workers)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for result in &results {
        writeln!(handle, "{}", serde_json::to_string(result)?)?;
    }
    handle.flush()?;

    let failed = results.iter().filter(|r| r.status != "success").count();
    log::info!(
        "Batch processing complete ({} jobs, {} failed)",
        results.len(),
        failed
    );
    Ok(())
}
