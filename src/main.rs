use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use simcheck::config::{Config, EmbedBackend};
use simcheck::embed::ollama::OllamaEmbedder;
use simcheck::embed::Embedder;
use simcheck::engine::{self, EngineOptions};
use simcheck::ingest;
use simcheck::report::{self, Report};

#[derive(Parser)]
#[command(name = "simcheck", version, about = "Flag near-duplicate documents by embedding similarity")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every pair of documents and flag the similar ones
    Check {
        /// Files or directories to compare
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Flag pairs scoring strictly above this (-1.0 to 1.0)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Embedding model name
        #[arg(long)]
        model: Option<String>,
        /// Embedding server URL
        #[arg(long)]
        url: Option<String>,
        /// Concurrent embedding requests
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Walk directories recursively
        #[arg(short, long)]
        recursive: bool,
        /// Write flagged pairs as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the similarity heatmap as SVG
        #[arg(long)]
        heatmap: Option<PathBuf>,
    },
    /// Write a default config to .simcheck/config.toml
    Init,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;

    match command {
        Commands::Init => {
            let path = Config::path(&cwd);
            if path.exists() {
                println!("Config already exists at {}", path.display());
            } else {
                let path = Config::default().save(&cwd)?;
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Commands::Check {
            paths,
            threshold,
            model,
            url,
            jobs,
            recursive,
            csv,
            json,
            heatmap,
        } => {
            let mut config = Config::load(&cwd)?;
            if let Some(t) = threshold {
                config.engine.threshold = t;
            }
            if let Some(j) = jobs {
                config.engine.max_concurrent = j;
            }
            if recursive {
                config.ingest.recursive = true;
            }
            config.validate()?;
            let EmbedBackend::Ollama {
                model: cfg_model,
                url: cfg_url,
            } = &config.embed.backend;
            let model = model.unwrap_or_else(|| cfg_model.clone());
            let url = url.unwrap_or_else(|| cfg_url.clone());

            let ingested = ingest::load_corpus(&paths, &config.ingest)?;
            println!("Loaded {} document(s)", ingested.corpus.len());
            for skipped in &ingested.skipped {
                println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
            }

            let embedder = OllamaEmbedder::new(&url, &model)?;
            let options = EngineOptions {
                max_concurrent: config.effective_concurrency(),
            };
            let threshold = config.engine.threshold;
            let output = engine::run(&ingested.corpus, threshold, &embedder, &options)?;

            let report = Report::new(&ingested.corpus, output, embedder.model_name(), threshold);
            println!();
            print!("{}", report::render_console(&report));

            if let Some(path) = csv {
                report::csv::write_csv(&path, &report.flagged)?;
                println!("\nCSV report saved to {}", path.display());
            }
            if let Some(path) = json {
                report.write_json(&path)?;
                println!("JSON report saved to {}", path.display());
            }
            if let Some(path) = heatmap {
                report::heatmap::write_svg(&path, &report)?;
                println!("Heatmap saved to {}", path.display());
            }
            Ok(())
        }
    }
}
