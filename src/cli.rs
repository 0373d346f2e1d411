//
// cli.rs
// Dicom-Study-rs
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the library.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::assembler::{load_directory, LoadOptions};
use crate::progress::{Phase, ProgressEvent};
use crate::summary;

/// Command-line interface glue code: defines the available verbs and dispatches to modules.
#[derive(Parser)]
#[command(name = "dicom-study")]
#[command(about = "Assemble DICOM studies: series, reports, key images and annotations", long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load every DICOM file under a directory into one study
    Load {
        directory: PathBuf,
        /// Print the study as JSON instead of an outline
        #[arg(long)]
        json: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Decode files one at a time
        #[arg(long)]
        sequential: bool,
        #[arg(long, default_value_t = 512)]
        max_file_size_mb: u64,
        /// Limit on the unpacked overlay planes of one image
        #[arg(long, default_value_t = 128)]
        max_overlay_mb: u64,
        /// Number of leading files that may supply the study header
        #[arg(long, default_value_t = 10)]
        header_probe: usize,
    },
    /// Classify and decode a single file
    Inspect {
        file: PathBuf,
        #[arg(long, default_value_t = 512)]
        max_file_size_mb: u64,
    },
}

/// Megabyte flag to bytes; absurd values clamp instead of overflowing.
fn mib(megabytes: u64) -> u64 {
    megabytes.saturating_mul(1024 * 1024)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_progress(event: &ProgressEvent) {
    match event.phase {
        Phase::Parsing => eprintln!(
            "[{}/{}] {}",
            event.current,
            event.total,
            event.current_file_name.as_deref().unwrap_or("")
        ),
        phase => eprintln!("{:?}: {} file(s)", phase, event.total),
    }
}

pub async fn run() -> anyhow::Result<()> {
    // Parse the raw CLI arguments once and dispatch to a subcommand handler.
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Load {
            directory,
            json,
            output,
            sequential,
            max_file_size_mb,
            max_overlay_mb,
            header_probe,
        } => {
            if header_probe == 0 {
                bail!("--header-probe must be greater than zero");
            }
            let mut options = LoadOptions::default()
                .with_max_file_size(mib(max_file_size_mb))
                .with_max_overlay_bytes(mib(max_overlay_mb))
                .with_header_probe_limit(header_probe);
            if sequential {
                options = options.sequential();
            }

            // Progress flows through a channel so decoding never waits on the terminal.
            let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    print_progress(&event);
                }
            });
            let loaded = tokio::task::spawn_blocking(move || {
                load_directory(&directory, &options, &tx)
            })
            .await
            .context("Load task panicked")??;
            printer.await?;

            let rendered = if json {
                serde_json::to_string_pretty(&loaded.study).context("Failed to serialize study")?
            } else {
                summary::render_study(&loaded.study, &loaded.skipped)
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered).context("Failed to write output file")?;
                    println!("Study saved to {:?}", path);
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Inspect {
            file,
            max_file_size_mb,
        } => {
            let options = LoadOptions::default().with_max_file_size(mib(max_file_size_mb));
            print!("{}", summary::inspect_to_string(&file, &options)?);
        }
    }

    Ok(())
}
