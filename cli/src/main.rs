//! Glome CLI
//!
//! Ingestion front-end for the glome spatial store.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{caps, ingest, seed, TargetArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "glome")]
#[command(about = "Content-addressed spatial store ingestion", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed Unicode codepoint constants into the store
    Seed {
        /// First codepoint of the inclusive range
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Last codepoint of the inclusive range
        #[arg(long, default_value_t = glome::UNICODE_MAX)]
        end: u32,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Ingest F32/F16 tensors from a safetensors container
    Ingest {
        /// Path to the .safetensors file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Label recorded in the logs for this model
        #[arg(long, default_value = "unnamed")]
        model: String,

        /// Skip elements with |v| below this magnitude
        #[arg(long, default_value_t = 0.0)]
        threshold: f32,

        /// Derive the threshold that skips this percentage of elements
        /// (overrides --threshold)
        #[arg(long)]
        target_sparsity: Option<f32>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print detected CPU SIMD capabilities
    Caps,
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { start, end, target } => seed::run(start, end, &target)?,
        Commands::Ingest {
            file,
            model,
            threshold,
            target_sparsity,
            target,
        } => ingest::run(&file, &model, threshold, target_sparsity, &target)?,
        Commands::Caps => caps::run(),
    }

    Ok(())
}
