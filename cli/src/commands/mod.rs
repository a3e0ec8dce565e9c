//! Subcommand implementations.

pub mod caps;
pub mod ingest;
pub mod seed;

use anyhow::{bail, Result};
use clap::Args;
use glome::{ConstantRecord, CopyTarget, PostgresTarget, StoreError, StreamTarget};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

// =============================================================================
// TARGET SELECTION
// =============================================================================

/// Where encoded bulk-copy batches go.
#[derive(Args)]
pub struct TargetArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "GLOME_DSN")]
    pub dsn: Option<String>,

    /// Receiving table
    #[arg(long, default_value = glome::DEFAULT_TABLE)]
    pub table: String,

    /// Write the raw COPY stream to a file instead of a live store
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// A copy target resolved from the command line.
pub enum AnyTarget {
    /// Live PostgreSQL connection.
    Postgres(PostgresTarget),
    /// Raw stream export.
    File(StreamTarget<BufWriter<File>>),
}

impl CopyTarget for AnyTarget {
    fn copy_batch(&mut self, rows: &[ConstantRecord]) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(target) => target.copy_batch(rows),
            Self::File(target) => target.copy_batch(rows),
        }
    }
}

/// Resolve `--out` / `--dsn` into a concrete target.
pub fn open_target(args: &TargetArgs) -> Result<AnyTarget> {
    if let Some(path) = &args.out {
        let file = File::create(path)?;
        return Ok(AnyTarget::File(StreamTarget::new(BufWriter::new(file))));
    }
    if let Some(dsn) = &args.dsn {
        return Ok(AnyTarget::Postgres(PostgresTarget::connect(
            dsn,
            &args.table,
        )?));
    }
    bail!("provide --dsn (or GLOME_DSN) for a live store, or --out for a raw stream export");
}
