//! Bulk-copy transports.
//!
//! [`CopyTarget`] is the single seam between the orchestrator and whatever
//! consumes the binary COPY stream: a live PostgreSQL connection, a file,
//! or an in-memory buffer in tests. Every target drives the same
//! [`CopyEncoder`](crate::wire::CopyEncoder), so the bytes on the wire are
//! identical regardless of destination.

use crate::errors::StoreError;
use crate::types::ConstantRecord;
use crate::wire::CopyEncoder;
use postgres::{Client, NoTls};
use std::io::Write;
use tracing::debug;

// =============================================================================
// TARGET SEAM
// =============================================================================

/// Receiving table when none is configured.
pub const DEFAULT_TABLE: &str = "constant";

/// Destination of encoded bulk-copy batches.
///
/// One call transfers one complete COPY stream (signature, rows, trailer).
/// Implementations must discard the partial stream when the call fails so
/// re-running an ingestion stays idempotent.
pub trait CopyTarget {
    /// Copy one batch of records, returning how many rows were accepted.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the stream cannot be written or the
    /// store rejects the copy command.
    fn copy_batch(&mut self, rows: &[ConstantRecord]) -> Result<u64, StoreError>;
}

// =============================================================================
// POSTGRES TARGET
// =============================================================================

/// A live PostgreSQL connection executing `COPY ... FROM STDIN (FORMAT binary)`.
pub struct PostgresTarget {
    client: Client,
    statement: String,
    encoder: CopyEncoder,
}

impl PostgresTarget {
    /// Connect with a connection string and target table.
    ///
    /// The table is presumed provisioned with the row schema
    /// `(seed_value int8, seed_type int4, content_hash bytea,
    /// hilbert_high int8, hilbert_low int8, geom geometry(PointZM, 0))`.
    ///
    /// # Errors
    /// Returns [`StoreError::Connection`] when the connection fails.
    pub fn connect(dsn: &str, table: &str) -> Result<Self, StoreError> {
        let client = Client::connect(dsn, NoTls).map_err(StoreError::Connection)?;
        Ok(Self {
            client,
            statement: format!(
                "COPY {table} (seed_value, seed_type, content_hash, \
                 hilbert_high, hilbert_low, geom) FROM STDIN WITH (FORMAT binary)"
            ),
            encoder: CopyEncoder::new(),
        })
    }
}

impl CopyTarget for PostgresTarget {
    fn copy_batch(&mut self, rows: &[ConstantRecord]) -> Result<u64, StoreError> {
        let mut writer = self
            .client
            .copy_in(self.statement.as_str())
            .map_err(StoreError::Copy)?;

        // On any failure below, `writer` drops un-finished, which sends the
        // protocol's copy-failure termination and the store discards the
        // partial batch.
        self.encoder.encode_batch(rows, &mut writer)?;

        let accepted = writer.finish().map_err(StoreError::Copy)?;
        debug!(rows = rows.len(), accepted, "bulk-copy batch committed");
        Ok(accepted)
    }
}

// =============================================================================
// STREAM TARGET
// =============================================================================

/// Writes encoded COPY streams to any [`Write`] sink.
///
/// Used by tests and by the CLI's raw-stream export mode.
#[derive(Debug)]
pub struct StreamTarget<W: Write> {
    out: W,
    encoder: CopyEncoder,
}

impl<W: Write> StreamTarget<W> {
    /// Wrap a sink.
    pub fn new(out: W) -> Self {
        Self {
            out,
            encoder: CopyEncoder::new(),
        }
    }

    /// Unwrap the sink, dropping the encoder.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CopyTarget for StreamTarget<W> {
    fn copy_batch(&mut self, rows: &[ConstantRecord]) -> Result<u64, StoreError> {
        self.encoder.encode_batch(rows, &mut self.out)?;
        Ok(rows.len() as u64)
    }
}
