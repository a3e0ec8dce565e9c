//! Error catalogue for the store core.
//!
//! Every error maps onto a stable [`ResultCode`] at the library boundary;
//! wire and parse failures additionally carry a textual message.

use crate::types::ResultCode;
use thiserror::Error;

// =============================================================================
// PARSE ERRORS
// =============================================================================

/// Failure while reading or decoding a tensor container.
#[derive(Debug, Error)]
pub enum ParseError {
    /// I/O failure while reading the container file.
    #[error("container i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The header length prefix or JSON table is malformed.
    #[error("container header: {0}")]
    Header(String),

    /// A descriptor declares a byte range outside the payload region.
    #[error("tensor `{name}` declares bytes {begin}..{end} past payload end {payload_len}")]
    Range {
        /// Tensor name from the header table.
        name: String,
        /// Declared range start, relative to the payload region.
        begin: u64,
        /// Declared range end (exclusive).
        end: u64,
        /// Actual payload region length.
        payload_len: u64,
    },
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Failure while talking to the external relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not establish the connection.
    #[error("store connection: {0}")]
    Connection(#[source] postgres::Error),

    /// Starting or finishing a bulk-copy command failed.
    #[error("bulk-copy command: {0}")]
    Copy(#[source] postgres::Error),

    /// Writing the copy stream failed mid-batch.
    #[error("bulk-copy write: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// INGEST ERRORS
// =============================================================================

/// Any failure surfaced by the ingestion orchestrator.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Bad arguments (invalid range, missing file, …).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The tensor container could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The external store rejected the stream.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestError {
    /// The stable result code for this error.
    #[must_use]
    pub const fn code(&self) -> ResultCode {
        match self {
            Self::InvalidInput(_) | Self::Parse(_) => ResultCode::InvalidInput,
            Self::Store(StoreError::Connection(_)) => ResultCode::DbConnection,
            Self::Store(StoreError::Copy(_) | StoreError::Io(_)) => ResultCode::DbQuery,
        }
    }
}
