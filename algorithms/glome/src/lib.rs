//! # Glome
//!
//! Content-addressed spatial store core. Maps heterogeneous primitive
//! values (Unicode codepoints, signed integers, IEEE-754 bit patterns,
//! tensor parameters) onto deterministic points of the unit 3-sphere,
//! encodes each point into a 128-bit Hilbert locality key, addresses each
//! entry with a BLAKE3-256 digest, and streams batches into PostgreSQL
//! through the binary COPY protocol.

//! # Usage
//! ```rust
//! use glome::{hashing, hilbert, project, verify_on_sphere, Seed};
//!
//! // 1. Deterministic projection
//! let point = project(&Seed::Codepoint('A' as u32));
//! assert!(verify_on_sphere(point, 1e-10));
//!
//! // 2. Locality key
//! let key = hilbert::encode(point);
//! assert_eq!(key, hilbert::encode(point));
//!
//! // 3. Content address
//! let digest = hashing::hash_seed(&Seed::Codepoint('A' as u32));
//! assert_eq!(digest.to_hex().len(), 64);
//! ```

// =============================================================================
// MODULES
// =============================================================================

mod errors;
pub mod hashing;
pub mod hilbert;
mod ingest;
pub mod kernels;
pub mod projection;
mod store;
pub mod tensor;
pub(crate) mod types;
pub mod wire;

// =============================================================================
// EXPORTS
// =============================================================================

pub use errors::{IngestError, ParseError, StoreError};
pub use ingest::{
    is_surrogate, IngestReport, Ingestor, Progress, ProgressSink, SparsityMode, COPY_BATCH_ROWS,
    SAMPLE_ELEMENTS_PER_TENSOR, UNICODE_MAX,
};
pub use projection::{project, verify_on_sphere, SPHERE_TOLERANCE};
pub use store::{CopyTarget, PostgresTarget, StreamTarget, DEFAULT_TABLE};
pub use types::{ConstantRecord, Digest, Point4, ResultCode, Seed, SeedKind};

/// Returns the detected CPU capability summary.
#[must_use]
pub fn active_capabilities() -> String {
    kernels::capabilities_string()
}
