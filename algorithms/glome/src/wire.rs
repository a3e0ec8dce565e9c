//! PostgreSQL binary COPY stream encoder.
//!
//! Framing: an 19-byte signature block, one length-prefixed tuple per row,
//! and a 0xFFFF trailer. All framing integers are big-endian; the embedded
//! EWKB geometry payload is little-endian. The mixed endianness is the
//! external format, not a choice made here.

use crate::types::{ConstantRecord, Point4};
use std::io::{self, Write};

// =============================================================================
// FRAMING CONSTANTS
// =============================================================================

/// The 11-byte stream signature.
pub const SIGNATURE: [u8; 11] = *b"PGCOPY\n\xff\r\n\0";

/// End-of-stream marker (a field count of -1).
pub const TRAILER: [u8; 2] = [0xFF, 0xFF];

/// Fields per row.
pub const FIELD_COUNT: u16 = 6;

/// Staging buffer size; rows accumulate here and flush as single writes.
pub const BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Exact encoded size of one row:
/// 2 (field count) + 12 (seed_value) + 8 (seed_type) + 36 (digest)
/// + 12 (hilbert_high) + 12 (hilbert_low) + 45 (geom).
pub const ROW_SIZE: usize = 127;

/// EWKB type word for PointZM with an embedded SRID.
const EWKB_POINT_ZM_SRID: u32 = 0xC000_0001;

/// Encoded size of the EWKB PointZM payload.
const EWKB_SIZE: i32 = 41;

// =============================================================================
// ENCODER
// =============================================================================

/// Serialises batches of records into the binary COPY stream.
///
/// The encoder owns a pre-allocated staging buffer; when the buffer cannot
/// hold the next row it is flushed to the output as one write and reset.
/// The trailer is emitted after the final flush.
#[derive(Debug)]
pub struct CopyEncoder {
    buf: Vec<u8>,
}

impl CopyEncoder {
    /// Create an encoder with the standard staging buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(BUFFER_SIZE),
        }
    }

    /// Encode one complete stream (signature, `rows`, trailer) into `out`.
    ///
    /// # Errors
    /// Propagates any write failure from `out`; the stream is then
    /// incomplete and the caller must abort the copy.
    pub fn encode_batch<W: Write>(
        &mut self,
        rows: &[ConstantRecord],
        out: &mut W,
    ) -> io::Result<()> {
        self.buf.clear();

        // Signature block: magic, flags = 0, header extension length = 0.
        self.buf.extend_from_slice(&SIGNATURE);
        self.buf.extend_from_slice(&0i32.to_be_bytes());
        self.buf.extend_from_slice(&0i32.to_be_bytes());

        for row in rows {
            if self.buf.len() + ROW_SIZE > BUFFER_SIZE {
                out.write_all(&self.buf)?;
                self.buf.clear();
            }
            self.push_row(row);
        }

        if self.buf.len() + TRAILER.len() > BUFFER_SIZE {
            out.write_all(&self.buf)?;
            self.buf.clear();
        }
        self.buf.extend_from_slice(&TRAILER);

        out.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    fn push_row(&mut self, row: &ConstantRecord) {
        let start = self.buf.len();

        self.buf.extend_from_slice(&FIELD_COUNT.to_be_bytes());

        self.buf.extend_from_slice(&8i32.to_be_bytes());
        self.buf.extend_from_slice(&row.seed_value.to_be_bytes());

        self.buf.extend_from_slice(&4i32.to_be_bytes());
        self.buf.extend_from_slice(&row.seed_type.to_be_bytes());

        self.buf.extend_from_slice(&32i32.to_be_bytes());
        self.buf.extend_from_slice(row.digest.as_bytes());

        self.buf.extend_from_slice(&8i32.to_be_bytes());
        self.buf.extend_from_slice(&row.hilbert_high.to_be_bytes());

        self.buf.extend_from_slice(&8i32.to_be_bytes());
        self.buf.extend_from_slice(&row.hilbert_low.to_be_bytes());

        self.buf.extend_from_slice(&EWKB_SIZE.to_be_bytes());
        push_ewkb_point_zm(&mut self.buf, row.point);

        debug_assert_eq!(self.buf.len() - start, ROW_SIZE);
    }
}

impl Default for CopyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// EWKB
// =============================================================================

/// Append the 41-byte little-endian EWKB PointZM with SRID 0.
fn push_ewkb_point_zm(buf: &mut Vec<u8>, p: Point4) {
    buf.push(0x01); // little-endian marker
    buf.extend_from_slice(&EWKB_POINT_ZM_SRID.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // SRID
    buf.extend_from_slice(&p.x.to_le_bytes());
    buf.extend_from_slice(&p.y.to_le_bytes());
    buf.extend_from_slice(&p.z.to_le_bytes());
    buf.extend_from_slice(&p.m.to_le_bytes());
}
