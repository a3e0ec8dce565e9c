//! Tensor container reader.
//!
//! The container format is: an 8-byte little-endian header length `N`,
//! `N` bytes of a JSON object mapping tensor names to descriptors, then a
//! contiguous payload region. Descriptor byte ranges are relative to the
//! start of the payload region. The reserved `__metadata__` entry is
//! skipped. Only F32 and F16 payloads are materialised; F16 elements are
//! widened to F32 on read.

use crate::errors::ParseError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Elements decoded per read chunk during streaming.
pub const READ_CHUNK_ELEMENTS: usize = 1_000_000;

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// Element type of a tensor payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    /// 32-bit IEEE-754 single precision.
    F32,
    /// 16-bit IEEE-754 half precision, widened to F32 on read.
    F16,
    /// Any other element type; skipped during ingestion.
    Unsupported,
}

impl Dtype {
    fn parse(name: &str) -> Self {
        match name {
            "F32" => Self::F32,
            "F16" => Self::F16,
            _ => Self::Unsupported,
        }
    }

    /// True for element types the pipeline materialises.
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::F32 | Self::F16)
    }

    const fn element_size(self) -> u64 {
        match self {
            Self::F32 => 4,
            Self::F16 => 2,
            Self::Unsupported => 1,
        }
    }
}

/// One tensor as declared by the container header.
#[derive(Debug, Clone)]
pub struct TensorDescriptor {
    /// Name from the header table.
    pub name: String,
    /// Declared element type.
    pub dtype: Dtype,
    /// Declared dimensions.
    pub shape: Vec<i64>,
    /// Byte range `[begin, end)` relative to the payload region.
    pub byte_range: (u64, u64),
}

impl TensorDescriptor {
    /// Product of the shape dimensions (1 for a scalar tensor).
    #[must_use]
    pub fn total_elements(&self) -> i64 {
        self.shape.iter().product()
    }

    /// Number of elements implied by the declared byte range.
    #[must_use]
    pub const fn range_elements(&self) -> u64 {
        (self.byte_range.1 - self.byte_range.0) / self.dtype.element_size()
    }
}

#[derive(Deserialize)]
struct RawDescriptor {
    dtype: String,
    shape: Vec<i64>,
    data_offsets: [u64; 2],
}

// =============================================================================
// CONTAINER
// =============================================================================

/// An open tensor container with a parsed header.
#[derive(Debug)]
pub struct TensorContainer {
    file: File,
    payload_offset: u64,
    payload_len: u64,
    tensors: Vec<TensorDescriptor>,
}

impl TensorContainer {
    /// Open a container file and parse its header.
    ///
    /// Tensors are ordered by ascending payload offset so iteration is
    /// deterministic regardless of JSON key order.
    ///
    /// # Errors
    /// Returns [`ParseError`] on I/O failure, a truncated or malformed
    /// header, or a descriptor range past the end of the payload.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let mut file = File::open(path)?;
        let file_len = file.metadata()?.len();

        let mut len_bytes = [0u8; 8];
        file.read_exact(&mut len_bytes)
            .map_err(|_| ParseError::Header("truncated length prefix".to_owned()))?;
        let header_len = u64::from_le_bytes(len_bytes);

        if header_len.checked_add(8).map_or(true, |end| end > file_len) {
            return Err(ParseError::Header(format!(
                "declared header length {header_len} exceeds file size {file_len}"
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut header_bytes = vec![0u8; header_len as usize];
        file.read_exact(&mut header_bytes)?;

        let payload_offset = 8 + header_len;
        let payload_len = file_len - payload_offset;

        let table: HashMap<String, serde_json::Value> = serde_json::from_slice(&header_bytes)
            .map_err(|e| ParseError::Header(e.to_string()))?;

        let mut tensors = Vec::with_capacity(table.len());
        for (name, value) in table {
            if name == "__metadata__" {
                continue;
            }
            let raw: RawDescriptor = serde_json::from_value(value)
                .map_err(|e| ParseError::Header(format!("descriptor `{name}`: {e}")))?;
            let (begin, end) = (raw.data_offsets[0], raw.data_offsets[1]);
            if begin > end || end > payload_len {
                return Err(ParseError::Range {
                    name,
                    begin,
                    end,
                    payload_len,
                });
            }
            tensors.push(TensorDescriptor {
                name,
                dtype: Dtype::parse(&raw.dtype),
                shape: raw.shape,
                byte_range: (begin, end),
            });
        }
        tensors.sort_by(|a, b| {
            a.byte_range
                .0
                .cmp(&b.byte_range.0)
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(
            tensors = tensors.len(),
            payload_len, "parsed tensor container header"
        );

        Ok(Self {
            file,
            payload_offset,
            payload_len,
            tensors,
        })
    }

    /// The declared tensors, in ascending payload-offset order.
    #[must_use]
    pub fn tensors(&self) -> &[TensorDescriptor] {
        &self.tensors
    }

    /// Total length of the payload region in bytes.
    #[must_use]
    pub const fn payload_len(&self) -> u64 {
        self.payload_len
    }

    /// Start streaming the elements of tensor `index`, decoded to F32, at
    /// most `limit` elements when given.
    ///
    /// # Errors
    /// Returns [`ParseError`] when seeking to the tensor payload fails.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds or the tensor's element type
    /// is not materialised.
    pub fn elements(
        &mut self,
        index: usize,
        limit: Option<u64>,
    ) -> Result<ElementReader<'_>, ParseError> {
        let descriptor = &self.tensors[index];
        assert!(
            descriptor.dtype.is_materialized(),
            "cannot stream unsupported dtype"
        );

        let total = descriptor.range_elements();
        let remaining = limit.map_or(total, |cap| total.min(cap));

        self.file
            .seek(SeekFrom::Start(self.payload_offset + descriptor.byte_range.0))?;

        Ok(ElementReader {
            file: &mut self.file,
            dtype: descriptor.dtype,
            remaining,
            raw: Vec::new(),
            decoded: Vec::new(),
        })
    }
}

// =============================================================================
// ELEMENT STREAMING
// =============================================================================

/// Streaming element decoder over one tensor payload.
#[derive(Debug)]
pub struct ElementReader<'a> {
    file: &'a mut File,
    dtype: Dtype,
    remaining: u64,
    raw: Vec<u8>,
    decoded: Vec<f32>,
}

impl ElementReader<'_> {
    /// Decode the next chunk of up to [`READ_CHUNK_ELEMENTS`] elements.
    ///
    /// Returns `Ok(None)` when the tensor is exhausted.
    ///
    /// # Errors
    /// Returns [`ParseError`] when the payload read comes up short.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_chunk(&mut self) -> Result<Option<&[f32]>, ParseError> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let take = self.remaining.min(READ_CHUNK_ELEMENTS as u64) as usize;
        let byte_len = take * self.dtype.element_size() as usize;
        self.raw.resize(byte_len, 0);
        self.file.read_exact(&mut self.raw)?;

        self.decoded.clear();
        self.decoded.reserve(take);
        match self.dtype {
            Dtype::F32 => {
                for chunk in self.raw.chunks_exact(4) {
                    self.decoded
                        .push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
                }
            }
            Dtype::F16 => {
                for chunk in self.raw.chunks_exact(2) {
                    let half = u16::from_le_bytes([chunk[0], chunk[1]]);
                    self.decoded.push(half_to_single(half));
                }
            }
            Dtype::Unsupported => unreachable!("guarded by elements()"),
        }

        self.remaining -= take as u64;
        Ok(Some(&self.decoded))
    }
}

// =============================================================================
// HALF PRECISION
// =============================================================================

/// Widen an IEEE-754 half to single precision.
///
/// Zero-exponent halves (zeros and subnormals) flush to zero; exponent 31
/// widens to NaN or ±∞.
#[must_use]
pub fn half_to_single(half: u16) -> f32 {
    let sign = (u32::from(half) & 0x8000) << 16;
    let exponent = (half >> 10) & 0x1F;
    let mantissa = u32::from(half & 0x03FF);

    match exponent {
        0 => 0.0,
        31 => {
            if mantissa != 0 {
                f32::NAN
            } else if sign != 0 {
                f32::NEG_INFINITY
            } else {
                f32::INFINITY
            }
        }
        _ => f32::from_bits(sign | ((u32::from(exponent) + 112) << 23) | (mantissa << 13)),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::half_to_single;

    #[test]
    fn half_widening_matches_reference_values() {
        assert_eq!(half_to_single(0x0000), 0.0);
        assert_eq!(half_to_single(0x3C00), 1.0);
        assert_eq!(half_to_single(0xBC00), -1.0);
        assert_eq!(half_to_single(0x4000), 2.0);
        assert_eq!(half_to_single(0x3555), 0.333_251_95);
        assert_eq!(half_to_single(0x7C00), f32::INFINITY);
        assert_eq!(half_to_single(0xFC00), f32::NEG_INFINITY);
        assert!(half_to_single(0x7C01).is_nan());
    }

    #[test]
    fn subnormal_halves_flush_to_zero() {
        assert_eq!(half_to_single(0x0001), 0.0);
        assert_eq!(half_to_single(0x03FF), 0.0);
        assert_eq!(half_to_single(0x8001), 0.0);
    }
}
