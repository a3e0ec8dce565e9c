//! Shared value types used across the glome library.

use core::fmt;

// =============================================================================
// SEEDS
// =============================================================================

/// Wire discriminator for the seed variants.
///
/// The integer values are part of the on-wire contract (the `seed_type`
/// column) and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SeedKind {
    /// Unicode codepoint, 0..=0x10FFFF.
    Codepoint = 0,
    /// Two's-complement 64-bit signed integer.
    Integer = 1,
    /// Raw IEEE-754 bit pattern of a double.
    FloatBits = 2,
    /// Composition of other entries; carries no value of its own.
    Composition = 3,
}

impl SeedKind {
    /// The `seed_type` column value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// A primitive value to be placed on the unit 3-sphere.
///
/// Seeds carry exact bit content, never interpreted numeric values: a
/// `FloatBits` seed distinguishes `+0.0` from `-0.0` and one NaN payload
/// from another, which is what makes projection and content addressing
/// reproducible bit-for-bit across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seed {
    /// A Unicode codepoint. Surrogates (0xD800..=0xDFFF) are never
    /// enumerated, but the projector accepts any value.
    Codepoint(u32),
    /// A signed 64-bit integer.
    Integer(i64),
    /// The 64 raw bits of an IEEE-754 double.
    FloatBits(u64),
    /// A composition node; its digest derives from child digests and
    /// multiplicities instead of a value.
    Composition,
}

impl Seed {
    /// Build a float-bits seed from a double value.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self::FloatBits(value.to_bits())
    }

    /// Build a float-bits seed from a 32-bit float pattern, zero-extended.
    ///
    /// Tensor ingestion stores single-precision patterns this way; the
    /// upper 32 bits stay clear.
    #[must_use]
    pub const fn from_f32_bits(bits: u32) -> Self {
        Self::FloatBits(bits as u64)
    }

    /// The wire discriminator of this seed.
    #[must_use]
    pub const fn kind(&self) -> SeedKind {
        match self {
            Self::Codepoint(_) => SeedKind::Codepoint,
            Self::Integer(_) => SeedKind::Integer,
            Self::FloatBits(_) => SeedKind::FloatBits,
            Self::Composition => SeedKind::Composition,
        }
    }

    /// The exact 64-bit value content fed to the content hash.
    ///
    /// Codepoints are zero-extended, integers contribute their
    /// two's-complement bits, float seeds their raw bits. Composition has
    /// no value content and contributes zero.
    #[must_use]
    pub const fn value_bits(&self) -> u64 {
        match self {
            Self::Codepoint(cp) => *cp as u64,
            Self::Integer(v) => *v as u64,
            Self::FloatBits(bits) => *bits,
            Self::Composition => 0,
        }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point in 4-dimensional Euclidean space, exact double precision.
///
/// Every seed-derived point satisfies x² + y² + z² + m² = 1 within
/// [`SPHERE_TOLERANCE`](crate::projection::SPHERE_TOLERANCE). Points are
/// immutable value objects with no identity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point4 {
    /// First component.
    pub x: f64,
    /// Second component.
    pub y: f64,
    /// Third component.
    pub z: f64,
    /// Fourth component (the "measure" axis in the stored geometry).
    pub m: f64,
}

impl Point4 {
    /// Construct a point from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self { x, y, z, m }
    }

    /// Squared Euclidean norm.
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.m * self.m
    }
}

// =============================================================================
// DIGESTS
// =============================================================================

/// A 256-bit content digest.
///
/// Opaque 32 bytes; equality is bytewise. Displayed as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Borrow the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// One fully-derived entry, ready for bulk-copy serialisation.
///
/// `seed_value` is the historical opaque bit pattern interpreted through
/// `seed_type`: the raw codepoint for `Codepoint` rows, the zero-extended
/// 32-bit float pattern for `FloatBits` rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRecord {
    /// Opaque seed bits, interpreted through `seed_type`.
    pub seed_value: i64,
    /// Wire discriminator, see [`SeedKind`].
    pub seed_type: i32,
    /// BLAKE3-256 content address of the seed.
    pub digest: Digest,
    /// High half of the 128-bit Hilbert key.
    pub hilbert_high: i64,
    /// Low half of the 128-bit Hilbert key.
    pub hilbert_low: i64,
    /// Exact position on the unit 3-sphere.
    pub point: Point4,
}

// =============================================================================
// RESULT CODES
// =============================================================================

/// Stable result codes surfaced at the library boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResultCode {
    /// Success.
    Ok = 0,
    /// Could not establish the store connection.
    DbConnection = -1,
    /// A store command or bulk-copy write failed.
    DbQuery = -2,
    /// Bad arguments or malformed input data.
    InvalidInput = -3,
    /// Memory acquisition failure.
    OutOfMemory = -4,
    /// Two distinct inputs produced the same digest.
    HashCollision = -5,
    /// A requested entry does not exist.
    NotFound = -6,
}

impl ResultCode {
    /// The numeric code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}
