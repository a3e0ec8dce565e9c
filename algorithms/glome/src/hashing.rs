//! BLAKE3-256 content addressing.
//!
//! Invariants:
//! 1. Same content always produces the same digest, on every platform
//!    (all integer feeds are little-endian regardless of host order).
//! 2. Composition digests are order-sensitive: `[A, B] ≠ [B, A]`.
//! 3. Composition digests are multiplicity-sensitive: `[A]×1 ≠ [A]×2`.

use crate::types::{Digest, Seed};

// =============================================================================
// PRIMITIVE DIGESTS
// =============================================================================

/// Digest of a single little-endian 32-bit value.
///
/// This is the record digest for codepoints and for 32-bit float patterns
/// extracted from tensor payloads.
#[must_use]
pub fn hash_seed_u32(value: u32) -> Digest {
    Digest(*blake3::hash(&value.to_le_bytes()).as_bytes())
}

/// Digest of a full seed: one discriminator tag byte followed by the
/// seed's 64 value bits, little-endian.
///
/// Codepoints contribute their zero-extended value, integers their
/// two's-complement bits, float seeds their raw IEEE-754 bits. The tag
/// byte keeps equal bit patterns in different variants distinct.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hash_seed(seed: &Seed) -> Digest {
    let mut buf = [0u8; 9];
    buf[0] = seed.kind().as_i32() as u8;
    buf[1..9].copy_from_slice(&seed.value_bits().to_le_bytes());
    Digest(*blake3::hash(&buf).as_bytes())
}

/// Digest of raw bytes.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> Digest {
    Digest(*blake3::hash(data).as_bytes())
}

// =============================================================================
// COMPOSITION DIGESTS
// =============================================================================

/// Digest of an ordered composition: for each child, its 32 digest bytes
/// followed by its 32-bit little-endian multiplicity.
///
/// # Panics
/// Panics when the slices differ in length.
#[must_use]
pub fn hash_composition(children: &[Digest], multiplicities: &[u32]) -> Digest {
    assert_eq!(
        children.len(),
        multiplicities.len(),
        "one multiplicity per child"
    );

    let mut hasher = blake3::Hasher::new();
    for (child, multiplicity) in children.iter().zip(multiplicities) {
        hasher.update(child.as_bytes());
        hasher.update(&multiplicity.to_le_bytes());
    }
    Digest(*hasher.finalize().as_bytes())
}

// =============================================================================
// BATCH DIGESTS
// =============================================================================

/// Digest a slice of 32-bit seed values.
///
/// BLAKE3 is already SIMD-parallel internally; this is a convenience loop
/// over [`hash_seed_u32`], not a different construction.
#[must_use]
pub fn hash_seeds_u32(values: &[u32]) -> Vec<Digest> {
    values.iter().map(|&v| hash_seed_u32(v)).collect()
}
