//! Caps Command
//!
//! Prints the memoized CPU capability record.

use glome::kernels;

/// Print the detected SIMD capabilities.
pub fn run() {
    println!("{}", kernels::capabilities_string());

    let caps = kernels::capabilities();
    let widest = if caps.avx512f {
        "AVX-512F"
    } else if caps.avx2 {
        "AVX2"
    } else if caps.avx {
        "AVX"
    } else if caps.sse41 {
        "SSE4.1"
    } else if caps.sse2 {
        "SSE2"
    } else {
        "portable"
    };
    println!("widest dispatched path: {widest}");
}
