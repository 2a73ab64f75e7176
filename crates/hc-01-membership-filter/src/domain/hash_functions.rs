//! Hash functions for the membership filter
//!
//! Keys are lower-cased before hashing so that `Alice` and `alice` map to the
//! same bit positions. Two MurmurHash3 (x64, 128-bit) evaluations with seeds 0
//! and 1 provide `h1` and `h2` for the double-hashing schedule.

use std::io::Cursor;

/// Seed for the first hash value (h1)
const SEED_PRIMARY: u32 = 0;
/// Seed for the second hash value (h2)
const SEED_SECONDARY: u32 = 1;

/// Hash raw bytes with MurmurHash3 and return the lower 64 bits
pub fn murmur_hash(bytes: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(bytes);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    hash as u64
}

/// Canonical form of a key as seen by the filter
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// Compute k bit positions for a key
///
/// Uses double hashing: position(i) = (h1 + i * h2) mod m, for i in [0, k).
pub fn compute_hash_positions(key: &str, k: usize, m: usize) -> Vec<usize> {
    let normalized = normalize_key(key);
    let h1 = murmur_hash(normalized.as_bytes(), SEED_PRIMARY);
    let h2 = murmur_hash(normalized.as_bytes(), SEED_SECONDARY);

    (0..k)
        .map(|i| {
            let hash = h1.wrapping_add((i as u64).wrapping_mul(h2));
            (hash % m as u64) as usize
        })
        .collect()
}
