//! Snapshot encoding for fast restart
//!
//! A snapshot carries `{m, k, n, p, inserted_count, bits}` plus a SHA-256
//! checksum. Decoding rejects anything that would not reproduce a usable
//! filter, so a corrupt snapshot forces a rebuild from the store instead of
//! silently introducing false negatives.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::parameters::{calculate_optimal_parameters, MAX_FILTER_BITS};
use super::probabilistic_filter::ProbabilisticFilter;
use crate::error::SnapshotError;

const SNAPSHOT_MAGIC: [u8; 4] = *b"HCMF";

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u16 = 1;

/// On-the-wire layout (bincode)
#[derive(Serialize, Deserialize)]
struct FilterSnapshot {
    magic: [u8; 4],
    version: u16,
    size_bits: u64,
    hash_count: u32,
    expected_elements: u64,
    target_fpr: f64,
    inserted_count: u64,
    bits: Vec<u8>,
    checksum: [u8; 32],
}

impl FilterSnapshot {
    fn compute_checksum(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.size_bits.to_le_bytes());
        hasher.update(self.hash_count.to_le_bytes());
        hasher.update(self.expected_elements.to_le_bytes());
        hasher.update(self.target_fpr.to_bits().to_le_bytes());
        hasher.update(self.inserted_count.to_le_bytes());
        hasher.update(&self.bits);
        hasher.finalize().into()
    }
}

/// Encode a filter into snapshot bytes
pub fn encode(filter: &ProbabilisticFilter) -> Result<Vec<u8>, SnapshotError> {
    let mut snapshot = FilterSnapshot {
        magic: SNAPSHOT_MAGIC,
        version: SNAPSHOT_VERSION,
        size_bits: filter.size_bits() as u64,
        hash_count: filter.hash_count() as u32,
        expected_elements: filter.expected_elements(),
        target_fpr: filter.target_fpr(),
        inserted_count: filter.inserted_count(),
        bits: filter.as_raw_bytes().to_vec(),
        checksum: [0u8; 32],
    };
    snapshot.checksum = snapshot.compute_checksum();

    bincode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))
}

/// Decode and validate snapshot bytes
pub fn decode(bytes: &[u8]) -> Result<ProbabilisticFilter, SnapshotError> {
    let snapshot: FilterSnapshot =
        bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;

    if snapshot.magic != SNAPSHOT_MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }
    if snapshot.checksum != snapshot.compute_checksum() {
        return Err(SnapshotError::ChecksumMismatch);
    }

    if snapshot.size_bits == 0 || snapshot.size_bits > MAX_FILTER_BITS {
        return Err(SnapshotError::Inconsistent(format!(
            "size_bits {} out of range",
            snapshot.size_bits
        )));
    }
    let params = calculate_optimal_parameters(snapshot.expected_elements, snapshot.target_fpr)
        .map_err(|e| SnapshotError::Inconsistent(e.to_string()))?;
    if snapshot.size_bits != params.size_bits as u64
        || snapshot.hash_count as usize != params.hash_count
    {
        return Err(SnapshotError::Inconsistent(format!(
            "(m={}, k={}) does not match sizing for n={}, p={} (m={}, k={})",
            snapshot.size_bits,
            snapshot.hash_count,
            snapshot.expected_elements,
            snapshot.target_fpr,
            params.size_bits,
            params.hash_count
        )));
    }

    let m = snapshot.size_bits as usize;
    let expected_bytes = m.div_ceil(8);
    if snapshot.bits.len() != expected_bytes {
        return Err(SnapshotError::Inconsistent(format!(
            "bit array holds {} bytes, expected {}",
            snapshot.bits.len(),
            expected_bytes
        )));
    }

    let mut bits = BitVec::<u8, Lsb0>::from_vec(snapshot.bits);
    bits.truncate(m);

    Ok(ProbabilisticFilter::from_parts(
        bits,
        snapshot.hash_count as usize,
        snapshot.expected_elements,
        snapshot.target_fpr,
        snapshot.inserted_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_filter() -> ProbabilisticFilter {
        let mut filter = ProbabilisticFilter::new(1000, 0.01).unwrap();
        for i in 0..300 {
            filter.add(&format!("user_{}", i));
        }
        filter
    }

    #[test]
    fn test_snapshot_reconstructs_identical_filter() {
        let filter = populated_filter();

        let bytes = encode(&filter).unwrap();
        let restored = decode(&bytes).unwrap();

        assert_eq!(restored, filter);
        assert_eq!(restored.inserted_count(), 300);
        for i in 0..300 {
            assert!(restored.might_contain(&format!("user_{}", i)));
        }
    }

    #[test]
    fn test_corrupt_bits_rejected() {
        let mut bytes = encode(&populated_filter()).unwrap();
        let idx = bytes.len() - 40;
        bytes[idx] ^= 0xFF;

        assert!(matches!(decode(&bytes), Err(SnapshotError::ChecksumMismatch)));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = encode(&populated_filter()).unwrap();
        bytes[0] ^= 0xFF;

        assert!(matches!(decode(&bytes), Err(SnapshotError::BadMagic)));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = encode(&populated_filter()).unwrap();
        // version is the little-endian u16 right after the 4-byte magic
        bytes[4] = 2;

        assert!(matches!(
            decode(&bytes),
            Err(SnapshotError::UnsupportedVersion(2))
        ));
    }

    fn resealed(mutate: impl FnOnce(&mut FilterSnapshot)) -> Vec<u8> {
        let bytes = encode(&populated_filter()).unwrap();
        let mut snapshot: FilterSnapshot = bincode::deserialize(&bytes).unwrap();
        mutate(&mut snapshot);
        snapshot.checksum = snapshot.compute_checksum();
        bincode::serialize(&snapshot).unwrap()
    }

    #[test]
    fn test_hash_count_off_formula_rejected() {
        let bytes = resealed(|s| s.hash_count = 5_000);

        assert!(matches!(decode(&bytes), Err(SnapshotError::Inconsistent(_))));
    }

    #[test]
    fn test_size_off_formula_rejected() {
        let bytes = resealed(|s| {
            s.size_bits = 16_000;
            s.bits = vec![0u8; 2_000];
        });

        assert!(matches!(decode(&bytes), Err(SnapshotError::Inconsistent(_))));
    }

    #[test]
    fn test_invalid_sizing_inputs_rejected() {
        let bytes = resealed(|s| s.target_fpr = 1.5);

        assert!(matches!(decode(&bytes), Err(SnapshotError::Inconsistent(_))));
    }

    #[test]
    fn test_truncated_snapshot_rejected() {
        let bytes = encode(&populated_filter()).unwrap();

        assert!(matches!(
            decode(&bytes[..10]),
            Err(SnapshotError::Decode(_))
        ));
    }
}
