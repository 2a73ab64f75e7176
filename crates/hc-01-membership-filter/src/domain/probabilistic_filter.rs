//! Core probabilistic membership filter
//!
//! INVARIANTS:
//! - No false negatives: once `add(key)` returns, `might_contain(key)` is true
//! - Bits only transition 0 -> 1; the filter is discarded, never cleared
//! - `inserted_count` never decreases

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::FilterConfig;
use super::hash_functions::compute_hash_positions;
use super::parameters::{calculate_fpr, calculate_optimal_parameters};
use super::snapshot;
use crate::error::FilterError;

/// Bloom-style filter for handle membership
///
/// Answers `false` ("definitely absent") or `true` ("possibly present,
/// confirm with an authoritative source"). Keys are compared
/// case-insensitively.
///
/// `inserted_count` counts `add` calls, including repeats of a key that is
/// already present. It feeds the diagnostic fill ratio only.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilisticFilter {
    /// Bit array storing the filter state
    bits: BitVec<u8, Lsb0>,
    /// Size in bits (m)
    m: usize,
    /// Number of hash functions (k)
    k: usize,
    /// Expected number of elements (n)
    expected_elements: u64,
    /// Target false positive rate (p)
    target_fpr: f64,
    /// Number of add operations performed
    inserted_count: u64,
}

/// Diagnostic snapshot of a filter
///
/// Not load-bearing for correctness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    pub size_bits: usize,
    pub hash_count: usize,
    pub expected_elements: u64,
    pub target_fpr: f64,
    pub inserted_count: u64,
    pub bits_set: usize,
    /// inserted_count / expected_elements
    pub fill_ratio: f64,
    /// (1 - e^(-k * fill_ratio))^k
    pub estimated_false_positive_rate: f64,
    /// (1 - e^(-k * inserted_count / m))^k
    pub theoretical_false_positive_rate: f64,
}

impl ProbabilisticFilter {
    /// Create an empty filter sized for `expected_elements` at `target_fpr`
    ///
    /// Fails with `InvalidParameter` if `expected_elements == 0` or
    /// `target_fpr` is not strictly between 0 and 1.
    pub fn new(expected_elements: u64, target_fpr: f64) -> Result<Self, FilterError> {
        let params = calculate_optimal_parameters(expected_elements, target_fpr)?;
        Ok(Self {
            bits: bitvec![u8, Lsb0; 0; params.size_bits],
            m: params.size_bits,
            k: params.hash_count,
            expected_elements,
            target_fpr,
            inserted_count: 0,
        })
    }

    /// Create an empty filter from a validated configuration
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        Self::new(config.expected_element_count, config.target_false_positive_rate)
    }

    /// Reassemble a filter from decoded snapshot parts
    pub(crate) fn from_parts(
        bits: BitVec<u8, Lsb0>,
        k: usize,
        expected_elements: u64,
        target_fpr: f64,
        inserted_count: u64,
    ) -> Self {
        Self {
            m: bits.len(),
            bits,
            k,
            expected_elements,
            target_fpr,
            inserted_count,
        }
    }

    /// Insert a key
    ///
    /// Returns `true` if at least one bit flipped from 0 to 1. Re-adding a key
    /// leaves the bit array unchanged but still increments `inserted_count`.
    pub fn add(&mut self, key: &str) -> bool {
        let mut changed = false;
        for pos in compute_hash_positions(key, self.k, self.m) {
            changed |= !self.bits.replace(pos, true);
        }
        self.inserted_count += 1;
        changed
    }

    /// Insert every key from an iterator
    ///
    /// Same contract as repeated `add`; returns the number of keys processed.
    pub fn add_batch<I, S>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for key in keys {
            self.add(key.as_ref());
            count += 1;
        }
        count
    }

    /// Test if a key might be in the filter
    ///
    /// Returns:
    /// - `false` if the key is definitely NOT in the set
    /// - `true` if the key might be in the set (could be a false positive)
    pub fn might_contain(&self, key: &str) -> bool {
        compute_hash_positions(key, self.k, self.m)
            .iter()
            .all(|&pos| self.bits[pos])
    }

    /// Whether two filters share m and k and can be merged
    pub fn is_compatible(&self, other: &ProbabilisticFilter) -> bool {
        self.m == other.m && self.k == other.k
    }

    /// Merge another filter into this one (bitwise OR)
    ///
    /// Afterwards this filter reports every key either filter contained.
    /// Insertion counts add up.
    pub fn merge(&mut self, other: &ProbabilisticFilter) -> Result<(), FilterError> {
        if !self.is_compatible(other) {
            return Err(FilterError::InvalidParameter(format!(
                "cannot merge filter (m={}, k={}) into (m={}, k={})",
                other.m, other.k, self.m, self.k
            )));
        }

        let self_raw = self.bits.as_raw_mut_slice();
        for (s, o) in self_raw.iter_mut().zip(other.bits.as_raw_slice()) {
            *s |= *o;
        }
        self.inserted_count += other.inserted_count;
        Ok(())
    }

    /// Diagnostic statistics
    pub fn stats(&self) -> FilterStats {
        let fill_ratio = self.inserted_count as f64 / self.expected_elements as f64;
        FilterStats {
            size_bits: self.m,
            hash_count: self.k,
            expected_elements: self.expected_elements,
            target_fpr: self.target_fpr,
            inserted_count: self.inserted_count,
            bits_set: self.bits_set(),
            fill_ratio,
            estimated_false_positive_rate: calculate_fpr(self.k, fill_ratio),
            theoretical_false_positive_rate: calculate_fpr(
                self.k,
                self.inserted_count as f64 / self.m as f64,
            ),
        }
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bits (m)
    pub fn size_bits(&self) -> usize {
        self.m
    }

    /// Get the number of hash functions (k)
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Get the expected element count (n)
    pub fn expected_elements(&self) -> u64 {
        self.expected_elements
    }

    /// Get the configured target FPR (p)
    pub fn target_fpr(&self) -> f64 {
        self.target_fpr
    }

    /// Get the number of add operations performed
    pub fn inserted_count(&self) -> u64 {
        self.inserted_count
    }

    /// Raw backing bytes of the bit array
    pub fn as_raw_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Serialize the filter to an opaque snapshot blob
    pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>, FilterError> {
        Ok(snapshot::encode(self)?)
    }

    /// Reconstruct a filter from a snapshot blob
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        Ok(snapshot::decode(bytes)?)
    }
}
