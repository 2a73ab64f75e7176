//! Optimal filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- bits
//! - k = ceil((m/n) * ln(2))         -- hash functions
//! - FPR = (1 - e^(-k*x))^k          -- x is the load (n/m, or fill ratio)

use std::f64::consts::LN_2;

use crate::error::FilterError;

/// Upper bound on the bit array (2 GiB of bits)
pub const MAX_FILTER_BITS: u64 = 1 << 34;

/// Derived filter sizing
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: usize,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Theoretical FPR once `n` distinct keys are inserted
    pub expected_fpr: f64,
}

/// Validate the construction inputs
pub fn validate_inputs(expected_elements: u64, target_fpr: f64) -> Result<(), FilterError> {
    if expected_elements == 0 {
        return Err(FilterError::InvalidParameter(
            "expected element count must be positive".to_string(),
        ));
    }
    if !target_fpr.is_finite() || target_fpr <= 0.0 || target_fpr >= 1.0 {
        return Err(FilterError::InvalidParameter(format!(
            "target false positive rate must be in (0, 1), got {}",
            target_fpr
        )));
    }
    Ok(())
}

/// Calculate filter parameters for `n` expected elements at target FPR `p`
///
/// Fails with `InvalidParameter` when `n == 0` or `p` is outside (0, 1), and
/// with `FilterTooLarge` when the derived `m` exceeds [`MAX_FILTER_BITS`].
pub fn calculate_optimal_parameters(
    expected_elements: u64,
    target_fpr: f64,
) -> Result<FilterParams, FilterError> {
    validate_inputs(expected_elements, target_fpr)?;

    let n = expected_elements as f64;
    let m = (-n * target_fpr.ln() / (LN_2 * LN_2)).ceil();

    if m > MAX_FILTER_BITS as f64 {
        return Err(FilterError::FilterTooLarge {
            size: m as u64,
            max: MAX_FILTER_BITS,
        });
    }

    let m = (m as usize).max(1);
    let k = ((m as f64 / n) * LN_2).ceil() as usize;
    let k = k.max(1);

    Ok(FilterParams {
        size_bits: m,
        hash_count: k,
        expected_fpr: calculate_fpr(k, n / m as f64),
    })
}

/// False positive rate for `k` hash functions at load `x`
///
/// Formula: FPR = (1 - e^(-k*x))^k
pub fn calculate_fpr(k: usize, load: f64) -> f64 {
    if load <= 0.0 {
        return 0.0;
    }
    let exponent = -(k as f64) * load;
    (1.0 - exponent.exp()).powi(k as i32)
}
