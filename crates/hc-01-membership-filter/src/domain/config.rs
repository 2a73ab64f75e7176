//! Filter configuration and validation

use serde::{Deserialize, Serialize};

use super::parameters::{calculate_optimal_parameters, FilterParams};
use crate::error::FilterError;

/// Default sizing: one million handles at a 0.1% false positive rate
pub const DEFAULT_EXPECTED_ELEMENTS: u64 = 1_000_000;
pub const DEFAULT_TARGET_FPR: f64 = 0.001;

/// Construction parameters for a `ProbabilisticFilter`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Expected number of distinct keys (n)
    pub expected_element_count: u64,
    /// Target false positive rate (p), strictly between 0 and 1
    pub target_false_positive_rate: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_element_count: DEFAULT_EXPECTED_ELEMENTS,
            target_false_positive_rate: DEFAULT_TARGET_FPR,
        }
    }
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(expected_element_count: u64, target_false_positive_rate: f64) -> Result<Self, FilterError> {
        let config = Self {
            expected_element_count,
            target_false_positive_rate,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Sizing is checked as well, so an oversized filter is rejected here
    /// rather than at allocation time.
    pub fn validate(&self) -> Result<(), FilterError> {
        self.params().map(|_| ())
    }

    /// Derived m and k for this configuration
    pub fn params(&self) -> Result<FilterParams, FilterError> {
        calculate_optimal_parameters(self.expected_element_count, self.target_false_positive_rate)
    }

    /// Builder-style method to set expected elements
    pub fn with_expected_elements(mut self, n: u64) -> Self {
        self.expected_element_count = n;
        self
    }

    /// Builder-style method to set target FPR
    pub fn with_target_fpr(mut self, fpr: f64) -> Self {
        self.target_false_positive_rate = fpr;
        self
    }
}
