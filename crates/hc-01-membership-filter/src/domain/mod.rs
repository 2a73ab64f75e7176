//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Probabilistic filter implementation
//! - Hash functions (double hashing over MurmurHash3)
//! - Parameter calculations
//! - Configuration
//! - Snapshot encoding
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod config;
pub mod hash_functions;
pub mod parameters;
pub mod probabilistic_filter;
pub mod snapshot;

pub use config::FilterConfig;
pub use parameters::{calculate_optimal_parameters, FilterParams};
pub use probabilistic_filter::{FilterStats, ProbabilisticFilter};
