//! # HC-01 Membership Filter
//!
//! Space-efficient probabilistic set answering "definitely absent" or
//! "possibly present" for handle keys.
//!
//! ## Architecture
//!
//! This crate is the pure domain layer of the availability system:
//!
//! - `ProbabilisticFilter`: fixed-size bit array with a double-hashing schedule
//! - `FilterConfig`: validated construction parameters (n, p)
//! - `FilterStats`: diagnostic snapshot (fill ratio, estimated FPR)
//! - Snapshot encoding for restart without a full store re-scan
//!
//! No I/O, no async, no logging. Callers that share a filter across threads
//! wrap it in a lock (see `hc-02-lookup-coordinator`).
//!
//! ## Invariants
//!
//! - **No false negatives**: after `add(key)` returns, `might_contain(key)` is
//!   true until the filter is discarded.
//! - **Monotonic bits**: a set bit is never cleared.
//! - **Derived sizing**: `m = ceil(-n*ln(p) / ln(2)^2)`, `k = ceil((m/n)*ln(2))`.
//!
//! ## Usage Example
//!
//! ```ignore
//! use hc_01_membership_filter::ProbabilisticFilter;
//!
//! let mut filter = ProbabilisticFilter::new(1_000_000, 0.001)?;
//! filter.add("alice");
//!
//! assert!(filter.might_contain("Alice"));
//!
//! let bytes = filter.to_snapshot_bytes()?;
//! let restored = ProbabilisticFilter::from_snapshot_bytes(&bytes)?;
//! assert_eq!(restored, filter);
//! ```

pub mod domain;
pub mod error;

pub use domain::{
    calculate_optimal_parameters, FilterConfig, FilterParams, FilterStats, ProbabilisticFilter,
};
pub use error::{FilterError, SnapshotError};
