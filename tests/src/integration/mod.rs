//! # Integration Tests
//!
//! - `flows`: warm-up, registration, snapshot restart and race scenarios

pub mod flows;
