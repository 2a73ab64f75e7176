//! # Handle Availability Test Suite
//!
//! Cross-crate flows that exercise the filter, the coordinator and their
//! adapters together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # End-to-end flows over in-memory collaborators
//! └── benches/           # Criterion benchmarks for filter and coordinator
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hc-tests
//! cargo bench -p hc-tests
//! ```

pub mod integration;
