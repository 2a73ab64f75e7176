//! Error types for the membership filter

use thiserror::Error;

/// Errors raised while constructing or restoring a filter
///
/// Queries never fail: once a filter exists, `add` and `might_contain` are
/// pure arithmetic over a fixed-size structure.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error("Filter size exceeds maximum: {size} > {max} bits")]
    FilterTooLarge { size: u64, max: u64 },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors from decoding a persisted filter snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Not a filter snapshot (bad magic)")]
    BadMagic,

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u16),

    #[error("Checksum mismatch: snapshot is corrupt")]
    ChecksumMismatch,

    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(String),
}
