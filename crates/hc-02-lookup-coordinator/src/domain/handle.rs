//! Handle validation and normalization
//!
//! Accepted grammar: ASCII letters, digits and underscore, 3 to 20 characters.
//! Handles are case-insensitive; the canonical form is lower-case and is the
//! form used for filter, cache and store lookups alike.

use std::fmt;

use crate::error::CoordinatorError;

/// Minimum handle length
pub const MIN_HANDLE_LEN: usize = 3;
/// Maximum handle length
pub const MAX_HANDLE_LEN: usize = 20;

/// A validated, normalized handle
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(String);

impl Handle {
    /// Validate and normalize raw input
    ///
    /// Fails with `InvalidFormat` before any lookup is attempted.
    pub fn parse(input: &str) -> Result<Self, CoordinatorError> {
        let len = input.chars().count();
        if !(MIN_HANDLE_LEN..=MAX_HANDLE_LEN).contains(&len) {
            return Err(CoordinatorError::InvalidFormat(format!(
                "length must be {}-{} characters, got {}",
                MIN_HANDLE_LEN, MAX_HANDLE_LEN, len
            )));
        }

        if let Some(bad) = input
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(CoordinatorError::InvalidFormat(format!(
                "invalid character {:?}: only letters, digits and '_' are allowed",
                bad
            )));
        }

        Ok(Self(input.to_ascii_lowercase()))
    }

    /// Canonical (lower-case) form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
