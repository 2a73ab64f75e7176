//! Request options and outcomes of the tiered lookup

use serde::{Deserialize, Serialize};

/// Which tier answered an availability check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupSource {
    /// The filter reported "definitely absent"
    Filter,
    /// A cached authoritative answer
    Cache,
    /// The authoritative store
    Store,
    /// The authoritative store, filter bypassed on request
    ForcedStore,
}

/// Options for an availability check
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Skip the filter tier and always consult cache/store
    pub force_bypass_filter: bool,
}

impl CheckOptions {
    /// Options that skip the filter
    pub fn bypass_filter() -> Self {
        Self {
            force_bypass_filter: true,
        }
    }
}

/// Result of an availability check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    pub source: LookupSource,
}

/// Successful outcomes of a registration attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterOutcome {
    /// The store accepted the handle
    Created,
    /// The store already held the handle
    Conflict,
}

/// Filter population state
///
/// Only a `Ready` filter may short-circuit a check: a partially populated
/// filter would answer "definitely absent" for handles that are taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarmupState {
    /// Not populated; checks bypass the filter
    Cold,
    /// Population in progress; checks bypass the filter
    Warming,
    /// Populated from the store or a snapshot
    Ready,
}

impl WarmupState {
    pub fn is_ready(self) -> bool {
        matches!(self, WarmupState::Ready)
    }
}
