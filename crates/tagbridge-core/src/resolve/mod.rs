//! Release-specific name resolution
//!
//! Every per-release naming fact lives in the static tables of
//! [`accessor`] and [`class`]. Each entry lists `(since, name)` candidates in
//! ascending order; the running release selects one candidate, which is
//! resolved against the host once and cached in a [`RuntimeContext`].
//! Storage layouts that changed between releases ([`UuidLayout`]) live here
//! too.

pub mod accessor;
pub mod class;
pub mod context;

pub use accessor::{AccessorDescriptor, AccessorId, AccessorTable, Resolution, ResolvedAccessor};
pub use class::{ClassDescriptor, ClassId, ClassTable};
pub use context::RuntimeContext;

use crate::version::VersionToken;

/// Pick the candidate with the highest `since <= running`
///
/// Returns `None` when `running` predates the first candidate or is past
/// `removed_after`. Candidates must be sorted by `since`.
pub fn select_candidate<T: Copy>(
    candidates: &[(VersionToken, T)],
    running: VersionToken,
    removed_after: Option<VersionToken>,
) -> Option<T> {
    if let Some(bound) = removed_after {
        if running > bound {
            return None;
        }
    }
    candidates
        .iter()
        .rev()
        .find(|(since, _)| *since <= running)
        .map(|(_, name)| *name)
}

/// How a release stores the UUID written under one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidLayout {
    /// Two longs, `<key>Most` and `<key>Least`
    SplitLongs,
    /// One four-int array under `<key>`
    IntArray,
}

impl UuidLayout {
    pub fn for_release(version: VersionToken) -> Self {
        if version >= VersionToken::MC1_16_R1 {
            UuidLayout::IntArray
        } else {
            UuidLayout::SplitLongs
        }
    }

    /// Keys of the two halves a split UUID under `key` occupies
    pub fn split_keys(key: &str) -> [String; 2] {
        [format!("{}Most", key), format!("{}Least", key)]
    }
}

/// Counts of a finished resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub loaded: usize,
    pub unloaded: usize,
    pub incompatible: usize,
}
