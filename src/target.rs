//! The contract between the history engine and the object it edits.

use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::types::SnapshotEncoding;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutable subject whose history is tracked.
///
/// The engine never constructs or owns a target; it borrows one for the
/// duration of each call.
pub trait Target {
    /// Closed set of named mutations this target understands.
    type Kind: Clone + fmt::Debug;

    /// Capture the complete observable state. Must not mutate the target.
    fn capture(&self, encoding: SnapshotEncoding) -> Result<Snapshot>;

    /// Replace the complete observable state with the snapshot's.
    ///
    /// Implementations must leave the target unchanged on error, and calling
    /// this twice with the same snapshot must equal calling it once.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Perform exactly one mutation. Must be a pure function of the current
    /// state, since redo replays it instead of restoring a post-image, and
    /// must leave the target unchanged when it returns an error.
    fn apply(&mut self, kind: &Self::Kind) -> Result<()>;

    /// Whether `kind` is part of this target's capability set.
    fn supports(&self, _kind: &Self::Kind) -> bool {
        true
    }
}

/// A recorded request to apply one mutation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation<K> {
    kind: K,
}

impl<K> Operation<K> {
    pub fn new(kind: K) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn into_kind(self) -> K {
        self.kind
    }
}

impl<K> From<K> for Operation<K> {
    fn from(kind: K) -> Self {
        Operation::new(kind)
    }
}

impl<K: fmt::Display> fmt::Display for Operation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
