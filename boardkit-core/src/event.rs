//! Notifications and move outcomes
//!
//! The engine reports settled outcomes through a fire-and-forget
//! notification sink; payloads carry enough detail (record id, operation
//! kind, reason) for the presentation layer to build a human-readable
//! message. Gated moves resolve through [`MoveOutcome`] instead: a blocked
//! transition is a deferred, user-resolvable state, not an error.

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// What a settled operation was doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Edit,
    Move,
    Delete,
}

/// Fire-and-forget notification of an engine outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent<K> {
    /// A commit settled successfully.
    CommitSucceeded { record_id: RecordId, op: OpKind },
    /// A commit failed; the record was rolled back to its pre-mutation
    /// snapshot.
    CommitFailed {
        record_id: RecordId,
        op: OpKind,
        reason: String,
    },
    /// A page fetch failed; partition state is unchanged and retryable.
    FetchFailed { partition: K, reason: String },
    /// Every partition was reset and reloaded (filter change or refresh).
    Reloaded,
}

/// Resolution of a requested partition move.
///
/// `PreconditionRequired` is the first half of the two-phase protocol: the
/// caller prompts the user for the missing fields and re-invokes the move
/// with a patch supplying them, or does nothing on cancel (in which case no
/// state was changed and no commit was dispatched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Move applied locally and a commit dispatched.
    Committed,
    /// Target partition requires fields the record lacks; nothing changed.
    PreconditionRequired { missing: Vec<String> },
    /// Record already lives in the target partition; nothing to do.
    AlreadyThere,
}

impl MoveOutcome {
    /// Whether the move went through.
    pub fn is_committed(&self) -> bool {
        matches!(self, MoveOutcome::Committed)
    }
}
