//! Record identity and the board-record capability contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Record identifier using UUIDv7 for timestamp-sortable IDs.
/// Identity is immutable and globally unique across all partitions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a new UUIDv7 record id (timestamp-sortable).
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Bound alias for partition keys (one status column of a board).
pub trait PartitionKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> PartitionKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Capability contract every board record variant implements.
///
/// The engine operates polymorphically over this trait: it never inspects
/// board-specific fields beyond what the contract exposes. A record belongs
/// to exactly one partition at any instant; `partition_key` names it and
/// `set_partition_key` reassigns it during a move.
///
/// Implementations must:
/// - Keep `record_id` stable for the lifetime of the record
/// - Treat `apply_patch` as a merge: unset patch fields leave the record
///   untouched
/// - Answer `has_field` for every field name a transition rule may require
pub trait BoardRecord: Clone + fmt::Debug + Send + Sync + 'static {
    /// Partition key type (the status/stage enum of the board).
    type Key: PartitionKey;
    /// Board-specific partial update. All fields optional.
    type Patch: Clone + fmt::Debug + Send + Sync + 'static;

    /// Globally unique, immutable identity.
    fn record_id(&self) -> RecordId;

    /// The partition this record currently belongs to.
    fn partition_key(&self) -> Self::Key;

    /// Reassign the record to another partition.
    fn set_partition_key(&mut self, key: Self::Key);

    /// Merge a partial update into the record in place.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Whether the named field currently holds a usable value.
    /// Used by transition rules to gate partition entry.
    fn has_field(&self, field: &str) -> bool;

    /// When the record was created.
    fn created_at(&self) -> Timestamp;
}

/// The unit of work handed to a mutation service for persistence.
///
/// A move carries its optional field patch so that partition change and
/// field population commit as one logical operation.
#[derive(Debug, Clone)]
pub enum Mutation<R: BoardRecord> {
    /// Update fields in place.
    Edit { patch: R::Patch },
    /// Reassign to another partition, optionally patching fields supplied
    /// to satisfy a transition rule.
    Move {
        to: R::Key,
        patch: Option<R::Patch>,
    },
    /// Remove the record.
    Delete,
}

impl<R: BoardRecord> Mutation<R> {
    /// Operation kind for notifications.
    pub fn kind(&self) -> crate::event::OpKind {
        match self {
            Mutation::Edit { .. } => crate::event::OpKind::Edit,
            Mutation::Move { .. } => crate::event::OpKind::Move,
            Mutation::Delete => crate::event::OpKind::Delete,
        }
    }
}

/// Rollback state for an unsettled optimistic mutation.
///
/// Created the instant a local update is applied, removed the instant the
/// last outstanding commit settles. A newer mutation on the same record
/// before the prior settles supersedes the attempt but keeps the original
/// pre-mutation snapshot, so rollback always restores the true original.
#[derive(Debug, Clone)]
pub struct PendingMutation<R: BoardRecord> {
    /// The record exactly as it was before the first unsettled mutation.
    pub original: R,
    /// Item index the record occupied in its origin partition.
    pub origin_index: usize,
    /// Commits dispatched and not yet settled.
    pub unsettled: u32,
    /// Monotonic id of the most recent attempt on this record.
    pub latest_attempt: u64,
}

impl<R: BoardRecord> PendingMutation<R> {
    /// Open a pending entry for a record about to be mutated.
    pub fn open(original: R, origin_index: usize, attempt: u64) -> Self {
        Self {
            original,
            origin_index,
            unsettled: 1,
            latest_attempt: attempt,
        }
    }

    /// Partition the original snapshot belonged to.
    pub fn origin_key(&self) -> R::Key {
        self.original.partition_key()
    }

    /// Record a newer attempt superseding (not stacking on) this entry.
    pub fn supersede(&mut self, attempt: u64) {
        self.unsettled += 1;
        self.latest_attempt = attempt;
    }
}
