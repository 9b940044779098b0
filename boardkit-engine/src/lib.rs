//! boardkit Engine - Partitioned Board State
//!
//! The state-management engine behind status-partitioned kanban boards and
//! hybrid-pagination record tables. It stores records in named partitions,
//! loads each partition incrementally from a [`DataSource`], applies local
//! mutations immediately and reconciles them against asynchronous commit
//! results, gates partition moves behind precondition rules, and resets and
//! reloads when filter criteria change.
//!
//! # Guarantees
//!
//! - A record id appears in exactly one partition's items at all times,
//!   even transiently during a gated move.
//! - Page loads for one partition are strictly sequential; stale responses
//!   superseded by a reset are discarded, never applied.
//! - A caller observing the read model right after an intent method
//!   returns sees the optimistic value; a failed commit converges the
//!   record back to its pre-mutation snapshot, including partition
//!   placement.
//! - Overlapping mutations on one record chain their snapshots: rollback
//!   always restores the true original, never an intermediate value.
//!
//! # Collaborators
//!
//! The engine is UI-agnostic. Rendering, dialogs, transport, and toasts
//! live behind the [`DataSource`], [`MutationService`],
//! [`NotificationSink`], and [`Clock`] traits; precondition prompts use the
//! two-phase [`MoveOutcome`] protocol.

mod board;
mod filters;
mod gate;
mod mutation;
mod pagination;
mod state;
mod traits;

pub use board::{BoardBuilder, BoardHandle};
pub use traits::{Clock, DataSource, MutationService, NotificationSink, NullSink, TokioClock};

// Re-export core types for convenience
pub use boardkit_core::{
    BoardConfig, BoardEvent, BoardRecord, BoardResult, Candidate, CandidatePatch, CandidateStage,
    CommitError, EngineError, FetchError, FilterExpr, FilterOperator, FilterSet, Lead, LeadPatch,
    LeadStage, MoveOutcome, Mutation, OpKind, Page, Partition, PartitionSnapshot, RecordId,
    TaskCard, TaskPatch, TaskStatus, Timestamp, TransitionRule,
};
