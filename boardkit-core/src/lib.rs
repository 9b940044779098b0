//! boardkit Core - Board State Data Types
//!
//! Pure data structures with no engine behavior. All other crates depend on
//! this. A board is a collection of business records displayed as
//! status-partitioned columns; this crate defines the records, the
//! partitions they live in, and the bookkeeping types the engine uses to
//! keep them consistent (pending mutations, filter criteria, configuration,
//! errors, notifications).

pub mod boards;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod partition;
pub mod record;

pub use boards::{
    Candidate, CandidatePatch, CandidateStage, Lead, LeadPatch, LeadStage, TaskCard, TaskPatch,
    TaskStatus,
};
pub use config::{BoardConfig, TransitionRule};
pub use error::{BoardResult, CommitError, EngineError, FetchError};
pub use event::{BoardEvent, MoveOutcome, OpKind};
pub use filter::{FilterExpr, FilterOperator, FilterSet};
pub use partition::{Page, Partition, PartitionSnapshot};
pub use record::{BoardRecord, Mutation, PartitionKey, PendingMutation, RecordId, Timestamp};
