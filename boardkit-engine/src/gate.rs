//! Gated partition transitions
//!
//! A drag gesture resolves to "move this record to that partition". Some
//! target partitions require data the record may not have yet; those moves
//! are intercepted and resolved through a two-phase protocol:
//!
//! 1. `move_record` returns [`MoveOutcome::PreconditionRequired`] naming
//!    the missing fields; no state changed, no commit was dispatched.
//! 2. The caller prompts the user and re-invokes
//!    `move_record_with_fields` with a patch supplying them. The partition
//!    swap and the field patch apply as one atomic local update and commit
//!    as one logical operation. On cancel the caller simply does nothing.

use std::sync::Arc;

use boardkit_core::{BoardRecord, BoardResult, EngineError, MoveOutcome, Mutation, RecordId};

use crate::board::BoardHandle;
use crate::mutation::spawn_commit;

impl<R, F> BoardHandle<R, F>
where
    R: BoardRecord,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Request a move without supplied fields.
    pub fn move_record(&self, id: RecordId, to: R::Key) -> BoardResult<MoveOutcome> {
        self.move_record_with_fields(id, to, None)
    }

    /// Request a move, optionally carrying fields collected to satisfy the
    /// target partition's precondition.
    pub fn move_record_with_fields(
        &self,
        id: RecordId,
        to: R::Key,
        patch: Option<R::Patch>,
    ) -> BoardResult<MoveOutcome> {
        let attempt = {
            let mut state = self.inner.lock_state();
            let Some(record) = state.record(id) else {
                return Err(EngineError::RecordNotFound { id });
            };
            if record.partition_key() == to {
                return Ok(MoveOutcome::AlreadyThere);
            }
            if state.partition(&to).is_none() {
                return Err(EngineError::UnknownPartition {
                    key: format!("{to:?}"),
                });
            }
            if let Some(rule) = self.inner.config.rule_for(&to) {
                let missing = rule.missing_fields(record, patch.as_ref());
                if !missing.is_empty() {
                    tracing::debug!(%id, to = ?to, ?missing, "move blocked on precondition");
                    return Ok(MoveOutcome::PreconditionRequired { missing });
                }
            }
            let Some(attempt) = state.open_attempt(id) else {
                return Err(EngineError::RecordNotFound { id });
            };
            state.apply_move(id, &to, patch.as_ref());
            attempt
        };
        tracing::debug!(%id, to = ?to, attempt, "move applied locally");
        spawn_commit(
            Arc::clone(&self.inner),
            id,
            attempt,
            Mutation::Move { to, patch },
        );
        Ok(MoveOutcome::Committed)
    }
}
