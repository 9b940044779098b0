//! Optimistic mutation coordination
//!
//! A mutation is applied to local state synchronously, before the server
//! confirms it; the caller observes the patched value the moment the
//! intent method returns. The commit settles in a spawned task. On
//! failure the record converges back to its pre-mutation snapshot with no
//! intermediate state, found by id across all partitions in case it moved
//! or was deleted in the meantime.

use std::sync::Arc;

use boardkit_core::{BoardEvent, BoardRecord, BoardResult, EngineError, Mutation, RecordId};

use crate::board::{BoardHandle, Inner};

impl<R, F> BoardHandle<R, F>
where
    R: BoardRecord,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Patch a record in place and commit asynchronously.
    ///
    /// Returns once the local state shows the patched value; rollback on
    /// commit failure is reported through the notification sink.
    pub fn edit(&self, id: RecordId, patch: R::Patch) -> BoardResult<()> {
        let attempt = {
            let mut state = self.inner.lock_state();
            let Some(attempt) = state.open_attempt(id) else {
                return Err(EngineError::RecordNotFound { id });
            };
            state.apply_edit(id, &patch);
            attempt
        };
        tracing::debug!(%id, attempt, "edit applied locally");
        spawn_commit(Arc::clone(&self.inner), id, attempt, Mutation::Edit { patch });
        Ok(())
    }

    /// Remove a record optimistically and commit the deletion.
    ///
    /// A failed commit reinserts the record at its origin position.
    pub fn delete(&self, id: RecordId) -> BoardResult<()> {
        let attempt = {
            let mut state = self.inner.lock_state();
            let Some(attempt) = state.open_attempt(id) else {
                return Err(EngineError::RecordNotFound { id });
            };
            state.apply_remove(id);
            attempt
        };
        tracing::debug!(%id, attempt, "delete applied locally");
        spawn_commit(Arc::clone(&self.inner), id, attempt, Mutation::Delete);
        Ok(())
    }

    /// Insert an externally-created record at the head of its partition
    /// (most-recent-first). No commit is dispatched: the record already
    /// exists upstream. If the record is already visible it is replaced
    /// in place instead.
    pub fn insert(&self, record: R) -> BoardResult<()> {
        let key = record.partition_key();
        let inserted = self.inner.lock_state().insert_record(record);
        if inserted {
            Ok(())
        } else {
            Err(EngineError::UnknownPartition {
                key: format!("{key:?}"),
            })
        }
    }
}

/// Dispatch a commit and settle it against board state when it resolves.
pub(crate) fn spawn_commit<R, F>(
    inner: Arc<Inner<R, F>>,
    id: RecordId,
    attempt: u64,
    mutation: Mutation<R>,
) where
    R: BoardRecord,
    F: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let op = mutation.kind();
        let result = inner.mutations.commit(id, &mutation).await;
        match result {
            Ok(server_record) => {
                {
                    inner.lock_state().settle_ok(id, attempt, server_record);
                }
                tracing::debug!(%id, attempt, ?op, "commit settled");
                inner
                    .sink
                    .notify(BoardEvent::CommitSucceeded { record_id: id, op });
            }
            Err(err) => {
                let rolled_back = {
                    inner.lock_state().settle_err(id).is_some()
                };
                tracing::warn!(%id, attempt, ?op, error = %err, rolled_back, "commit failed");
                inner.sink.notify(BoardEvent::CommitFailed {
                    record_id: id,
                    op,
                    reason: err.to_string(),
                });
            }
        }
    });
}
