//! Incremental pagination
//!
//! Page loads for a single partition are strictly sequential: `load_more`
//! refuses to run while a load is in flight, and a reset supersedes any
//! outstanding fetch by bumping the partition epoch. A response issued
//! under an older epoch is stale and silently discarded, never applied.

use futures_util::future::join_all;

use boardkit_core::{BoardEvent, BoardRecord, BoardResult, EngineError};

use crate::board::BoardHandle;

impl<R, F> BoardHandle<R, F>
where
    R: BoardRecord,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Load (or reload) the first page of one partition, superseding any
    /// load currently in flight for it.
    pub async fn load_first_page(&self, key: &R::Key) -> BoardResult<()> {
        let epoch = {
            let mut state = self.inner.lock_state();
            match state.partition_mut(key) {
                Some(partition) => partition.begin_reset(),
                None => {
                    return Err(EngineError::UnknownPartition {
                        key: format!("{key:?}"),
                    })
                }
            }
        };
        let filters = self.inner.applied_filters();
        let result = self
            .inner
            .source
            .fetch_page(key, 0, self.inner.config.page_size, &filters)
            .await;

        let mut state = self.inner.lock_state();
        let Some(partition) = state.partition_mut(key) else {
            return Ok(());
        };
        if partition.epoch() != epoch {
            tracing::warn!(key = ?key, "discarding stale first page");
            return Ok(());
        }
        match result {
            Ok(page) => {
                partition.finish_reset(page);
                tracing::debug!(key = ?key, len = partition.len(), "first page loaded");
                Ok(())
            }
            Err(err) => {
                partition.fail_load();
                drop(state);
                tracing::warn!(key = ?key, error = %err, "first page load failed");
                self.inner.sink.notify(BoardEvent::FetchFailed {
                    partition: key.clone(),
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Load the next page of one partition.
    ///
    /// A no-op while a load is in flight or the partition is exhausted
    /// (re-entrancy and exhaustion guards).
    pub async fn load_more(&self, key: &R::Key) -> BoardResult<()> {
        let (cursor, epoch) = {
            let mut state = self.inner.lock_state();
            let partition = match state.partition_mut(key) {
                Some(partition) => partition,
                None => {
                    return Err(EngineError::UnknownPartition {
                        key: format!("{key:?}"),
                    })
                }
            };
            if !partition.begin_load() {
                tracing::debug!(key = ?key, "load_more ignored (loading or exhausted)");
                return Ok(());
            }
            (partition.cursor(), partition.epoch())
        };
        let filters = self.inner.applied_filters();
        let result = self
            .inner
            .source
            .fetch_page(key, cursor, self.inner.config.page_size, &filters)
            .await;

        let mut state = self.inner.lock_state();
        let Some(partition) = state.partition_mut(key) else {
            return Ok(());
        };
        if partition.epoch() != epoch {
            tracing::warn!(key = ?key, "discarding stale page");
            return Ok(());
        }
        match result {
            Ok(page) => {
                let appended = partition.merge_page(page);
                tracing::debug!(key = ?key, appended, len = partition.len(), "page merged");
                Ok(())
            }
            Err(err) => {
                partition.fail_load();
                drop(state);
                tracing::warn!(key = ?key, error = %err, "page load failed");
                self.inner.sink.notify(BoardEvent::FetchFailed {
                    partition: key.clone(),
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Reset and reload every partition under the currently applied
    /// filters. Pending mutations are dropped first: after an explicit
    /// refresh the server value is authoritative, and their late
    /// settlements must no-op.
    pub async fn refresh(&self) -> BoardResult<()> {
        {
            self.inner.lock_state().clear_pending();
        }
        let keys = self.inner.lock_state().partition_keys();
        let results = join_all(keys.iter().map(|key| self.load_first_page(key))).await;
        self.inner.sink.notify(BoardEvent::Reloaded);
        results.into_iter().collect::<BoardResult<Vec<_>>>()?;
        Ok(())
    }

    /// Initial load of every partition.
    pub async fn start(&self) -> BoardResult<()> {
        self.refresh().await
    }
}
