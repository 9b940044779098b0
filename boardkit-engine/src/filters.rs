//! Filter synchronization
//!
//! Rapid successive filter changes (a user typing into a free-text box)
//! are debounced so each keystroke does not trigger a reload. When the
//! window settles, the latest criteria are compared by value against the
//! last applied criteria; only a real change resets and reloads the
//! partitions. Boards that prefer immediate application configure no
//! debounce window.
//!
//! Supersession is by sequence number: every `set_filters` call bumps the
//! sequence, and a debounce task whose sequence is no longer current
//! simply drops out, discarding the older timer.

use boardkit_core::BoardRecord;

use crate::board::BoardHandle;

impl<R, F> BoardHandle<R, F>
where
    R: BoardRecord,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Stage new filter criteria.
    ///
    /// Returns immediately; the reset-and-reload happens on a spawned task
    /// after the debounce window (if any) settles and only if the criteria
    /// actually changed. Fetch failures during the reload are reported
    /// through the notification sink.
    pub fn set_filters(&self, criteria: F) {
        let seq = {
            let mut filters = self.inner.lock_filters();
            filters.seq += 1;
            filters.pending = Some(criteria);
            filters.seq
        };
        let handle = self.clone();
        tokio::spawn(async move {
            if let Some(window) = handle.inner.config.filter_debounce {
                handle.inner.clock.sleep(window).await;
            }
            handle.apply_pending_filters(seq).await;
        });
    }

    async fn apply_pending_filters(&self, seq: u64) {
        let changed = {
            let mut filters = self.inner.lock_filters();
            if filters.seq != seq {
                // A newer set_filters superseded this timer.
                return;
            }
            let Some(criteria) = filters.pending.take() else {
                return;
            };
            if criteria == filters.applied {
                tracing::debug!("filter criteria unchanged, skipping reload");
                false
            } else {
                filters.applied = criteria;
                true
            }
        };
        if changed {
            tracing::debug!("filter criteria changed, reloading all partitions");
            let _ = self.refresh().await;
        }
    }
}
