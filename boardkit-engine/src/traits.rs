//! Collaborator traits consumed by the engine
//!
//! The engine never talks to a transport, a persistence layer, or a UI
//! runtime directly. Everything cross-cutting arrives through these seams,
//! which keeps the core testable without a running application.

use std::time::Duration;

use async_trait::async_trait;
use boardkit_core::{BoardEvent, BoardRecord, CommitError, FetchError, Mutation, Page, RecordId};

/// Remote source of record pages for one board.
///
/// Must be safe to call repeatedly with the same cursor (idempotent read).
#[async_trait]
pub trait DataSource<R: BoardRecord, F>: Send + Sync {
    /// Fetch one page of a partition under the given filter criteria.
    async fn fetch_page(
        &self,
        key: &R::Key,
        cursor: u64,
        page_size: usize,
        filters: &F,
    ) -> Result<Page<R>, FetchError>;
}

/// Persists record mutations.
///
/// A successful commit may carry a server-corrected record which the engine
/// adopts in place of the optimistic local value.
#[async_trait]
pub trait MutationService<R: BoardRecord>: Send + Sync {
    async fn commit(
        &self,
        record_id: RecordId,
        mutation: &Mutation<R>,
    ) -> Result<Option<R>, CommitError>;
}

/// Fire-and-forget outcome reporting for user feedback.
pub trait NotificationSink<K>: Send + Sync {
    fn notify(&self, event: BoardEvent<K>);
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<K> NotificationSink<K> for NullSink {
    fn notify(&self, _event: BoardEvent<K>) {}
}

/// Time source for the debounce window.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer (respects paused time in tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
