//! boardkit Test Utilities
//!
//! Centralized test infrastructure for the boardkit workspace:
//! - In-memory and manually-resolved mock collaborators
//! - A recording notification sink with async waiting
//! - Deterministic record fixtures
//!
//! The manual mocks (`ManualDataSource`, `ManualMutationService`) park each
//! call on a oneshot channel until the test resolves it, which makes
//! in-flight interleavings (stale responses, overlapping commits)
//! deterministic without sleeping.

use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

use boardkit_engine::{Clock, DataSource, MutationService, NotificationSink};

// Re-export core types for convenience
pub use boardkit_core::{
    BoardConfig, BoardEvent, BoardRecord, BoardResult, Candidate, CandidateStage, CommitError,
    EngineError, FetchError, FilterSet, Lead, LeadPatch, LeadStage, MoveOutcome, Mutation, OpKind,
    Page, RecordId, TaskCard, TaskPatch, TaskStatus, TransitionRule,
};

// ============================================================================
// FIXTURES
// ============================================================================

/// Deterministic record id derived from a small integer.
pub fn record_id(n: u128) -> RecordId {
    RecordId::from_uuid(Uuid::from_u128(n))
}

/// Deterministic lead fixture.
pub fn lead(n: u128, stage: LeadStage) -> Lead {
    let mut lead = Lead::new(&format!("company-{n}"), stage);
    lead.lead_id = record_id(n);
    lead
}

/// A run of deterministic leads with ids `start..start + count`.
pub fn leads(start: u128, count: u128, stage: LeadStage) -> Vec<Lead> {
    (start..start + count).map(|n| lead(n, stage)).collect()
}

/// Deterministic task fixture.
pub fn task(n: u128, status: TaskStatus) -> TaskCard {
    let mut card = TaskCard::new(&format!("task-{n}"), status);
    card.task_id = record_id(n);
    card
}

// ============================================================================
// DATA SOURCES
// ============================================================================

/// Dataset-backed data source answering immediately.
///
/// Serves offset-cursor pages out of a per-partition vector, counts
/// fetches, remembers the last filter criteria it saw, and can fail the
/// next fetch on demand.
pub struct InMemoryDataSource<R: BoardRecord, F = FilterSet> {
    data: Mutex<HashMap<R::Key, Vec<R>>>,
    fail_next: Mutex<Option<FetchError>>,
    fetch_count: AtomicUsize,
    last_filters: Mutex<Option<F>>,
}

impl<R: BoardRecord, F> InMemoryDataSource<R, F> {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
            fetch_count: AtomicUsize::new(0),
            last_filters: Mutex::new(None),
        }
    }

    /// Seed one partition's dataset.
    pub fn with_partition(self, key: R::Key, records: Vec<R>) -> Self {
        self.set_records(key, records);
        self
    }

    /// Replace one partition's dataset.
    pub fn set_records(&self, key: R::Key, records: Vec<R>) {
        self.data.lock().unwrap().insert(key, records);
    }

    /// Fail the next fetch with the given error.
    pub fn fail_next(&self, error: FetchError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    /// Total fetches served (including failures).
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl<R: BoardRecord, F: Clone> InMemoryDataSource<R, F> {
    /// The filter criteria of the most recent fetch.
    pub fn last_filters(&self) -> Option<F> {
        self.last_filters.lock().unwrap().clone()
    }
}

impl<R: BoardRecord, F> Default for InMemoryDataSource<R, F> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R, F> DataSource<R, F> for InMemoryDataSource<R, F>
where
    R: BoardRecord,
    F: Clone + Send + Sync + 'static,
{
    async fn fetch_page(
        &self,
        key: &R::Key,
        cursor: u64,
        page_size: usize,
        filters: &F,
    ) -> Result<Page<R>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        *self.last_filters.lock().unwrap() = Some(filters.clone());
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }
        let data = self.data.lock().unwrap();
        let records = data.get(key).cloned().unwrap_or_default();
        let start = (cursor as usize).min(records.len());
        let end = (start + page_size).min(records.len());
        Ok(Page {
            items: records[start..end].to_vec(),
            total_count: records.len() as u64,
            has_more: end < records.len(),
        })
    }
}

/// A fetch parked until the test resolves it.
pub struct PendingFetch<R: BoardRecord> {
    pub key: R::Key,
    pub cursor: u64,
    pub page_size: usize,
    tx: oneshot::Sender<Result<Page<R>, FetchError>>,
}

/// Data source whose fetches block until explicitly resolved, FIFO.
pub struct ManualDataSource<R: BoardRecord> {
    calls: Mutex<VecDeque<PendingFetch<R>>>,
    seen: AtomicUsize,
    notify: Notify,
}

impl<R: BoardRecord> ManualDataSource<R> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(VecDeque::new()),
            seen: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    /// Fetches issued so far (resolved or not).
    pub fn calls_seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }

    /// Fetches currently parked.
    pub fn pending(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Wait until at least `n` fetches have been issued.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.calls_seen() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Peek at the oldest parked fetch without resolving it.
    pub fn next_call(&self) -> Option<(R::Key, u64)> {
        self.calls
            .lock()
            .unwrap()
            .front()
            .map(|call| (call.key.clone(), call.cursor))
    }

    /// Resolve the oldest parked fetch, returning its key and cursor.
    pub fn resolve_next(&self, result: Result<Page<R>, FetchError>) -> Option<(R::Key, u64)> {
        let call = self.calls.lock().unwrap().pop_front()?;
        let info = (call.key.clone(), call.cursor);
        let _ = call.tx.send(result);
        Some(info)
    }
}

impl<R: BoardRecord> Default for ManualDataSource<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R, F> DataSource<R, F> for ManualDataSource<R>
where
    R: BoardRecord,
    F: Send + Sync + 'static,
{
    async fn fetch_page(
        &self,
        key: &R::Key,
        cursor: u64,
        page_size: usize,
        _filters: &F,
    ) -> Result<Page<R>, FetchError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push_back(PendingFetch {
            key: key.clone(),
            cursor,
            page_size,
            tx,
        });
        self.seen.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
        rx.await.unwrap_or_else(|_| {
            Err(FetchError::Unavailable {
                reason: "fetch dropped".to_string(),
            })
        })
    }
}

// ============================================================================
// MUTATION SERVICES
// ============================================================================

/// A commit parked until the test resolves it.
pub struct PendingCommit<R: BoardRecord> {
    pub record_id: RecordId,
    pub mutation: Mutation<R>,
    tx: oneshot::Sender<Result<Option<R>, CommitError>>,
}

/// Mutation service whose commits block until explicitly resolved, FIFO.
pub struct ManualMutationService<R: BoardRecord> {
    calls: Mutex<VecDeque<PendingCommit<R>>>,
    seen: AtomicUsize,
    notify: Notify,
}

impl<R: BoardRecord> ManualMutationService<R> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(VecDeque::new()),
            seen: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    /// Commits issued so far (resolved or not).
    pub fn calls_seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }

    /// Commits currently parked.
    pub fn pending(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Wait until at least `n` commits have been issued.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.calls_seen() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Peek at the oldest parked commit without resolving it.
    pub fn next_call(&self) -> Option<(RecordId, Mutation<R>)> {
        self.calls
            .lock()
            .unwrap()
            .front()
            .map(|call| (call.record_id, call.mutation.clone()))
    }

    /// Resolve the oldest parked commit, returning its record id and kind.
    pub fn resolve_next(
        &self,
        result: Result<Option<R>, CommitError>,
    ) -> Option<(RecordId, OpKind)> {
        let call = self.calls.lock().unwrap().pop_front()?;
        let info = (call.record_id, call.mutation.kind());
        let _ = call.tx.send(result);
        Some(info)
    }
}

impl<R: BoardRecord> Default for ManualMutationService<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: BoardRecord> MutationService<R> for ManualMutationService<R> {
    async fn commit(
        &self,
        record_id: RecordId,
        mutation: &Mutation<R>,
    ) -> Result<Option<R>, CommitError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push_back(PendingCommit {
            record_id,
            mutation: mutation.clone(),
            tx,
        });
        self.seen.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
        rx.await.unwrap_or_else(|_| {
            Err(CommitError::ConnectionLost {
                reason: "commit dropped".to_string(),
            })
        })
    }
}

/// Mutation service that immediately accepts everything.
pub struct OkMutationService<R: BoardRecord> {
    commits: Mutex<Vec<(RecordId, OpKind)>>,
    _marker: PhantomData<fn(R)>,
}

impl<R: BoardRecord> OkMutationService<R> {
    pub fn new() -> Self {
        Self {
            commits: Mutex::new(Vec::new()),
            _marker: PhantomData,
        }
    }

    pub fn commit_count(&self) -> usize {
        self.commits.lock().unwrap().len()
    }

    pub fn commits(&self) -> Vec<(RecordId, OpKind)> {
        self.commits.lock().unwrap().clone()
    }
}

impl<R: BoardRecord> Default for OkMutationService<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: BoardRecord> MutationService<R> for OkMutationService<R> {
    async fn commit(
        &self,
        record_id: RecordId,
        mutation: &Mutation<R>,
    ) -> Result<Option<R>, CommitError> {
        self.commits.lock().unwrap().push((record_id, mutation.kind()));
        Ok(None)
    }
}

/// Mutation service that immediately rejects everything.
pub struct FailingMutationService<R: BoardRecord> {
    commits: Mutex<Vec<(RecordId, OpKind)>>,
    _marker: PhantomData<fn(R)>,
}

impl<R: BoardRecord> FailingMutationService<R> {
    pub fn new() -> Self {
        Self {
            commits: Mutex::new(Vec::new()),
            _marker: PhantomData,
        }
    }

    pub fn commit_count(&self) -> usize {
        self.commits.lock().unwrap().len()
    }
}

impl<R: BoardRecord> Default for FailingMutationService<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: BoardRecord> MutationService<R> for FailingMutationService<R> {
    async fn commit(
        &self,
        record_id: RecordId,
        mutation: &Mutation<R>,
    ) -> Result<Option<R>, CommitError> {
        self.commits.lock().unwrap().push((record_id, mutation.kind()));
        Err(CommitError::Rejected {
            code: "mock".to_string(),
            message: "scripted failure".to_string(),
        })
    }
}

// ============================================================================
// SINK AND CLOCK
// ============================================================================

/// Notification sink that records every event and wakes waiting tests.
pub struct RecordingSink<K> {
    events: Mutex<Vec<BoardEvent<K>>>,
    notify: Notify,
}

impl<K: Clone> RecordingSink<K> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Everything notified so far.
    pub fn events(&self) -> Vec<BoardEvent<K>> {
        self.events.lock().unwrap().clone()
    }

    /// Wait until at least `n` events have been notified.
    pub async fn wait_for_events(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.events.lock().unwrap().len() >= n {
                return;
            }
            notified.await;
        }
    }
}

impl<K: Clone> Default for RecordingSink<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Send> NotificationSink<K> for RecordingSink<K> {
    fn notify(&self, event: BoardEvent<K>) {
        self.events.lock().unwrap().push(event);
        self.notify.notify_waiters();
    }
}

/// Clock whose sleeps complete immediately (debounce becomes a yield).
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantClock;

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {}
}
