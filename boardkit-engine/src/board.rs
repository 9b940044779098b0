//! Board handle: the façade the presentation layer depends on
//!
//! A [`BoardHandle`] aggregates the pagination, mutation, gating, and
//! filter controllers behind one cheaply-cloneable object exposing the
//! read model and the intent methods. All state lives behind a lock that
//! is never held across an await; collaborators are injected as trait
//! objects so the engine runs without any UI runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use boardkit_core::{
    BoardConfig, BoardRecord, BoardResult, EngineError, FilterSet, PartitionSnapshot, RecordId,
};

use crate::state::BoardState;
use crate::traits::{Clock, DataSource, MutationService, NotificationSink, NullSink, TokioClock};

pub(crate) struct FilterState<F> {
    pub(crate) applied: F,
    pub(crate) pending: Option<F>,
    pub(crate) seq: u64,
}

pub(crate) struct Inner<R: BoardRecord, F> {
    pub(crate) state: Mutex<BoardState<R>>,
    pub(crate) filters: Mutex<FilterState<F>>,
    pub(crate) source: Arc<dyn DataSource<R, F>>,
    pub(crate) mutations: Arc<dyn MutationService<R>>,
    pub(crate) sink: Arc<dyn NotificationSink<R::Key>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: BoardConfig<R::Key>,
}

impl<R: BoardRecord, F> Inner<R, F> {
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, BoardState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_filters(&self) -> MutexGuard<'_, FilterState<F>> {
        self.filters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: BoardRecord, F: Clone> Inner<R, F> {
    /// Clone out the currently applied filter criteria.
    pub(crate) fn applied_filters(&self) -> F {
        self.lock_filters().applied.clone()
    }
}

/// Handle to one board's state engine.
///
/// Clones share the same underlying board. Intent methods that dispatch
/// commits (`edit`, `move_record`, `delete`) spawn their settlement on the
/// ambient tokio runtime, so the handle must be used within one.
pub struct BoardHandle<R: BoardRecord, F = FilterSet> {
    pub(crate) inner: Arc<Inner<R, F>>,
}

impl<R: BoardRecord, F> Clone for BoardHandle<R, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: BoardRecord, F> BoardHandle<R, F> {
    /// Start building a board.
    pub fn builder() -> BoardBuilder<R, F> {
        BoardBuilder::new()
    }

    /// Snapshot of one partition.
    pub fn partition(&self, key: &R::Key) -> Option<PartitionSnapshot<R>> {
        self.inner
            .lock_state()
            .partition(key)
            .map(|p| p.snapshot())
    }

    /// Snapshots of every partition in configured column order.
    pub fn partitions(&self) -> Vec<PartitionSnapshot<R>> {
        self.inner.lock_state().snapshots()
    }

    /// Partition keys in configured column order.
    pub fn partition_keys(&self) -> Vec<R::Key> {
        self.inner.lock_state().partition_keys()
    }

    /// Find a record by id across all partitions.
    pub fn record(&self, id: RecordId) -> Option<R> {
        self.inner.lock_state().record(id).cloned()
    }

    /// Whether a mutation on this record is still awaiting its commit.
    pub fn has_pending(&self, id: RecordId) -> bool {
        self.inner.lock_state().has_pending(id)
    }
}

/// Builder for [`BoardHandle`].
pub struct BoardBuilder<R: BoardRecord, F = FilterSet> {
    partitions: Vec<R::Key>,
    config: BoardConfig<R::Key>,
    source: Option<Arc<dyn DataSource<R, F>>>,
    mutations: Option<Arc<dyn MutationService<R>>>,
    sink: Arc<dyn NotificationSink<R::Key>>,
    clock: Arc<dyn Clock>,
}

impl<R: BoardRecord, F> BoardBuilder<R, F> {
    pub fn new() -> Self {
        Self {
            partitions: Vec::new(),
            config: BoardConfig::default(),
            source: None,
            mutations: None,
            sink: Arc::new(NullSink),
            clock: Arc::new(TokioClock),
        }
    }

    /// Set the board's columns, in display order.
    pub fn partitions<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = R::Key>,
    {
        self.partitions = keys.into_iter().collect();
        self
    }

    /// Set the board configuration.
    pub fn config(mut self, config: BoardConfig<R::Key>) -> Self {
        self.config = config;
        self
    }

    /// Set the data source.
    pub fn source<S>(mut self, source: Arc<S>) -> Self
    where
        S: DataSource<R, F> + 'static,
    {
        self.source = Some(source as Arc<dyn DataSource<R, F>>);
        self
    }

    /// Set the mutation service.
    pub fn mutation_service<S>(mut self, mutations: Arc<S>) -> Self
    where
        S: MutationService<R> + 'static,
    {
        self.mutations = Some(mutations as Arc<dyn MutationService<R>>);
        self
    }

    /// Set the notification sink.
    pub fn notification_sink<S>(mut self, sink: Arc<S>) -> Self
    where
        S: NotificationSink<R::Key> + 'static,
    {
        self.sink = sink as Arc<dyn NotificationSink<R::Key>>;
        self
    }

    /// Set the clock.
    pub fn clock<C>(mut self, clock: Arc<C>) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = clock as Arc<dyn Clock>;
        self
    }
}

impl<R: BoardRecord, F: Default> BoardBuilder<R, F> {
    /// Build the handle.
    pub fn build(self) -> BoardResult<BoardHandle<R, F>> {
        if self.partitions.is_empty() {
            return Err(EngineError::Misconfigured {
                reason: "a board needs at least one partition".to_string(),
            });
        }
        let source = self.source.ok_or_else(|| EngineError::Misconfigured {
            reason: "missing data source".to_string(),
        })?;
        let mutations = self.mutations.ok_or_else(|| EngineError::Misconfigured {
            reason: "missing mutation service".to_string(),
        })?;
        Ok(BoardHandle {
            inner: Arc::new(Inner {
                state: Mutex::new(BoardState::new(self.partitions)),
                filters: Mutex::new(FilterState {
                    applied: F::default(),
                    pending: None,
                    seq: 0,
                }),
                source,
                mutations,
                sink: self.sink,
                clock: self.clock,
                config: self.config,
            }),
        })
    }
}

impl<R: BoardRecord, F> Default for BoardBuilder<R, F> {
    fn default() -> Self {
        Self::new()
    }
}
