//! Partitions and pagination pages
//!
//! A partition is one named, independently-paginated sub-collection of a
//! board (typically one status column). Items retain server page order;
//! merges append with de-duplication by id and never re-sort, so rows that
//! are already visible do not reshuffle when new pages arrive.

use serde::{Deserialize, Serialize};

use crate::record::{BoardRecord, RecordId};

/// One page of records as returned by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Records in server order.
    pub items: Vec<R>,
    /// Total records matching the query across all pages.
    pub total_count: u64,
    /// Whether the source has further pages.
    pub has_more: bool,
}

impl<R> Page<R> {
    /// Build a page, deriving `has_more` from the counts.
    pub fn new(items: Vec<R>, total_count: u64) -> Self {
        let has_more = (items.len() as u64) < total_count;
        Self {
            items,
            total_count,
            has_more,
        }
    }

    /// An empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            has_more: false,
        }
    }
}

/// A named, independently-paginated sub-collection of records.
///
/// Invariants maintained by every mutator:
/// - `items.len() <= total_count`
/// - `has_more == items.len() < total_count` (clamped against a source that
///   over-reports)
/// - at most one in-flight load (`is_loading` re-entrancy guard)
/// - no duplicate record ids
///
/// `epoch` increments on every reset; a load issued under an older epoch is
/// stale and its response must be discarded.
#[derive(Debug, Clone)]
pub struct Partition<R: BoardRecord> {
    key: R::Key,
    items: Vec<R>,
    cursor: u64,
    total_count: u64,
    has_more: bool,
    is_loading: bool,
    epoch: u64,
}

impl<R: BoardRecord> Partition<R> {
    /// Create an empty partition for a column key.
    pub fn new(key: R::Key) -> Self {
        Self {
            key,
            items: Vec::new(),
            cursor: 0,
            total_count: 0,
            has_more: false,
            is_loading: false,
            epoch: 0,
        }
    }

    pub fn key(&self) -> &R::Key {
        &self.key
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.items.iter().any(|r| r.record_id() == id)
    }

    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.items.iter().position(|r| r.record_id() == id)
    }

    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.items.iter().find(|r| r.record_id() == id)
    }

    pub fn find_mut(&mut self, id: RecordId) -> Option<&mut R> {
        self.items.iter_mut().find(|r| r.record_id() == id)
    }

    /// Guarded start of an incremental load.
    ///
    /// Returns false (caller must no-op) while a load is in flight or the
    /// partition is exhausted.
    pub fn begin_load(&mut self) -> bool {
        if self.is_loading || !self.has_more {
            return false;
        }
        self.is_loading = true;
        true
    }

    /// Start a reset-and-reload, superseding any in-flight load.
    ///
    /// Returns the new epoch; the caller threads it through the fetch and
    /// discards the response if the partition has moved on since.
    pub fn begin_reset(&mut self) -> u64 {
        self.epoch += 1;
        self.items.clear();
        self.cursor = 0;
        self.total_count = 0;
        self.has_more = false;
        self.is_loading = true;
        self.epoch
    }

    /// Install the first page after a reset.
    pub fn finish_reset(&mut self, page: Page<R>) {
        self.items.clear();
        for record in page.items {
            if !self.contains(record.record_id()) {
                self.items.push(record);
            }
        }
        self.cursor = self.items.len() as u64;
        self.total_count = page.total_count.max(self.items.len() as u64);
        self.has_more = page.has_more && (self.items.len() as u64) < self.total_count;
        self.is_loading = false;
    }

    /// Append a page with de-duplication by id, preserving first-seen order.
    ///
    /// The cursor advances by the number of *new* unique items, which keeps
    /// paging correct when backend sort-key churn makes pages overlap.
    /// Returns the number of items appended.
    pub fn merge_page(&mut self, page: Page<R>) -> usize {
        let mut appended = 0;
        for record in page.items {
            if !self.contains(record.record_id()) {
                self.items.push(record);
                appended += 1;
            }
        }
        self.cursor += appended as u64;
        self.total_count = page.total_count.max(self.items.len() as u64);
        self.recompute_has_more();
        self.is_loading = false;
        appended
    }

    /// Recover from a failed load: clear the flag, touch nothing else.
    pub fn fail_load(&mut self) {
        self.is_loading = false;
    }

    /// Insert a record at the head (most-recent-first convention).
    pub fn insert_head(&mut self, record: R) {
        self.items.insert(0, record);
        self.total_count += 1;
        self.recompute_has_more();
    }

    /// Insert a record at a position, clamped to the current length.
    pub fn insert_at(&mut self, record: R, index: usize) {
        let index = index.min(self.items.len());
        self.items.insert(index, record);
        self.total_count += 1;
        self.recompute_has_more();
    }

    /// Remove a record by id, returning it and the index it occupied.
    pub fn remove(&mut self, id: RecordId) -> Option<(R, usize)> {
        let index = self.index_of(id)?;
        let record = self.items.remove(index);
        self.total_count = self.total_count.saturating_sub(1);
        self.recompute_has_more();
        Some((record, index))
    }

    /// Replace a record in place, preserving its position.
    pub fn replace(&mut self, record: R) -> bool {
        match self.find_mut(record.record_id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Clone-out view for the presentation layer.
    pub fn snapshot(&self) -> PartitionSnapshot<R> {
        PartitionSnapshot {
            key: self.key.clone(),
            items: self.items.clone(),
            total_count: self.total_count,
            has_more: self.has_more,
            is_loading: self.is_loading,
        }
    }

    fn recompute_has_more(&mut self) {
        self.has_more = (self.items.len() as u64) < self.total_count;
    }
}

/// Point-in-time view of a partition handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct PartitionSnapshot<R: BoardRecord> {
    pub key: R::Key,
    pub items: Vec<R>,
    pub total_count: u64,
    pub has_more: bool,
    pub is_loading: bool,
}

impl<R: BoardRecord> PartitionSnapshot<R> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
