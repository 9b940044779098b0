//! Board state: the single shared mutable resource
//!
//! All partitions, the pending-mutation ledger, and every invariant live
//! here. The state is only ever mutated through the engine's controllers,
//! never by the presentation layer, so partition exclusivity (a record id
//! appears in exactly one partition's items) is enforced centrally: the
//! only cross-partition operations are `apply_move`, `settle_err`, and
//! `replace_record`, and each removes before it inserts under one `&mut`
//! borrow.

use std::collections::HashMap;

use boardkit_core::{BoardRecord, Partition, PartitionSnapshot, PendingMutation, RecordId};

pub(crate) struct BoardState<R: BoardRecord> {
    partitions: Vec<Partition<R>>,
    pending: HashMap<RecordId, PendingMutation<R>>,
    attempt_counter: u64,
}

impl<R: BoardRecord> BoardState<R> {
    /// Build the partition map in configured column order.
    pub(crate) fn new(keys: Vec<R::Key>) -> Self {
        Self {
            partitions: keys.into_iter().map(Partition::new).collect(),
            pending: HashMap::new(),
            attempt_counter: 0,
        }
    }

    pub(crate) fn partition_keys(&self) -> Vec<R::Key> {
        self.partitions.iter().map(|p| p.key().clone()).collect()
    }

    pub(crate) fn partition(&self, key: &R::Key) -> Option<&Partition<R>> {
        self.partitions.iter().find(|p| p.key() == key)
    }

    pub(crate) fn partition_mut(&mut self, key: &R::Key) -> Option<&mut Partition<R>> {
        self.partitions.iter_mut().find(|p| p.key() == key)
    }

    pub(crate) fn snapshots(&self) -> Vec<PartitionSnapshot<R>> {
        self.partitions.iter().map(Partition::snapshot).collect()
    }

    /// Find a record by id across all partitions.
    pub(crate) fn record(&self, id: RecordId) -> Option<&R> {
        self.partitions.iter().find_map(|p| p.find(id))
    }

    /// Locate a record: the partition key and item index it occupies.
    pub(crate) fn locate(&self, id: RecordId) -> Option<(R::Key, usize)> {
        self.partitions
            .iter()
            .find_map(|p| p.index_of(id).map(|index| (p.key().clone(), index)))
    }

    fn remove_by_id(&mut self, id: RecordId) -> Option<R> {
        self.partitions
            .iter_mut()
            .find_map(|p| p.remove(id).map(|(record, _)| record))
    }

    pub(crate) fn has_pending(&self, id: RecordId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Drop every pending mutation. Used by full resets, after which the
    /// server value is authoritative and late settlements must no-op.
    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Open (or supersede into) the pending entry for a record about to be
    /// mutated. The original pre-mutation snapshot is captured exactly
    /// once, on the first unsettled attempt. Returns the attempt id, or
    /// None if the record does not exist.
    pub(crate) fn open_attempt(&mut self, id: RecordId) -> Option<u64> {
        self.attempt_counter += 1;
        let attempt = self.attempt_counter;
        if let Some(entry) = self.pending.get_mut(&id) {
            entry.supersede(attempt);
            return Some(attempt);
        }
        let (key, index) = self.locate(id)?;
        let original = self.partition(&key)?.find(id)?.clone();
        self.pending
            .insert(id, PendingMutation::open(original, index, attempt));
        Some(attempt)
    }

    /// Patch a record in place, preserving its position.
    pub(crate) fn apply_edit(&mut self, id: RecordId, patch: &R::Patch) -> bool {
        for partition in &mut self.partitions {
            if let Some(record) = partition.find_mut(id) {
                record.apply_patch(patch);
                return true;
            }
        }
        false
    }

    /// Move a record to another partition as one atomic local update:
    /// remove from source, reassign, apply the supplied patch, insert at
    /// the head of the target. The record is never visible in two
    /// partitions, even transiently.
    pub(crate) fn apply_move(&mut self, id: RecordId, to: &R::Key, patch: Option<&R::Patch>) -> bool {
        if self.partition(to).is_none() {
            return false;
        }
        let Some(mut record) = self.remove_by_id(id) else {
            return false;
        };
        record.set_partition_key(to.clone());
        if let Some(patch) = patch {
            record.apply_patch(patch);
        }
        match self.partition_mut(to) {
            Some(partition) => {
                partition.insert_head(record);
                true
            }
            None => false,
        }
    }

    /// Remove a record (optimistic delete).
    pub(crate) fn apply_remove(&mut self, id: RecordId) -> Option<R> {
        self.remove_by_id(id)
    }

    /// Insert an externally-created record at the head of its partition,
    /// or replace it in place if it is already visible.
    pub(crate) fn insert_record(&mut self, record: R) -> bool {
        if self.record(record.record_id()).is_some() {
            return self.replace_record(record);
        }
        match self.partition_mut(&record.partition_key()) {
            Some(partition) => {
                partition.insert_head(record);
                true
            }
            None => false,
        }
    }

    /// Replace a record wherever it currently lives. If the replacement
    /// belongs to a different partition, it is moved there.
    pub(crate) fn replace_record(&mut self, record: R) -> bool {
        let id = record.record_id();
        let Some((current_key, _)) = self.locate(id) else {
            return false;
        };
        if current_key == record.partition_key() {
            return self
                .partition_mut(&current_key)
                .map(|p| p.replace(record))
                .unwrap_or(false);
        }
        let _ = self.remove_by_id(id);
        let target = record.partition_key();
        match self.partition_mut(&target) {
            Some(partition) => {
                partition.insert_head(record);
                true
            }
            None => false,
        }
    }

    /// Settle a successful commit. Decrements the unsettled count; the
    /// pending entry is discarded once every dispatched commit has
    /// settled. A server-corrected record is adopted only when this was
    /// the latest attempt and nothing newer is still in flight.
    /// Returns false when no pending entry exists (already rolled back or
    /// cleared by a reset).
    pub(crate) fn settle_ok(&mut self, id: RecordId, attempt: u64, server: Option<R>) -> bool {
        let Some(entry) = self.pending.get_mut(&id) else {
            return false;
        };
        entry.unsettled = entry.unsettled.saturating_sub(1);
        let is_latest = attempt == entry.latest_attempt;
        let settled = entry.unsettled == 0;
        if settled {
            self.pending.remove(&id);
            if is_latest {
                if let Some(corrected) = server {
                    self.replace_record(corrected);
                }
            }
        }
        true
    }

    /// Settle a failed commit: restore the original pre-mutation snapshot
    /// by id across all partitions, including its origin partition and
    /// position, and close the pending entry. Later settlements for this
    /// record find no entry and no-op. Returns the restored record, or
    /// None when there was nothing to roll back.
    pub(crate) fn settle_err(&mut self, id: RecordId) -> Option<R> {
        let entry = self.pending.remove(&id)?;
        let _ = self.remove_by_id(id);
        let original = entry.original.clone();
        let origin_key = entry.origin_key();
        self.partition_mut(&origin_key)?
            .insert_at(original.clone(), entry.origin_index);
        Some(original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardkit_core::{Lead, LeadPatch, LeadStage, Page};
    use uuid::Uuid;

    fn lead(n: u128, stage: LeadStage) -> Lead {
        let mut lead = Lead::new(&format!("company-{n}"), stage);
        lead.lead_id = RecordId::from_uuid(Uuid::from_u128(n));
        lead
    }

    fn state_with(leads: Vec<Lead>) -> BoardState<Lead> {
        let mut state = BoardState::new(vec![
            LeadStage::New,
            LeadStage::Contact,
            LeadStage::Warm,
        ]);
        for key in state.partition_keys() {
            state
                .partition_mut(&key)
                .unwrap()
                .finish_reset(Page::new(Vec::new(), 0));
        }
        for record in leads {
            let key = record.partition_key();
            state.partition_mut(&key).unwrap().insert_head(record);
        }
        state
    }

    #[test]
    fn test_move_keeps_partition_exclusivity() {
        let mut state = state_with(vec![lead(1, LeadStage::New)]);
        let id = lead(1, LeadStage::New).record_id();

        assert!(state.apply_move(id, &LeadStage::Contact, None));

        assert!(!state.partition(&LeadStage::New).unwrap().contains(id));
        assert!(state.partition(&LeadStage::Contact).unwrap().contains(id));
        let occurrences: usize = state
            .snapshots()
            .iter()
            .map(|s| s.items.iter().filter(|r| r.record_id() == id).count())
            .sum();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_settle_err_restores_origin_partition_and_position() {
        let mut state = state_with(vec![lead(1, LeadStage::New), lead(2, LeadStage::New)]);
        let id = lead(1, LeadStage::New).record_id();
        let origin_index = state.locate(id).unwrap().1;

        state.open_attempt(id).unwrap();
        state.apply_move(id, &LeadStage::Warm, None);

        let restored = state.settle_err(id).unwrap();
        assert_eq!(restored.record_id(), id);
        assert_eq!(state.locate(id).unwrap(), (LeadStage::New, origin_index));
        assert!(!state.partition(&LeadStage::Warm).unwrap().contains(id));
    }

    #[test]
    fn test_superseded_attempt_keeps_original_snapshot() {
        let mut state = state_with(vec![lead(1, LeadStage::New)]);
        let id = lead(1, LeadStage::New).record_id();

        let first = state.open_attempt(id).unwrap();
        state.apply_edit(
            id,
            &LeadPatch::new().notes("first"),
        );
        let second = state.open_attempt(id).unwrap();
        state.apply_edit(
            id,
            &LeadPatch::new().notes("second"),
        );
        assert!(second > first);

        // First commit succeeds, second fails: rollback restores the true
        // original, not the intermediate value.
        assert!(state.settle_ok(id, first, None));
        assert!(state.has_pending(id));
        let restored = state.settle_err(id).unwrap();
        assert_eq!(restored.notes, None);
        assert_eq!(state.record(id).unwrap().notes, None);
    }

    #[test]
    fn test_settle_after_clear_pending_is_noop() {
        let mut state = state_with(vec![lead(1, LeadStage::New)]);
        let id = lead(1, LeadStage::New).record_id();

        let attempt = state.open_attempt(id).unwrap();
        state.apply_edit(id, &LeadPatch::new().notes("local"));
        state.clear_pending();

        assert!(!state.settle_ok(id, attempt, None));
        assert!(state.settle_err(id).is_none());
        // The optimistic value stays; a reset reload would overwrite it.
        assert_eq!(state.record(id).unwrap().notes.as_deref(), Some("local"));
    }

    #[test]
    fn test_server_corrected_record_adopted_only_when_latest() {
        let mut state = state_with(vec![lead(1, LeadStage::New)]);
        let id = lead(1, LeadStage::New).record_id();

        let first = state.open_attempt(id).unwrap();
        let _second = state.open_attempt(id).unwrap();

        let mut corrected = lead(1, LeadStage::New);
        corrected.notes = Some("server".to_string());

        // Stale attempt settles with a corrected record while a newer one
        // is still unsettled: not adopted.
        assert!(state.settle_ok(id, first, Some(corrected.clone())));
        assert_eq!(state.record(id).unwrap().notes, None);
        assert!(state.has_pending(id));
    }

    #[test]
    fn test_delete_rollback_reinserts() {
        let mut state = state_with(vec![lead(1, LeadStage::New), lead(2, LeadStage::New)]);
        let id = lead(2, LeadStage::New).record_id();

        state.open_attempt(id).unwrap();
        let removed = state.apply_remove(id).unwrap();
        assert_eq!(removed.record_id(), id);
        assert!(state.record(id).is_none());

        state.settle_err(id).unwrap();
        assert!(state.record(id).is_some());
    }
}
