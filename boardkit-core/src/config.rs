//! Per-board engine configuration

use std::time::Duration;

use crate::record::{BoardRecord, PartitionKey};

/// Precondition rule blocking entry to a partition until required fields
/// are populated (e.g. a lead needs `location` and `employee_count` before
/// it may enter the "Warm" stage).
#[derive(Debug, Clone)]
pub struct TransitionRule<K> {
    /// Partition this rule guards.
    pub target: K,
    /// Fields that must hold a value before a record may enter.
    pub required_fields: Vec<String>,
}

impl<K: PartitionKey> TransitionRule<K> {
    /// Create a rule for a target partition.
    pub fn new<I, S>(target: K, required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target,
            required_fields: required_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Fields still missing on a record, considering a patch the caller
    /// intends to apply together with the move.
    pub fn missing_fields<R>(&self, record: &R, patch: Option<&R::Patch>) -> Vec<String>
    where
        R: BoardRecord<Key = K>,
    {
        let mut probe = record.clone();
        if let Some(patch) = patch {
            probe.apply_patch(patch);
        }
        self.required_fields
            .iter()
            .filter(|field| !probe.has_field(field))
            .cloned()
            .collect()
    }
}

/// Configuration for one board engine.
#[derive(Debug, Clone)]
pub struct BoardConfig<K> {
    /// Records fetched per page. Independently configurable per board.
    pub page_size: usize,
    /// Debounce window for free-text filter changes. `None` applies filter
    /// changes immediately (per-board choice for non-text filters).
    pub filter_debounce: Option<Duration>,
    /// Precondition rules keyed by target partition.
    pub transition_rules: Vec<TransitionRule<K>>,
}

impl<K> Default for BoardConfig<K> {
    fn default() -> Self {
        Self {
            page_size: 25,
            filter_debounce: Some(Duration::from_millis(300)),
            transition_rules: Vec::new(),
        }
    }
}

impl<K: PartitionKey> BoardConfig<K> {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the filter debounce window.
    pub fn with_filter_debounce(mut self, window: Duration) -> Self {
        self.filter_debounce = Some(window);
        self
    }

    /// Apply filter changes immediately, without debouncing.
    pub fn with_immediate_filters(mut self) -> Self {
        self.filter_debounce = None;
        self
    }

    /// Add a transition rule.
    pub fn with_transition_rule(mut self, rule: TransitionRule<K>) -> Self {
        self.transition_rules.push(rule);
        self
    }

    /// Look up the rule guarding a target partition.
    pub fn rule_for(&self, target: &K) -> Option<&TransitionRule<K>> {
        self.transition_rules.iter().find(|rule| &rule.target == target)
    }
}
