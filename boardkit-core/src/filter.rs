//! Filter criteria for board queries
//!
//! The engine treats filter criteria as an opaque value object and only
//! needs equality comparison to decide whether a reset is required. This
//! module provides the concrete criteria type the boards use; callers with
//! richer needs can substitute their own type.

use serde::{Deserialize, Serialize};

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Contains substring (for strings)
    Contains,
    /// In list of values
    In,
}

/// A single field filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    /// Field to filter on
    pub field: String,
    /// Operator to apply
    pub operator: FilterOperator,
    /// Value to compare against (JSON value for flexibility)
    pub value: serde_json::Value,
}

impl FilterExpr {
    /// Create a new filter expression.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create a contains filter.
    pub fn contains(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }
}

/// Filter criteria for a board: a free-text query plus field filters.
///
/// Compared by value when deciding whether a filter change requires a
/// reset-and-reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Free-text query (the debounced input).
    pub query: Option<String>,
    /// Structured field filters.
    pub filters: Vec<FilterExpr>,
}

impl FilterSet {
    /// Empty criteria (match everything).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the free-text query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Add a field filter.
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filters.push(filter);
        self
    }

    /// Whether the criteria match everything.
    pub fn is_empty(&self) -> bool {
        self.query.as_deref().map_or(true, str::is_empty) && self.filters.is_empty()
    }
}
