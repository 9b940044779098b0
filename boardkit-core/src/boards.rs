//! Board record variants
//!
//! The closed set of record types the application manages: sales leads,
//! hiring candidates, and task cards. Each variant carries its own stage
//! enum (the partition key) and patch struct, and implements [`BoardRecord`]
//! so the generic engine can operate on all three without knowing
//! board-specific fields.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::record::{BoardRecord, RecordId, Timestamp};

fn present(value: &Option<String>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}

// ============================================================================
// LEADS
// ============================================================================

/// Pipeline stage of a sales lead. One kanban column per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    New,
    Contact,
    Warm,
    Won,
    Lost,
}

/// A sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: RecordId,
    pub stage: LeadStage,
    pub company: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub employee_count: Option<i64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lead {
    /// Create a new lead in the given stage.
    pub fn new(company: &str, stage: LeadStage) -> Self {
        let now = Utc::now();
        Self {
            lead_id: RecordId::now_v7(),
            stage,
            company: company.to_string(),
            contact_name: None,
            email: None,
            phone: None,
            location: None,
            employee_count: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the contact person.
    pub fn with_contact(mut self, name: &str, email: &str) -> Self {
        self.contact_name = Some(name.to_string());
        self.email = Some(email.to_string());
        self
    }

    /// Set the company location.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Set the company size.
    pub fn with_employee_count(mut self, count: i64) -> Self {
        self.employee_count = Some(count);
        self
    }
}

/// Partial update for a lead. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPatch {
    pub company: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub employee_count: Option<i64>,
    pub notes: Option<String>,
}

impl LeadPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn employee_count(mut self, count: i64) -> Self {
        self.employee_count = Some(count);
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

impl BoardRecord for Lead {
    type Key = LeadStage;
    type Patch = LeadPatch;

    fn record_id(&self) -> RecordId {
        self.lead_id
    }

    fn partition_key(&self) -> LeadStage {
        self.stage
    }

    fn set_partition_key(&mut self, key: LeadStage) {
        self.stage = key;
        self.updated_at = Utc::now();
    }

    fn apply_patch(&mut self, patch: &LeadPatch) {
        if let Some(company) = &patch.company {
            self.company = company.clone();
        }
        if let Some(contact_name) = &patch.contact_name {
            self.contact_name = Some(contact_name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        if let Some(employee_count) = patch.employee_count {
            self.employee_count = Some(employee_count);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = Utc::now();
    }

    fn has_field(&self, field: &str) -> bool {
        match field {
            "company" => !self.company.is_empty(),
            "contact_name" => present(&self.contact_name),
            "email" => present(&self.email),
            "phone" => present(&self.phone),
            "location" => present(&self.location),
            "employee_count" => self.employee_count.is_some(),
            "notes" => present(&self.notes),
            _ => false,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

// ============================================================================
// CANDIDATES
// ============================================================================

/// Hiring pipeline stage of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStage {
    Applied,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

/// A hiring candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: RecordId,
    pub stage: CandidateStage,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub expected_salary: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Candidate {
    /// Create a new candidate for a role.
    pub fn new(name: &str, role: &str, stage: CandidateStage) -> Self {
        let now = Utc::now();
        Self {
            candidate_id: RecordId::now_v7(),
            stage,
            name: name.to_string(),
            role: role.to_string(),
            email: None,
            phone: None,
            expected_salary: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub expected_salary: Option<i64>,
}

impl BoardRecord for Candidate {
    type Key = CandidateStage;
    type Patch = CandidatePatch;

    fn record_id(&self) -> RecordId {
        self.candidate_id
    }

    fn partition_key(&self) -> CandidateStage {
        self.stage
    }

    fn set_partition_key(&mut self, key: CandidateStage) {
        self.stage = key;
        self.updated_at = Utc::now();
    }

    fn apply_patch(&mut self, patch: &CandidatePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(role) = &patch.role {
            self.role = role.clone();
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(expected_salary) = patch.expected_salary {
            self.expected_salary = Some(expected_salary);
        }
        self.updated_at = Utc::now();
    }

    fn has_field(&self, field: &str) -> bool {
        match field {
            "name" => !self.name.is_empty(),
            "role" => !self.role.is_empty(),
            "email" => present(&self.email),
            "phone" => present(&self.phone),
            "expected_salary" => self.expected_salary.is_some(),
            _ => false,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

// ============================================================================
// TASKS
// ============================================================================

/// Status of a task card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

/// A task card on the task board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCard {
    pub task_id: RecordId,
    pub status: TaskStatus,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TaskCard {
    /// Create a new task card.
    pub fn new(title: &str, status: TaskStatus) -> Self {
        let now = Utc::now();
        Self {
            task_id: RecordId::now_v7(),
            status,
            title: title.to_string(),
            description: None,
            assignee: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign the task.
    pub fn with_assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    /// Set the due date.
    pub fn with_due_date(mut self, due: Timestamp) -> Self {
        self.due_date = Some(due);
        self
    }
}

/// Partial update for a task card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<Timestamp>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

impl BoardRecord for TaskCard {
    type Key = TaskStatus;
    type Patch = TaskPatch;

    fn record_id(&self) -> RecordId {
        self.task_id
    }

    fn partition_key(&self) -> TaskStatus {
        self.status
    }

    fn set_partition_key(&mut self, key: TaskStatus) {
        self.status = key;
        self.updated_at = Utc::now();
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = Some(assignee.clone());
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Utc::now();
    }

    fn has_field(&self, field: &str) -> bool {
        match field {
            "title" => !self.title.is_empty(),
            "description" => present(&self.description),
            "assignee" => present(&self.assignee),
            "due_date" => self.due_date.is_some(),
            _ => false,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_patch_merges_only_set_fields() {
        let mut lead = Lead::new("Acme", LeadStage::Contact).with_contact("Sam Doe", "sam@acme.io");
        let patch = LeadPatch::new().location("Berlin").employee_count(120);
        lead.apply_patch(&patch);

        assert_eq!(lead.company, "Acme");
        assert_eq!(lead.contact_name.as_deref(), Some("Sam Doe"));
        assert_eq!(lead.location.as_deref(), Some("Berlin"));
        assert_eq!(lead.employee_count, Some(120));
    }

    #[test]
    fn test_lead_has_field_treats_empty_as_absent() {
        let mut lead = Lead::new("Acme", LeadStage::New);
        assert!(!lead.has_field("location"));
        lead.location = Some(String::new());
        assert!(!lead.has_field("location"));
        lead.location = Some("Berlin".to_string());
        assert!(lead.has_field("location"));
        assert!(!lead.has_field("no_such_field"));
    }

    #[test]
    fn test_set_partition_key_moves_stage() {
        let mut card = TaskCard::new("write docs", TaskStatus::Todo);
        card.set_partition_key(TaskStatus::InProgress);
        assert_eq!(card.partition_key(), TaskStatus::InProgress);
    }

    #[test]
    fn test_candidate_patch_applies() {
        let mut candidate = Candidate::new("Ada", "Engineer", CandidateStage::Applied);
        let patch = CandidatePatch {
            expected_salary: Some(90_000),
            ..Default::default()
        };
        candidate.apply_patch(&patch);
        assert_eq!(candidate.expected_salary, Some(90_000));
        assert!(candidate.has_field("expected_salary"));
    }
}
