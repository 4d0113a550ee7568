//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its optional projections (due date,
//!   category, priority).
//! - Normalize user-supplied titles.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is stored trimmed and is never empty.
//! - `created_seq` is assigned once and orders the task list.

use crate::model::category::CategoryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Completion state derived from `Task::completed`.
///
/// Tasks start `Open`; toggling moves between the two states and neither is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Done,
}

/// Optional urgency marker for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Storage/wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a priority name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Trimmed, non-empty title. Duplicates across tasks are allowed.
    pub title: String,
    pub completed: bool,
    /// Calendar date without time zone. `None` means "no due date".
    pub due_date: Option<NaiveDate>,
    /// `None` means uncategorized.
    pub category_id: Option<CategoryId>,
    pub priority: Option<TaskPriority>,
    /// Creation-order key, strictly increasing across the board lifetime.
    pub created_seq: u64,
}

impl Task {
    /// Creates an open task with no optional fields set.
    ///
    /// Does not validate `title`; services normalize it first.
    pub fn new(id: TaskId, title: impl Into<String>, created_seq: u64) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            due_date: None,
            category_id: None,
            priority: None,
            created_seq,
        }
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Done
        } else {
            TaskStatus::Open
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category_id.is_none()
    }
}

/// Trims a title and returns `None` when nothing is left.
pub fn normalize_title(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
