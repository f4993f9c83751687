//! Task value types shared by the analyzers and the build tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Task priority, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,
    /// Normal scheduling
    Medium,
    /// Should be picked up soon
    High,
    /// Drop everything
    Urgent,
}

impl Priority {
    /// Get the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Completed,
    Blocked,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        };
        write!(f, "{name}")
    }
}

/// Free text describing a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskText {
    /// Short title
    pub title: String,

    /// Longer description (may be empty)
    #[serde(default)]
    pub description: String,
}

impl TaskText {
    /// Create task text from a title and description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into() }
    }

    /// Title and description joined by a space.
    pub fn combined(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Reject text whose title and description are both blank.
    pub fn validate(&self) -> EngineResult<()> {
        if self.title.trim().is_empty() && self.description.trim().is_empty() {
            return Err(EngineError::invalid_input("task title and description are both empty"));
        }
        Ok(())
    }
}

/// Lifecycle facts about one task in a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Estimated effort in hours
    #[serde(default)]
    pub estimated_hours: f64,

    /// Hours logged so far
    #[serde(default)]
    pub actual_hours: f64,

    /// Completion timestamp, present only for completed tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Due date, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Create a record with the given status and no dates or hours.
    pub fn new(status: TaskStatus) -> Self {
        Self { status, ..Self::default() }
    }

    /// Create a completed record.
    pub fn completed(at: DateTime<Utc>) -> Self {
        Self { status: TaskStatus::Completed, completed_at: Some(at), ..Self::default() }
    }

    /// Set the due date.
    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_at = Some(due);
        self
    }

    /// Set estimated and actual hours.
    pub fn with_hours(mut self, estimated: f64, actual: f64) -> Self {
        self.estimated_hours = estimated;
        self.actual_hours = actual;
        self
    }

    /// Check the record's own invariants.
    pub fn validate(&self) -> EngineResult<()> {
        let is_completed = self.status == TaskStatus::Completed;
        if is_completed != self.completed_at.is_some() {
            return Err(EngineError::invalid_input(format!(
                "completed_at must be set exactly when status is completed (status: {})",
                self.status
            )));
        }
        if !(self.estimated_hours.is_finite() && self.estimated_hours >= 0.0) {
            return Err(EngineError::invalid_input("estimated_hours must be a non-negative number"));
        }
        if !(self.actual_hours.is_finite() && self.actual_hours >= 0.0) {
            return Err(EngineError::invalid_input("actual_hours must be a non-negative number"));
        }
        Ok(())
    }
}

/// A project's tasks over an observation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Tasks in the project
    pub tasks: Vec<TaskRecord>,

    /// Start of the observation window
    pub window_start: DateTime<Utc>,

    /// End of the observation window
    pub window_end: DateTime<Utc>,
}

impl ProjectSnapshot {
    /// Create a snapshot.
    pub fn new(
        tasks: Vec<TaskRecord>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        Self { tasks, window_start, window_end }
    }

    /// Check that the snapshot can be tracked.
    pub fn validate(&self) -> EngineResult<()> {
        if self.tasks.is_empty() {
            return Err(EngineError::invalid_input("project snapshot has no tasks"));
        }
        if self.window_end <= self.window_start {
            return Err(EngineError::invalid_input("window_end must be after window_start"));
        }
        self.tasks.iter().try_for_each(TaskRecord::validate)
    }
}
