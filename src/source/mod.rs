//! Collaborators that supply task, team and project data.
//!
//! The engine never reads storage itself. Callers fetch snapshots through a
//! [`ProjectSource`] and hand them to the engine.

mod file;

pub use file::{ProjectFile, ProjectTask};

use chrono::{DateTime, Utc};

use crate::core::{CandidateProfile, ProjectSnapshot, TaskText};
use crate::error::EngineResult;

/// Observation window for build tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Create a window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Trait for project data sources.
pub trait ProjectSource: Send + Sync {
    /// Text of one task.
    fn fetch_task(&self, id: &str) -> EngineResult<TaskText>;

    /// People who could take tasks, optionally limited to one department.
    fn fetch_candidates(&self, department: Option<&str>) -> EngineResult<Vec<CandidateProfile>>;

    /// Task records over a window; `None` uses the source's own window.
    fn fetch_project_snapshot(&self, window: Option<ReportWindow>)
        -> EngineResult<ProjectSnapshot>;
}
