//! Project data read from a YAML or JSON document.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProjectSource, ReportWindow};
use crate::core::{CandidateProfile, ProjectSnapshot, TaskRecord, TaskText};
use crate::error::{EngineError, EngineResult};

/// A project document: tasks, team and reporting window.
///
/// Parsed with `serde_yaml`, which also accepts JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Project name
    #[serde(default)]
    pub name: String,

    /// Start of the reporting window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_start: Option<DateTime<Utc>>,

    /// End of the reporting window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_end: Option<DateTime<Utc>>,

    /// Tasks
    #[serde(default)]
    pub tasks: Vec<ProjectTask>,

    /// People available for assignment
    #[serde(default)]
    pub team: Vec<CandidateProfile>,
}

/// A task entry in a project document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTask {
    /// Task identifier
    pub id: String,

    /// Title
    #[serde(default)]
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Lifecycle facts
    #[serde(flatten)]
    pub record: TaskRecord,
}

impl ProjectFile {
    /// Load a project document from disk.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let project = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            tasks = project.tasks.len(),
            team = project.team.len(),
            "Loaded project file"
        );
        Ok(project)
    }

    /// Parse a project document.
    pub fn parse(content: &str) -> EngineResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The document's own reporting window, if complete.
    pub fn window(&self) -> Option<ReportWindow> {
        Some(ReportWindow::new(self.window_start?, self.window_end?))
    }
}

impl ProjectSource for ProjectFile {
    fn fetch_task(&self, id: &str) -> EngineResult<TaskText> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| TaskText::new(t.title.clone(), t.description.clone()))
            .ok_or_else(|| EngineError::NotFound(format!("task '{id}'")))
    }

    fn fetch_candidates(&self, department: Option<&str>) -> EngineResult<Vec<CandidateProfile>> {
        Ok(self
            .team
            .iter()
            .filter(|c| department.map_or(true, |d| c.in_department(d)))
            .cloned()
            .collect())
    }

    fn fetch_project_snapshot(
        &self,
        window: Option<ReportWindow>,
    ) -> EngineResult<ProjectSnapshot> {
        let window = window.or_else(|| self.window()).ok_or_else(|| {
            EngineError::invalid_input("project has no reporting window (window_start/window_end)")
        })?;
        let tasks = self.tasks.iter().map(|t| t.record.clone()).collect();
        Ok(ProjectSnapshot::new(tasks, window.start, window.end))
    }
}
