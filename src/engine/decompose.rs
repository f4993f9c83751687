//! Expand a task into phase-based sub-task templates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::complexity::ComplexityResult;
use crate::core::{Priority, TaskRecord, TaskStatus};
use crate::rules::{KeywordTables, PatternTag, Phase};
use crate::text::Tokens;

/// One sub-task produced by decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskTemplate {
    /// Title in the form "<Step>: <parent title>"
    pub title: String,

    /// Phase of work
    pub phase: Phase,

    /// Step label, e.g. "Investigate"
    pub step: String,

    /// What the sub-task covers
    pub description: String,

    /// Suggested priority
    pub priority: Priority,

    /// Share of the parent estimate in hours
    pub estimated_hours: f64,
}

impl SubtaskTemplate {
    /// A fresh to-do record carrying this sub-task's estimate.
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord::new(TaskStatus::Todo).with_hours(self.estimated_hours, 0.0)
    }
}

/// Ready-to-create tasks for a new feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePlan {
    /// Feature name
    pub name: String,

    /// Complexity of the feature as a whole
    pub complexity: ComplexityResult,

    /// Tasks to create, in phase order
    pub tasks: Vec<SubtaskTemplate>,
}

impl FeaturePlan {
    /// Records a tracker can follow once the tasks exist.
    pub fn records(&self) -> Vec<TaskRecord> {
        self.tasks.iter().map(SubtaskTemplate::to_record).collect()
    }

    /// Total planned hours.
    pub fn total_hours(&self) -> f64 {
        self.tasks.iter().map(|t| t.estimated_hours).sum()
    }
}

/// Splits tasks into the template family picked by their leading verb.
#[derive(Debug, Clone)]
pub struct TaskDecomposer {
    tables: Arc<KeywordTables>,
}

impl TaskDecomposer {
    /// Create a decomposer.
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        Self { tables }
    }

    /// Pick the template family for a title.
    ///
    /// The first title word that is a trigger verb of any family wins; with
    /// no trigger the default family applies.
    pub fn classify(&self, title: &str) -> PatternTag {
        let rules = &self.tables.decomposition;
        let tokens = Tokens::new(title);

        tokens
            .words()
            .iter()
            .find_map(|word| {
                let single = Tokens::new(word);
                rules
                    .patterns
                    .iter()
                    .find(|p| single.contains_any(&p.verbs))
                    .map(|p| p.tag)
            })
            .unwrap_or(rules.default)
    }

    /// Decompose a task, splitting `estimated_hours` across the steps.
    ///
    /// Always yields at least one template. The sub-task hours add up to
    /// `estimated_hours`.
    pub fn decompose(&self, title: &str, estimated_hours: f64) -> Vec<SubtaskTemplate> {
        let tag = self.classify(title);
        let Some(pattern) = self
            .tables
            .pattern(tag)
            .or_else(|| self.tables.pattern(self.tables.decomposition.default))
        else {
            return Vec::new();
        };

        let title = title.trim();
        let parent_hours = estimated_hours.max(0.0);
        let last = pattern.steps.len().saturating_sub(1);
        let mut allotted = 0.0;

        let subtasks: Vec<SubtaskTemplate> = pattern
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                // The last step takes the remainder so rounding never leaks hours.
                let hours = if i == last {
                    (parent_hours - allotted).max(0.0)
                } else {
                    parent_hours * step.fraction
                };
                allotted += hours;
                SubtaskTemplate {
                    title: format!("{}: {}", step.label, title),
                    phase: step.phase,
                    step: step.label.clone(),
                    description: step.description.clone(),
                    priority: step.priority,
                    estimated_hours: hours,
                }
            })
            .collect();

        tracing::debug!(pattern = %tag, subtasks = subtasks.len(), "Decomposed task");
        subtasks
    }
}
