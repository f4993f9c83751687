//! Task analysis and build tracking engine.
//!
//! Every component is a pure function of its inputs and an immutable
//! [`KeywordTables`] snapshot, so an [`Engine`] can be shared freely across
//! threads.
//!
//! ## Components
//!
//! - [`ComplexityAnalyzer`] - score, priority and effort from task text
//! - [`AssigneeMatcher`] - rank people by skill, department and role fit
//! - [`TaskDecomposer`] - phase-based sub-task templates
//! - [`NaturalLanguageTaskBuilder`] - structured drafts from free text
//! - [`BuildTracker`] - velocity, forecast and health for a project

mod builder;
mod complexity;
mod decompose;
mod matcher;
mod priority;
mod tracker;

pub use builder::{extract_title, NaturalLanguageTaskBuilder, TaskDraft};
pub use complexity::{
    priority_for_score, ComplexityAnalyzer, ComplexityResult, Tier, TierMatches, MAX_SCORE,
    MIN_SCORE,
};
pub use decompose::{FeaturePlan, SubtaskTemplate, TaskDecomposer};
pub use matcher::{AssigneeMatcher, AssigneeRanking, AssigneeSuggestion, SkillDemand};
pub use priority::{resolve_priority, UrgencySignals};
pub use tracker::{BuildStatus, BuildTracker, HealthDeduction, HealthStatus, StatusCounts};

use std::sync::Arc;

use crate::core::{CandidateProfile, Config, ProjectSnapshot, TaskText};
use crate::error::{EngineError, EngineResult};
use crate::rules::{default_tables, KeywordTables, RuleStore};

/// Entry point bundling all components over one rule snapshot.
#[derive(Debug, Clone)]
pub struct Engine {
    tables: Arc<KeywordTables>,
    analyzer: ComplexityAnalyzer,
    matcher: AssigneeMatcher,
    decomposer: TaskDecomposer,
    builder: NaturalLanguageTaskBuilder,
    tracker: BuildTracker,
}

impl Engine {
    /// Create an engine with the built-in tables and default settings.
    pub fn new() -> Self {
        Self::assemble(default_tables(), &Config::default())
    }

    /// Create an engine from configuration, loading the rules file it names.
    pub fn with_config(config: &Config) -> EngineResult<Self> {
        config.validate()?;
        let tables = match &config.rules.path {
            Some(path) if path.exists() => Arc::new(KeywordTables::load(path)?),
            Some(path) => {
                tracing::warn!(path = %path.display(), "Rules file not found, using built-in tables");
                default_tables()
            }
            None => default_tables(),
        };
        Ok(Self::assemble(tables, config))
    }

    /// Create an engine over the current tables of a store.
    ///
    /// Store tables were validated when they were installed.
    pub fn from_store(store: &RuleStore, config: &Config) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self::assemble(store.current(), config))
    }

    /// Create an engine from explicit tables and configuration.
    pub fn from_parts(tables: Arc<KeywordTables>, config: &Config) -> EngineResult<Self> {
        tables.validate()?;
        config.validate()?;
        Ok(Self::assemble(tables, config))
    }

    fn assemble(tables: Arc<KeywordTables>, config: &Config) -> Self {
        Self {
            analyzer: ComplexityAnalyzer::with_config(Arc::clone(&tables), config.analysis.clone()),
            matcher: AssigneeMatcher::with_config(Arc::clone(&tables), config.matching.clone()),
            decomposer: TaskDecomposer::new(Arc::clone(&tables)),
            builder: NaturalLanguageTaskBuilder::with_config(Arc::clone(&tables), config),
            tracker: BuildTracker::with_config(config.tracking.clone()),
            tables,
        }
    }

    /// Rule tables this engine runs on.
    pub fn tables(&self) -> &Arc<KeywordTables> {
        &self.tables
    }

    /// Score a task's complexity, priority and effort.
    pub fn analyze_complexity(
        &self,
        title: &str,
        description: &str,
    ) -> EngineResult<ComplexityResult> {
        self.analyzer.analyze(title, description)
    }

    /// Rank candidates for a task.
    pub fn suggest_assignees(
        &self,
        task: &TaskText,
        candidates: &[CandidateProfile],
        required_department: Option<&str>,
    ) -> EngineResult<AssigneeRanking> {
        task.validate()?;
        Ok(self.matcher.suggest(task, candidates, required_department))
    }

    /// Break a task into sub-tasks.
    ///
    /// Without an explicit estimate the task is analyzed first and its
    /// estimated hours are split.
    pub fn decompose_task(
        &self,
        task: &TaskText,
        estimated_hours: Option<f64>,
    ) -> EngineResult<Vec<SubtaskTemplate>> {
        task.validate()?;
        let hours = match estimated_hours {
            Some(h) if h.is_finite() && h >= 0.0 => h,
            Some(h) => {
                return Err(EngineError::invalid_input(format!(
                    "estimated hours must be a non-negative number, got {h}"
                )))
            }
            None => self.analyzer.analyze_text(task)?.estimated_hours,
        };
        let title = if task.title.trim().is_empty() { &task.description } else { &task.title };
        Ok(self.decomposer.decompose(title, hours))
    }

    /// Turn a free-text description into a task draft.
    pub fn build_task_from_description(
        &self,
        description: &str,
        candidates: Option<&[CandidateProfile]>,
        required_department: Option<&str>,
    ) -> EngineResult<TaskDraft> {
        self.builder.build(description, candidates, required_department)
    }

    /// Plan the tasks for a new feature.
    pub fn feature_plan(&self, name: &str, description: &str) -> EngineResult<FeaturePlan> {
        let text = TaskText::new(name, description);
        let complexity = self.analyzer.analyze_text(&text)?;
        let name = if name.trim().is_empty() { description.trim() } else { name.trim() };
        let tasks = self.decomposer.decompose(name, complexity.estimated_hours);
        Ok(FeaturePlan { name: name.to_string(), complexity, tasks })
    }

    /// Compute a project's build status.
    pub fn project_build_status(&self, snapshot: &ProjectSnapshot) -> EngineResult<BuildStatus> {
        self.tracker.status(snapshot)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Phase;

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_decompose_uses_analysis_estimate() {
        let engine = Engine::new();
        let task = TaskText::new("Fix typo in README", "");
        let analysis = engine.analyze_complexity(&task.title, &task.description).unwrap();
        let subtasks = engine.decompose_task(&task, None).unwrap();
        let total: f64 = subtasks.iter().map(|s| s.estimated_hours).sum();
        assert!((total - analysis.estimated_hours).abs() < 1e-9);
    }

    #[test]
    fn test_decompose_rejects_negative_hours() {
        let engine = Engine::new();
        let err = engine.decompose_task(&TaskText::new("Add cache", ""), Some(-2.0)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_feature_plan() {
        let plan = Engine::new().feature_plan("Build audit log", "Record every admin action").unwrap();
        assert_eq!(plan.tasks.len(), 4);
        assert_eq!(plan.tasks[0].phase, Phase::Design);
        assert!((plan.total_hours() - plan.complexity.estimated_hours).abs() < 1e-9);
        assert_eq!(plan.records().len(), 4);
    }

    #[test]
    fn test_with_config_loads_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        let mut tables = KeywordTables::default();
        tables.version = 7;
        std::fs::write(&path, tables.to_toml_string().unwrap()).unwrap();

        let mut config = Config::default();
        config.rules.path = Some(path);
        let engine = Engine::with_config(&config).unwrap();
        assert_eq!(engine.tables().version, 7);
    }

    #[test]
    fn test_missing_rules_file_falls_back() {
        let mut config = Config::default();
        config.rules.path = Some("/nonexistent/taskpilot/rules.toml".into());
        let engine = Engine::with_config(&config).unwrap();
        assert_eq!(engine.tables().version, KeywordTables::default().version);
    }

    #[test]
    fn test_with_config_rejects_invalid_settings() {
        let mut config = Config::default();
        config.analysis.high_weight = -3;
        assert!(Engine::with_config(&config).unwrap_err().is_invalid_input());

        let mut config = Config::default();
        config.general.title_max_len = 0;
        assert!(Engine::with_config(&config).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_from_parts_rejects_malformed_tables() {
        let mut tables = KeywordTables::default();
        tables.decomposition.patterns.clear();
        let err = Engine::from_parts(Arc::new(tables), &Config::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRules(_)));

        let mut tables = KeywordTables::default();
        tables.effort.clear();
        assert!(Engine::from_parts(Arc::new(tables), &Config::default()).is_err());

        assert!(Engine::from_parts(default_tables(), &Config::default()).is_ok());
    }

    #[test]
    fn test_from_store_rejects_invalid_settings() {
        let mut config = Config::default();
        config.tracking.blocked_penalty = -10;
        assert!(Engine::from_store(&RuleStore::with_defaults(), &config).is_err());
    }

    #[test]
    fn test_suggest_rejects_blank_task() {
        let err = Engine::new().suggest_assignees(&TaskText::default(), &[], None).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
