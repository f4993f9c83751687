//! Turn a free-text description into a structured task draft.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::complexity::{ComplexityAnalyzer, ComplexityResult};
use super::decompose::{SubtaskTemplate, TaskDecomposer};
use super::matcher::{AssigneeMatcher, AssigneeRanking, AssigneeSuggestion};
use super::priority::{resolve_priority, UrgencySignals};
use crate::core::{CandidateProfile, Config, Priority, TaskText};
use crate::error::{EngineError, EngineResult};
use crate::rules::KeywordTables;

/// A task assembled from a description, ready for a caller to store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Title taken from the first sentence
    pub title: String,

    /// The description as given
    pub description: String,

    /// Final priority after urgency keywords were applied
    pub priority: Priority,

    /// Urgency keywords that were found
    pub urgency: UrgencySignals,

    /// Complexity analysis
    pub complexity: ComplexityResult,

    /// Estimated effort in hours
    pub estimated_hours: f64,

    /// Ranked assignees, when a pool was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<AssigneeRanking>,

    /// Best assignee, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_assignee: Option<AssigneeSuggestion>,

    /// Sub-task breakdown
    pub subtasks: Vec<SubtaskTemplate>,

    /// Overall confidence in the draft (0.0 - 1.0)
    pub confidence: f64,
}

/// Pipelines the analyzer, matcher and decomposer over a description.
#[derive(Debug, Clone)]
pub struct NaturalLanguageTaskBuilder {
    tables: Arc<KeywordTables>,
    analyzer: ComplexityAnalyzer,
    matcher: AssigneeMatcher,
    decomposer: TaskDecomposer,
    title_max_len: usize,
    max_suggestions: usize,
}

impl NaturalLanguageTaskBuilder {
    /// Create a builder with default settings.
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        Self::with_config(tables, &Config::default())
    }

    /// Create a builder from configuration.
    pub fn with_config(tables: Arc<KeywordTables>, config: &Config) -> Self {
        Self {
            analyzer: ComplexityAnalyzer::with_config(Arc::clone(&tables), config.analysis.clone()),
            matcher: AssigneeMatcher::with_config(Arc::clone(&tables), config.matching.clone()),
            decomposer: TaskDecomposer::new(Arc::clone(&tables)),
            tables,
            title_max_len: config.general.title_max_len,
            max_suggestions: config.general.max_suggestions,
        }
    }

    /// Build a draft from `description`.
    ///
    /// Assignees are ranked only when `candidates` is given.
    pub fn build(
        &self,
        description: &str,
        candidates: Option<&[CandidateProfile]>,
        required_department: Option<&str>,
    ) -> EngineResult<TaskDraft> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::invalid_input("task description is empty"));
        }

        let title = extract_title(description, self.title_max_len);
        let text = TaskText::new(title.clone(), description);

        let complexity = self.analyzer.analyze_text(&text)?;
        let urgency = UrgencySignals::scan(description, &self.tables.urgency);
        let priority = resolve_priority(&urgency, complexity.priority);

        let assignees = candidates.map(|pool| {
            let mut ranking = self.matcher.suggest(&text, pool, required_department);
            ranking.truncate(self.max_suggestions);
            ranking
        });
        let suggested_assignee = assignees.as_ref().and_then(|r| r.top().cloned());

        let subtasks = self.decomposer.decompose(&title, complexity.estimated_hours);

        let confidence = match &assignees {
            Some(ranking) => (complexity.confidence + ranking.confidence) / 2.0,
            None => complexity.confidence,
        };

        tracing::debug!(
            title = %title,
            priority = %priority,
            derived = %complexity.priority,
            subtasks = subtasks.len(),
            "Built task draft"
        );

        Ok(TaskDraft {
            title,
            description: description.to_string(),
            priority,
            urgency,
            estimated_hours: complexity.estimated_hours,
            complexity,
            assignees,
            suggested_assignee,
            subtasks,
            confidence,
        })
    }
}

/// Title from the first sentence of `description`, cut at a word boundary
/// to at most `max_len` characters.
pub fn extract_title(description: &str, max_len: usize) -> String {
    let text = description.trim();
    let sentence = first_sentence(text);
    let sentence = if sentence.is_empty() { text } else { sentence };

    if sentence.chars().count() <= max_len {
        return sentence.to_string();
    }

    let cut = sentence.char_indices().nth(max_len).map_or(sentence.len(), |(i, _)| i);
    let head = &sentence[..cut];
    let next_is_space = sentence[cut..].starts_with(char::is_whitespace);

    let trimmed = if next_is_space {
        head
    } else {
        head.rfind(char::is_whitespace).map_or(head, |i| &head[..i])
    };
    trimmed.trim_end().to_string()
}

fn first_sentence(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let ends = match c {
            '!' | '?' | '\n' => true,
            '.' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if ends {
            return text[..i].trim();
        }
    }
    text
}
