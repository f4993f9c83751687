//! Keyword tables driving every heuristic in the engine.
//!
//! Tables are plain data: they can be loaded from TOML, validated, and
//! swapped as a whole through [`super::RuleStore`]. Components never
//! mutate them.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Priority, SkillTag};
use crate::error::{EngineError, EngineResult};
use crate::text::tokenize;

/// Current version of the built-in tables.
pub const DEFAULT_RULES_VERSION: u32 = 1;

/// Tolerance used when checking that step fractions sum to one.
const FRACTION_TOLERANCE: f64 = 1e-9;

/// Work phase a sub-task belongs to, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Design,
    Implement,
    Test,
    Document,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Design => "design",
            Self::Implement => "implement",
            Self::Test => "test",
            Self::Document => "document",
        };
        write!(f, "{name}")
    }
}

/// Decomposition template family selected by a task's leading verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternTag {
    /// New work: design, implement, test, document
    Build,
    /// Defects: investigate, fix, test
    Fix,
    /// Restructuring: plan, refactor, verify, document
    Refactor,
}

impl PatternTag {
    /// All pattern tags.
    pub const ALL: [Self; 3] = [Self::Build, Self::Fix, Self::Refactor];
}

impl std::fmt::Display for PatternTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
        };
        write!(f, "{name}")
    }
}

/// Versioned rule data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTables {
    /// Rule set version
    pub version: u32,

    /// Complexity indicator tiers
    pub complexity: ComplexityTiers,

    /// Skill categories
    pub skills: Vec<SkillRule>,

    /// Urgency keyword tiers
    pub urgency: UrgencyTiers,

    /// Decomposition templates
    pub decomposition: DecompositionRules,

    /// Effort step table, ordered by score
    pub effort: Vec<EffortStep>,
}

/// Complexity indicator tiers. Tiers must not share keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityTiers {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

/// Keywords signalling one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRule {
    /// Skill inferred when a keyword matches
    pub skill: SkillTag,

    /// Keywords in task text
    pub keywords: Vec<String>,

    /// Keywords in a candidate's role that suit this skill
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Urgency keyword tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyTiers {
    pub urgent: Vec<String>,
    pub high: Vec<String>,
    pub low: Vec<String>,
}

/// Decomposition templates and their trigger verbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionRules {
    /// Pattern used when no verb matches
    pub default: PatternTag,

    /// One entry per pattern tag
    pub patterns: Vec<DecompositionPattern>,
}

/// A template family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionPattern {
    /// Which family this is
    pub tag: PatternTag,

    /// Verbs selecting this family
    pub verbs: Vec<String>,

    /// Ordered sub-task steps
    pub steps: Vec<PhaseStep>,
}

/// One step of a decomposition template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseStep {
    /// Verb used in the sub-task title, e.g. "Investigate"
    pub label: String,

    /// Phase this step belongs to
    pub phase: Phase,

    /// Share of the parent estimate
    pub fraction: f64,

    /// Suggested priority for the sub-task
    pub priority: Priority,

    /// What the sub-task covers
    pub description: String,
}

/// Hours estimated for scores up to `max_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortStep {
    pub max_score: u8,
    pub hours: f64,
}

impl KeywordTables {
    /// Load and validate tables from a TOML file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate tables from TOML.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let tables: Self = toml::from_str(content)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> EngineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> EngineResult<()> {
        self.validate_complexity()?;
        self.validate_skills()?;
        check_keywords("urgency.urgent", &self.urgency.urgent)?;
        check_keywords("urgency.high", &self.urgency.high)?;
        check_keywords("urgency.low", &self.urgency.low)?;
        self.validate_decomposition()?;
        self.validate_effort()
    }

    /// Estimated hours for a complexity score.
    pub fn hours_for_score(&self, score: u8) -> f64 {
        self.effort
            .iter()
            .find(|step| score <= step.max_score)
            .or_else(|| self.effort.last())
            .map_or(0.0, |step| step.hours)
    }

    /// Template for a pattern tag.
    pub fn pattern(&self, tag: PatternTag) -> Option<&DecompositionPattern> {
        self.decomposition.patterns.iter().find(|p| p.tag == tag)
    }

    /// Keyword rule for a skill.
    pub fn skill_rule(&self, skill: SkillTag) -> Option<&SkillRule> {
        self.skills.iter().find(|rule| rule.skill == skill)
    }

    fn validate_complexity(&self) -> EngineResult<()> {
        let tiers = [
            ("complexity.high", &self.complexity.high),
            ("complexity.medium", &self.complexity.medium),
            ("complexity.low", &self.complexity.low),
        ];

        let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
        for (name, keywords) in tiers {
            check_keywords(name, keywords)?;
            let normalized: BTreeSet<Vec<String>> = keywords.iter().map(|k| tokenize(k)).collect();
            if let Some(dup) = normalized.iter().find(|k| seen.contains(*k)) {
                return Err(EngineError::InvalidRules(format!(
                    "keyword '{}' appears in more than one complexity tier",
                    dup.join(" ")
                )));
            }
            seen.extend(normalized);
        }
        Ok(())
    }

    fn validate_skills(&self) -> EngineResult<()> {
        let mut seen = BTreeSet::new();
        for rule in &self.skills {
            if !seen.insert(rule.skill) {
                return Err(EngineError::InvalidRules(format!(
                    "skill '{}' is defined more than once",
                    rule.skill
                )));
            }
            check_keywords(&format!("skills.{}", rule.skill), &rule.keywords)?;
            if rule.roles.iter().any(|r| tokenize(r).is_empty()) {
                return Err(EngineError::InvalidRules(format!(
                    "skills.{} has an empty role keyword",
                    rule.skill
                )));
            }
        }
        Ok(())
    }

    fn validate_decomposition(&self) -> EngineResult<()> {
        for tag in PatternTag::ALL {
            let count = self.decomposition.patterns.iter().filter(|p| p.tag == tag).count();
            if count != 1 {
                return Err(EngineError::InvalidRules(format!(
                    "decomposition pattern '{tag}' must be defined exactly once (found {count})"
                )));
            }
        }

        for pattern in &self.decomposition.patterns {
            check_keywords(&format!("decomposition.{}.verbs", pattern.tag), &pattern.verbs)?;

            if pattern.steps.is_empty() {
                return Err(EngineError::InvalidRules(format!(
                    "decomposition pattern '{}' has no steps",
                    pattern.tag
                )));
            }
            if pattern.steps.iter().any(|s| !(s.fraction > 0.0 && s.fraction.is_finite())) {
                return Err(EngineError::InvalidRules(format!(
                    "decomposition pattern '{}' has a non-positive fraction",
                    pattern.tag
                )));
            }
            let total: f64 = pattern.steps.iter().map(|s| s.fraction).sum();
            if (total - 1.0).abs() > FRACTION_TOLERANCE {
                return Err(EngineError::InvalidRules(format!(
                    "decomposition pattern '{}' fractions sum to {total}, expected 1",
                    pattern.tag
                )));
            }
            if pattern.steps.windows(2).any(|w| w[0].phase > w[1].phase) {
                return Err(EngineError::InvalidRules(format!(
                    "decomposition pattern '{}' lists phases out of order",
                    pattern.tag
                )));
            }
        }
        Ok(())
    }

    fn validate_effort(&self) -> EngineResult<()> {
        let Some(last) = self.effort.last() else {
            return Err(EngineError::InvalidRules("effort table is empty".to_string()));
        };
        if last.max_score < 10 {
            return Err(EngineError::InvalidRules("effort table must cover score 10".to_string()));
        }
        if self.effort.iter().any(|s| !(s.hours > 0.0 && s.hours.is_finite())) {
            return Err(EngineError::InvalidRules("effort hours must be positive".to_string()));
        }
        let ordered = self
            .effort
            .windows(2)
            .all(|w| w[0].max_score < w[1].max_score && w[0].hours <= w[1].hours);
        if !ordered {
            return Err(EngineError::InvalidRules(
                "effort steps must increase in score and never decrease in hours".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_keywords(table: &str, keywords: &[String]) -> EngineResult<()> {
    if keywords.iter().any(|k| tokenize(k).is_empty()) {
        return Err(EngineError::InvalidRules(format!("{table} contains an empty keyword")));
    }
    Ok(())
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn step(label: &str, phase: Phase, fraction: f64, priority: Priority, description: &str) -> PhaseStep {
    PhaseStep {
        label: label.to_string(),
        phase,
        fraction,
        priority,
        description: description.to_string(),
    }
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            version: DEFAULT_RULES_VERSION,
            complexity: ComplexityTiers {
                high: words(&[
                    "architecture",
                    "refactor",
                    "migration",
                    "integration",
                    "critical",
                    "redesign",
                    "overhaul",
                    "distributed",
                ]),
                medium: words(&[
                    "feature",
                    "enhancement",
                    "improvement",
                    "update",
                    "implement",
                    "support",
                ]),
                low: words(&[
                    "fix",
                    "bug",
                    "typo",
                    "documentation",
                    "comment",
                    "cleanup",
                    "rename",
                    "tweak",
                ]),
            },
            skills: vec![
                SkillRule {
                    skill: SkillTag::Backend,
                    keywords: words(&[
                        "api", "backend", "server", "database", "sql", "flask", "python",
                        "endpoint",
                    ]),
                    roles: words(&["developer", "engineer", "backend"]),
                },
                SkillRule {
                    skill: SkillTag::Frontend,
                    keywords: words(&[
                        "ui",
                        "frontend",
                        "html",
                        "css",
                        "javascript",
                        "typescript",
                        "react",
                        "vue",
                    ]),
                    roles: words(&["developer", "engineer", "frontend", "designer"]),
                },
                SkillRule {
                    skill: SkillTag::Devops,
                    keywords: words(&[
                        "ci/cd",
                        "deploy",
                        "docker",
                        "kubernetes",
                        "infrastructure",
                        "pipeline",
                    ]),
                    roles: words(&["devops", "sre", "operations", "infrastructure", "platform"]),
                },
                SkillRule {
                    skill: SkillTag::Security,
                    keywords: words(&[
                        "security",
                        "vulnerability",
                        "authentication",
                        "authorization",
                    ]),
                    roles: words(&["security"]),
                },
                SkillRule {
                    skill: SkillTag::Database,
                    keywords: words(&[
                        "database",
                        "sql",
                        "migration",
                        "schema",
                        "postgres",
                        "sqlite",
                    ]),
                    roles: words(&["dba", "database", "data"]),
                },
                SkillRule {
                    skill: SkillTag::Testing,
                    keywords: words(&["test", "testing", "qa", "quality", "coverage"]),
                    roles: words(&["qa", "test", "quality"]),
                },
                SkillRule {
                    skill: SkillTag::Documentation,
                    keywords: words(&["docs", "documentation", "readme", "guide"]),
                    roles: words(&["writer", "documentation", "docs"]),
                },
            ],
            urgency: UrgencyTiers {
                urgent: words(&["urgent", "asap", "critical", "emergency", "immediately"]),
                high: words(&["important", "high", "blocking", "blocker"]),
                low: words(&["minor", "low", "later", "nice to have", "someday"]),
            },
            decomposition: DecompositionRules {
                default: PatternTag::Build,
                patterns: vec![
                    DecompositionPattern {
                        tag: PatternTag::Build,
                        verbs: words(&["implement", "create", "build", "add", "develop"]),
                        steps: vec![
                            step(
                                "Design",
                                Phase::Design,
                                0.2,
                                Priority::High,
                                "Create technical design and implementation plan",
                            ),
                            step(
                                "Implement",
                                Phase::Implement,
                                0.5,
                                Priority::High,
                                "Develop the main features and functionality",
                            ),
                            step(
                                "Test",
                                Phase::Test,
                                0.2,
                                Priority::Medium,
                                "Create unit and integration tests",
                            ),
                            step(
                                "Document",
                                Phase::Document,
                                0.1,
                                Priority::Low,
                                "Write documentation and usage examples",
                            ),
                        ],
                    },
                    DecompositionPattern {
                        tag: PatternTag::Fix,
                        verbs: words(&["fix", "bug", "issue", "repair"]),
                        steps: vec![
                            step(
                                "Investigate",
                                Phase::Design,
                                0.25,
                                Priority::High,
                                "Identify root cause and impact",
                            ),
                            step("Fix", Phase::Implement, 0.5, Priority::High, "Implement the fix"),
                            step(
                                "Test",
                                Phase::Test,
                                0.25,
                                Priority::Medium,
                                "Verify the fix and prevent regression",
                            ),
                        ],
                    },
                    DecompositionPattern {
                        tag: PatternTag::Refactor,
                        verbs: words(&["refactor", "restructure", "rework"]),
                        steps: vec![
                            step(
                                "Plan",
                                Phase::Design,
                                0.2,
                                Priority::High,
                                "Map affected code and plan the change",
                            ),
                            step(
                                "Refactor",
                                Phase::Implement,
                                0.5,
                                Priority::High,
                                "Restructure the code without changing behavior",
                            ),
                            step(
                                "Verify",
                                Phase::Test,
                                0.2,
                                Priority::Medium,
                                "Confirm behavior is unchanged",
                            ),
                            step(
                                "Document",
                                Phase::Document,
                                0.1,
                                Priority::Low,
                                "Update documentation for the new structure",
                            ),
                        ],
                    },
                ],
            },
            effort: vec![
                EffortStep { max_score: 2, hours: 2.0 },
                EffortStep { max_score: 4, hours: 6.0 },
                EffortStep { max_score: 6, hours: 12.0 },
                EffortStep { max_score: 8, hours: 20.0 },
                EffortStep { max_score: 10, hours: 40.0 },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        KeywordTables::default().validate().unwrap();
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let mut tables = KeywordTables::default();
        tables.complexity.medium.push("Refactor".to_string());
        let err = tables.validate().unwrap_err();
        assert!(err.to_string().contains("refactor"));
    }

    #[test]
    fn test_fraction_sum_checked() {
        let mut tables = KeywordTables::default();
        tables.decomposition.patterns[1].steps[0].fraction = 0.5;
        assert!(matches!(tables.validate(), Err(EngineError::InvalidRules(_))));
    }

    #[test]
    fn test_missing_pattern_rejected() {
        let mut tables = KeywordTables::default();
        tables.decomposition.patterns.retain(|p| p.tag != PatternTag::Refactor);
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_phase_order_checked() {
        let mut tables = KeywordTables::default();
        tables.decomposition.patterns[0].steps.swap(0, 3);
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_effort_steps_monotonic() {
        let tables = KeywordTables::default();
        let hours: Vec<f64> = (1..=10).map(|s| tables.hours_for_score(s)).collect();
        assert!(hours.windows(2).all(|w| w[0] <= w[1]));
        assert!(hours.iter().all(|h| *h > 0.0));

        let mut broken = KeywordTables::default();
        broken.effort.pop();
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let tables = KeywordTables::default();
        let toml = tables.to_toml_string().unwrap();
        assert!(toml.contains("version = 1"));
        let parsed = KeywordTables::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, tables);
    }

    #[test]
    fn test_lookup_helpers() {
        let tables = KeywordTables::default();
        assert_eq!(tables.pattern(PatternTag::Fix).unwrap().steps.len(), 3);
        assert!(tables.skill_rule(SkillTag::Frontend).unwrap().keywords.contains(&"react".into()));
    }
}
