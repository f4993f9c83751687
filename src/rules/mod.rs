//! Rule data for the task engine.
//!
//! [`KeywordTables`] hold every keyword list and template the analyzers use.
//! [`RuleStore`] hands out immutable snapshots and swaps whole tables.

mod store;
mod tables;

pub use store::{default_tables, RuleStore};
pub use tables::{
    ComplexityTiers, DecompositionPattern, DecompositionRules, EffortStep, KeywordTables,
    PatternTag, Phase, PhaseStep, SkillRule, UrgencyTiers, DEFAULT_RULES_VERSION,
};
