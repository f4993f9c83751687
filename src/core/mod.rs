//! Core types and configuration for taskpilot.
//!
//! This module contains the plain value types the engine consumes (task
//! text, task records, project snapshots, candidate profiles) and the
//! application configuration.

mod candidate;
mod config;
mod task;

pub use candidate::{CandidateProfile, SkillTag};
pub use config::{
    AnalysisConfig, Config, GeneralConfig, MatchingConfig, RulesConfig, TrackingConfig, CONFIG_ENV,
};
pub use task::{Priority, ProjectSnapshot, TaskRecord, TaskStatus, TaskText};
