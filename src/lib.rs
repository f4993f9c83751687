//! # Taskpilot
//!
//! Heuristic task analysis and build tracking for project boards.
//!
//! Taskpilot reads task text and project snapshots and answers the questions
//! a planner asks every day: how big is this, who should take it, what are the
//! steps, and is the project going to land on time.
//!
//! ## Features
//!
//! - **Complexity**: keyword-tier scoring with priority, effort and confidence
//! - **Assignment**: candidates ranked by skill overlap, department and role
//! - **Decomposition**: phase-based sub-tasks whose hours add up exactly
//! - **Drafting**: structured tasks from a free-text description
//! - **Tracking**: velocity, completion forecast and a 0-100 health score
//!
//! ## Quick Start
//!
//! ```
//! use taskpilot::Engine;
//!
//! let engine = Engine::new();
//! let result = engine
//!     .analyze_complexity("Database migration", "Redesign the architecture")
//!     .unwrap();
//! assert_eq!(result.score, 10);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod engine;
pub mod error;
pub mod rules;
pub mod source;
pub mod text;

pub use crate::core::{
    CandidateProfile, Config, Priority, ProjectSnapshot, SkillTag, TaskRecord, TaskStatus,
    TaskText,
};
pub use engine::{
    AssigneeMatcher, AssigneeRanking, AssigneeSuggestion, BuildStatus, BuildTracker,
    ComplexityAnalyzer, ComplexityResult, Engine, FeaturePlan, HealthStatus,
    NaturalLanguageTaskBuilder, SubtaskTemplate, TaskDecomposer, TaskDraft,
};
pub use error::{EngineError, EngineResult};
pub use rules::{KeywordTables, RuleStore};
pub use source::{ProjectFile, ProjectSource, ReportWindow};

/// Version of taskpilot.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const APP_NAME: &str = "taskpilot";
