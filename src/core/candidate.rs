//! People who can be assigned to tasks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Skill category inferred from task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTag {
    Backend,
    Frontend,
    Devops,
    Security,
    Database,
    Testing,
    Documentation,
}

impl SkillTag {
    /// All skill tags in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Backend,
        Self::Frontend,
        Self::Devops,
        Self::Security,
        Self::Database,
        Self::Testing,
        Self::Documentation,
    ];

    /// Get the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Frontend => "frontend",
            Self::Devops => "devops",
            Self::Security => "security",
            Self::Database => "database",
            Self::Testing => "testing",
            Self::Documentation => "documentation",
        }
    }

    /// Parse a skill name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|tag| tag.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for SkillTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person who could take a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Stable identifier, also the ranking tie-breaker
    pub id: String,

    /// Name shown to users
    #[serde(default)]
    pub display_name: String,

    /// Skills this person covers
    #[serde(default)]
    pub skills: BTreeSet<SkillTag>,

    /// Free-form role, e.g. "Senior Backend Developer"
    #[serde(default)]
    pub role: String,

    /// Department name
    #[serde(default)]
    pub department: String,
}

impl CandidateProfile {
    /// Create a profile with no skills, role or department.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into(), ..Self::default() }
    }

    /// Add skills.
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillTag>) -> Self {
        self.skills.extend(skills);
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Whether this person belongs to `department` (case-insensitive).
    pub fn in_department(&self, department: &str) -> bool {
        let department = department.trim();
        !department.is_empty() && self.department.trim().eq_ignore_ascii_case(department)
    }
}
