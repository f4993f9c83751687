//! Configuration management for taskpilot.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "TASKPILOT_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Rule table source
    pub rules: RulesConfig,

    /// Complexity scoring weights
    pub analysis: AnalysisConfig,

    /// Assignee matching weights
    pub matching: MatchingConfig,

    /// Build tracking penalties
    pub tracking: TrackingConfig,
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Maximum length of a generated task title
    pub title_max_len: usize,

    /// Maximum number of assignee suggestions kept on a draft
    pub max_suggestions: usize,
}

/// Where to load keyword tables from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// TOML rules file replacing the built-in tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Complexity scoring weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Score before any indicator is applied
    pub base_score: i32,

    /// Points per distinct high-tier keyword
    pub high_weight: i32,

    /// Maximum total contribution of the high tier
    pub high_cap: i32,

    /// Points per distinct medium-tier keyword
    pub medium_weight: i32,

    /// Points removed per distinct low-tier keyword
    pub low_weight: i32,

    /// Confidence with no words analyzed
    pub confidence_floor: f64,

    /// Confidence gained per analyzed word
    pub confidence_step: f64,

    /// Words beyond this count add no confidence
    pub confidence_word_cap: usize,

    /// Confidence never exceeds this
    pub confidence_ceiling: f64,
}

/// Assignee matching weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Weight of the skill overlap ratio
    pub skill_weight: f64,

    /// Bonus for matching the required department
    pub department_bonus: f64,

    /// Bonus for a role matching the dominant skill
    pub role_bonus: f64,

    /// Number of top scores averaged into the pool confidence
    pub confidence_top_n: usize,
}

/// Build tracking penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Health points lost per blocked task
    pub blocked_penalty: i64,

    /// Health points lost when the forecast misses the latest due date
    pub off_track_penalty: i64,

    /// Health points lost when progress has stalled after the first week
    pub stalled_penalty: i64,

    /// Completion percentage under which a project counts as stalled
    pub stalled_completion_pct: f64,

    /// Actual hours may exceed estimates by this factor and stay on track
    pub effort_tolerance: f64,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. The file named by `$TASKPILOT_CONFIG`
    /// 2. `.taskpilot.toml` in current directory
    /// 3. `~/.config/taskpilot/config.toml`
    /// 4. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from_file(Path::new(&path));
        }

        let local_config = PathBuf::from(".taskpilot.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&dir.join("config.toml"))
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that every setting keeps scores, confidences and health in range.
    pub fn validate(&self) -> EngineResult<()> {
        if self.general.title_max_len == 0 {
            return Err(invalid("general.title_max_len must be at least 1"));
        }

        let analysis = &self.analysis;
        for (name, value) in [
            ("analysis.high_weight", analysis.high_weight),
            ("analysis.high_cap", analysis.high_cap),
            ("analysis.medium_weight", analysis.medium_weight),
            ("analysis.low_weight", analysis.low_weight),
        ] {
            if value < 0 {
                return Err(invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        unit_interval("analysis.confidence_floor", analysis.confidence_floor)?;
        unit_interval("analysis.confidence_ceiling", analysis.confidence_ceiling)?;
        non_negative("analysis.confidence_step", analysis.confidence_step)?;
        if analysis.confidence_floor > analysis.confidence_ceiling {
            return Err(invalid("analysis.confidence_floor must not exceed confidence_ceiling"));
        }

        let matching = &self.matching;
        non_negative("matching.skill_weight", matching.skill_weight)?;
        non_negative("matching.department_bonus", matching.department_bonus)?;
        non_negative("matching.role_bonus", matching.role_bonus)?;

        let tracking = &self.tracking;
        for (name, value) in [
            ("tracking.blocked_penalty", tracking.blocked_penalty),
            ("tracking.off_track_penalty", tracking.off_track_penalty),
            ("tracking.stalled_penalty", tracking.stalled_penalty),
        ] {
            if value < 0 {
                return Err(invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        non_negative("tracking.stalled_completion_pct", tracking.stalled_completion_pct)?;
        if tracking.stalled_completion_pct > 100.0 {
            return Err(invalid("tracking.stalled_completion_pct must not exceed 100"));
        }
        non_negative("tracking.effort_tolerance", tracking.effort_tolerance)?;

        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskpilot"))
    }
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::invalid_input(format!("config: {}", msg.into()))
}

fn non_negative(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a non-negative number, got {value}")))
    }
}

fn unit_interval(name: &str, value: f64) -> EngineResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be between 0 and 1, got {value}")))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { title_max_len: 80, max_suggestions: 5 }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_score: 5,
            high_weight: 3,
            high_cap: 9,
            medium_weight: 1,
            low_weight: 1,
            confidence_floor: 0.4,
            confidence_step: 0.05,
            confidence_word_cap: 12,
            confidence_ceiling: 0.95,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { skill_weight: 0.7, department_bonus: 0.15, role_bonus: 0.1, confidence_top_n: 5 }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            blocked_penalty: 10,
            off_track_penalty: 20,
            stalled_penalty: 10,
            stalled_completion_pct: 10.0,
            effort_tolerance: 1.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.title_max_len, 80);
        assert_eq!(config.analysis.base_score, 5);
        assert!((config.matching.department_bonus - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.tracking.blocked_penalty, 10);
        assert!(config.rules.path.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [tracking]
            blocked_penalty = 5

            [matching]
            role_bonus = 0.05
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.tracking.blocked_penalty, 5);
        assert_eq!(config.tracking.off_track_penalty, 20);
        assert!((config.matching.role_bonus - 0.05).abs() < f64::EPSILON);
        assert!((config.matching.skill_weight - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.general, GeneralConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.general.title_max_len = 60;
        config.rules.path = Some(PathBuf::from("rules.toml"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    fn rejects(toml: &str) -> bool {
        let config: Config = toml::from_str(toml).unwrap();
        config.validate().is_err_and(|e| e.is_invalid_input())
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_title_len() {
        assert!(rejects("[general]\ntitle_max_len = 0"));
    }

    #[test]
    fn test_rejects_negative_analysis_weights() {
        assert!(rejects("[analysis]\nhigh_weight = -3"));
        assert!(rejects("[analysis]\nhigh_cap = -1"));
        assert!(rejects("[analysis]\nmedium_weight = -1"));
        assert!(rejects("[analysis]\nlow_weight = -2"));
    }

    #[test]
    fn test_rejects_confidence_out_of_range() {
        assert!(rejects("[analysis]\nconfidence_floor = -0.1"));
        assert!(rejects("[analysis]\nconfidence_ceiling = 1.5"));
        assert!(rejects("[analysis]\nconfidence_floor = 0.9\nconfidence_ceiling = 0.5"));
        assert!(rejects("[analysis]\nconfidence_step = -0.05"));
    }

    #[test]
    fn test_rejects_non_finite_floats() {
        assert!(rejects("[analysis]\nconfidence_floor = nan"));
        assert!(rejects("[analysis]\nconfidence_step = inf"));
        assert!(rejects("[matching]\nskill_weight = nan"));
        assert!(rejects("[tracking]\neffort_tolerance = inf"));
    }

    #[test]
    fn test_rejects_negative_matching_weights() {
        assert!(rejects("[matching]\nskill_weight = -0.7"));
        assert!(rejects("[matching]\ndepartment_bonus = -0.15"));
        assert!(rejects("[matching]\nrole_bonus = -0.1"));
    }

    #[test]
    fn test_rejects_negative_penalties() {
        assert!(rejects("[tracking]\nblocked_penalty = -10"));
        assert!(rejects("[tracking]\noff_track_penalty = -20"));
        assert!(rejects("[tracking]\nstalled_penalty = -1"));
        assert!(rejects("[tracking]\nstalled_completion_pct = 150.0"));
        assert!(rejects("[tracking]\neffort_tolerance = -1.0"));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\nhigh_weight = -3\n").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("high_weight"));
    }
}
