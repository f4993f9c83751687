//! Project velocity, completion forecast and health.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ProjectSnapshot, TaskStatus, TrackingConfig};
use crate::error::EngineResult;

const SECONDS_PER_WEEK: f64 = 7.0 * 24.0 * 60.0 * 60.0;

/// Health band derived from the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// 90 and above
    Excellent,
    /// 75 - 89
    Good,
    /// 60 - 74
    Fair,
    /// Below 60
    Poor,
}

impl HealthStatus {
    /// Band for a health score.
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            75..=89 => Self::Good,
            60..=74 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        };
        write!(f, "{name}")
    }
}

/// Tasks per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub review: usize,
    pub completed: usize,
    pub blocked: usize,
}

impl StatusCounts {
    fn tally<'a>(statuses: impl IntoIterator<Item = &'a TaskStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Review => counts.review += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Blocked => counts.blocked += 1,
            }
        }
        counts
    }
}

/// A deduction applied to the health score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDeduction {
    /// Why points were taken
    pub reason: String,
    /// Points taken
    pub points: i64,
}

/// Build tracking result for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStatus {
    /// Number of tasks
    pub total_tasks: usize,

    /// Tasks per status
    pub counts: StatusCounts,

    /// Completed share of tasks (0.0 - 100.0)
    pub completion_pct: f64,

    /// Window length in weeks, at least one day
    pub weeks_elapsed: f64,

    /// Completed tasks per week
    pub velocity: f64,

    /// Forecast completion; absent when nothing was completed
    pub predicted_completion: Option<DateTime<Utc>>,

    /// Latest due date among tasks
    pub latest_due: Option<DateTime<Utc>>,

    /// Whether the forecast meets the latest due date
    pub on_track: bool,

    /// Sum of estimates in hours
    pub total_estimated_hours: f64,

    /// Sum of logged hours
    pub total_actual_hours: f64,

    /// Whether logged hours stay within tolerance of the estimates
    pub effort_on_track: bool,

    /// Health from 0 to 100
    pub health_score: u8,

    /// Health band
    pub health_status: HealthStatus,

    /// Deductions in the order they were applied
    pub deductions: Vec<HealthDeduction>,
}

/// Computes build status from project snapshots.
#[derive(Debug, Clone, Default)]
pub struct BuildTracker {
    config: TrackingConfig,
}

impl BuildTracker {
    /// Create a tracker with default penalties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with custom penalties.
    pub fn with_config(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// Compute the build status of a project.
    pub fn status(&self, snapshot: &ProjectSnapshot) -> EngineResult<BuildStatus> {
        snapshot.validate()?;

        let total_tasks = snapshot.tasks.len();
        let counts = StatusCounts::tally(snapshot.tasks.iter().map(|t| &t.status));
        let completion_pct = 100.0 * counts.completed as f64 / total_tasks as f64;

        let days = (snapshot.window_end - snapshot.window_start).num_days();
        let weeks_elapsed = (days as f64 / 7.0).max(1.0 / 7.0);
        let velocity = counts.completed as f64 / weeks_elapsed;

        let predicted_completion = (velocity > 0.0).then(|| {
            let remaining = (total_tasks - counts.completed) as f64;
            forecast(snapshot.window_end, remaining / velocity)
        });

        let latest_due = snapshot.tasks.iter().filter_map(|t| t.due_at).max();
        let on_track = match (predicted_completion, latest_due) {
            (Some(predicted), Some(due)) => predicted <= due,
            _ => true,
        };

        let total_estimated_hours: f64 = snapshot.tasks.iter().map(|t| t.estimated_hours).sum();
        let total_actual_hours: f64 = snapshot.tasks.iter().map(|t| t.actual_hours).sum();
        let effort_on_track = total_estimated_hours <= 0.0
            || total_actual_hours <= total_estimated_hours * self.config.effort_tolerance;

        let deductions = self.deductions(&counts, on_track, completion_pct, weeks_elapsed);
        let lost = deductions.iter().fold(0_i64, |acc, d| acc.saturating_add(d.points));
        let health_score = 100_i64.saturating_sub(lost).clamp(0, 100) as u8;
        let health_status = HealthStatus::from_score(health_score);

        tracing::debug!(
            tasks = total_tasks,
            completed = counts.completed,
            velocity,
            health = health_score,
            "Computed build status"
        );

        Ok(BuildStatus {
            total_tasks,
            counts,
            completion_pct,
            weeks_elapsed,
            velocity,
            predicted_completion,
            latest_due,
            on_track,
            total_estimated_hours,
            total_actual_hours,
            effort_on_track,
            health_score,
            health_status,
            deductions,
        })
    }

    fn deductions(
        &self,
        counts: &StatusCounts,
        on_track: bool,
        completion_pct: f64,
        weeks_elapsed: f64,
    ) -> Vec<HealthDeduction> {
        let cfg = &self.config;
        let mut deductions = Vec::new();

        if counts.blocked > 0 {
            let blocked = i64::try_from(counts.blocked).unwrap_or(i64::MAX);
            deductions.push(HealthDeduction {
                reason: format!("{} blocked task(s)", counts.blocked),
                points: blocked.saturating_mul(cfg.blocked_penalty),
            });
        }

        if !on_track {
            deductions.push(HealthDeduction {
                reason: "forecast completion is after the latest due date".to_string(),
                points: cfg.off_track_penalty,
            });
        }

        if completion_pct < cfg.stalled_completion_pct && weeks_elapsed > 1.0 {
            deductions.push(HealthDeduction {
                reason: format!(
                    "only {:.1}% complete after {:.1} weeks",
                    completion_pct, weeks_elapsed
                ),
                points: cfg.stalled_penalty,
            });
        }

        deductions
    }
}

fn forecast(from: DateTime<Utc>, weeks: f64) -> DateTime<Utc> {
    let seconds = (weeks * SECONDS_PER_WEEK).round();
    // Absurdly long forecasts saturate instead of overflowing.
    if !seconds.is_finite() || seconds >= i64::MAX as f64 {
        return DateTime::<Utc>::MAX_UTC;
    }
    TimeDelta::try_seconds(seconds as i64)
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
