//! Engine Integration Tests
//!
//! End-to-end scenarios and properties of the public engine API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use taskpilot::core::{CandidateProfile, Priority, SkillTag, TaskRecord, TaskStatus, TaskText};
use taskpilot::{Engine, HealthStatus, ProjectSnapshot};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
}

fn snapshot(statuses: &[(TaskStatus, usize)], days: i64) -> ProjectSnapshot {
    let mut tasks = Vec::new();
    for &(status, n) in statuses {
        for _ in 0..n {
            tasks.push(match status {
                TaskStatus::Completed => TaskRecord::completed(start() + Duration::days(1)),
                other => TaskRecord::new(other),
            });
        }
    }
    ProjectSnapshot::new(tasks, start(), start() + Duration::days(days))
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_trivial_fix_is_low() {
        let result = Engine::new().analyze_complexity("Fix typo in README", "").unwrap();
        assert!(result.score <= 4, "score {}", result.score);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn test_architecture_migration_is_high() {
        let result = Engine::new()
            .analyze_complexity(
                "Refactor authentication architecture",
                "Critical migration needed",
            )
            .unwrap();
        assert!(result.score >= 8, "score {}", result.score);
        assert!(result.priority >= Priority::High);
    }

    #[test]
    fn test_frontend_candidate_ranks_first() {
        let candidates = vec![
            CandidateProfile::new("a", "Ana").with_skills([SkillTag::Frontend]),
            CandidateProfile::new("b", "Bo").with_skills([SkillTag::Backend]),
        ];
        let ranking = Engine::new()
            .suggest_assignees(&TaskText::new("Add React dashboard component", ""), &candidates, None)
            .unwrap();
        assert_eq!(ranking.ranked[0].candidate_id, "a");
        assert!(ranking.ranked[0].score > ranking.ranked[1].score);
    }

    #[test]
    fn test_urgent_description() {
        let draft = Engine::new()
            .build_task_from_description("This is urgent: fix the login bug ASAP", None, None)
            .unwrap();
        assert_eq!(draft.priority, Priority::Urgent);
    }

    #[test]
    fn test_velocity_and_completion() {
        let snap = snapshot(&[(TaskStatus::Completed, 5), (TaskStatus::Todo, 5)], 14);
        let status = Engine::new().project_build_status(&snap).unwrap();
        assert!((status.velocity - 2.5).abs() < 1e-9);
        assert!((status.completion_pct - 50.0).abs() < 1e-9);
        assert_eq!(status.predicted_completion, Some(start() + Duration::days(28)));
    }

    #[test]
    fn test_blocked_tasks_cost_health() {
        let snap = snapshot(
            &[(TaskStatus::Blocked, 3), (TaskStatus::Completed, 4), (TaskStatus::InProgress, 3)],
            14,
        );
        let status = Engine::new().project_build_status(&snap).unwrap();
        assert!(status.health_score <= 70);
        assert_eq!(status.deductions[0].points, 30);
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;

    const TEXTS: &[(&str, &str)] = &[
        ("Fix typo in README", ""),
        ("Refactor authentication architecture", "Critical migration needed"),
        ("Add React dashboard component", "Charts for the sales team"),
        ("", "Someone should look at the CI pipeline at some point"),
        ("Quarterly review", "x"),
    ];

    #[test]
    fn test_analysis_is_deterministic() {
        let engine = Engine::new();
        for (title, description) in TEXTS {
            let a = serde_json::to_string(&engine.analyze_complexity(title, description).unwrap())
                .unwrap();
            let b = serde_json::to_string(&engine.analyze_complexity(title, description).unwrap())
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_drafts_are_deterministic() {
        let engine = Engine::new();
        let pool = team();
        let a = engine.build_task_from_description(TEXTS[2].1, Some(pool.as_slice()), None).unwrap();
        let b = engine.build_task_from_description(TEXTS[2].1, Some(pool.as_slice()), None).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_bounds() {
        let engine = Engine::new();
        for (title, description) in TEXTS {
            let r = engine.analyze_complexity(title, description).unwrap();
            assert!((1..=10).contains(&r.score));
            assert!((0.0..=1.0).contains(&r.confidence));
        }
        for blocked in 0..=12 {
            let snap = snapshot(&[(TaskStatus::Blocked, blocked), (TaskStatus::Todo, 1)], 30);
            let status = engine.project_build_status(&snap).unwrap();
            assert!(status.health_score <= 100);
            assert!((0.0..=100.0).contains(&status.completion_pct));
        }
    }

    #[test]
    fn test_more_high_keywords_never_lowers_score() {
        let engine = Engine::new();
        let high = &engine.tables().complexity.high;
        let mut description = String::from("tidy up the module");
        let mut last = engine.analyze_complexity("Task", &description).unwrap().score;
        for keyword in high {
            description.push(' ');
            description.push_str(keyword);
            let score = engine.analyze_complexity("Task", &description).unwrap().score;
            assert!(score >= last, "adding '{keyword}' dropped {last} to {score}");
            last = score;
        }
        assert_eq!(last, 10);
    }

    #[test]
    fn test_ranking_order() {
        let mut pool = team();
        pool.push(CandidateProfile::new("aa", "Twin A").with_skills([SkillTag::Backend]));
        pool.push(CandidateProfile::new("ab", "Twin B").with_skills([SkillTag::Backend]));
        let ranking = Engine::new()
            .suggest_assignees(&TaskText::new("Build REST API endpoint", ""), &pool, Some("platform"))
            .unwrap();
        for pair in ranking.ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if (pair[0].score - pair[1].score).abs() < f64::EPSILON {
                assert!(pair[0].candidate_id < pair[1].candidate_id);
            }
        }
    }

    #[test]
    fn test_decomposition_hours_add_up() {
        let engine = Engine::new();
        for (title, description) in TEXTS {
            let task = TaskText::new(*title, *description);
            for hours in [None, Some(0.0), Some(7.0), Some(13.37)] {
                let subtasks = engine.decompose_task(&task, hours).unwrap();
                let expected = match hours {
                    Some(h) => h,
                    None => engine.analyze_complexity(title, description).unwrap().estimated_hours,
                };
                let total: f64 = subtasks.iter().map(|s| s.estimated_hours).sum();
                assert!((total - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_velocity() {
        let snap = snapshot(&[(TaskStatus::Todo, 4), (TaskStatus::InProgress, 2)], 21);
        let status = Engine::new().project_build_status(&snap).unwrap();
        assert!(status.velocity.abs() < f64::EPSILON);
        assert!(status.predicted_completion.is_none());
        assert!(status.on_track);
    }

    fn team() -> Vec<CandidateProfile> {
        vec![
            CandidateProfile::new("u3", "Cy")
                .with_skills([SkillTag::Backend, SkillTag::Database])
                .with_role("Backend Engineer")
                .with_department("Platform"),
            CandidateProfile::new("u1", "Ana").with_skills([SkillTag::Frontend]),
            CandidateProfile::new("u2", "Bo").with_skills([SkillTag::Backend]),
        ]
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

mod edge_cases {
    use super::*;

    #[test]
    fn test_blank_input_rejected() {
        let engine = Engine::new();
        assert!(engine.analyze_complexity("  ", "").unwrap_err().is_invalid_input());
        assert!(engine.build_task_from_description("", None, None).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_no_signal_uses_default_score() {
        let result = Engine::new().analyze_complexity("Quarterly review", "").unwrap();
        assert_eq!(result.score, 5);
        assert!(result.confidence <= 0.4);
    }

    #[test]
    fn test_empty_pool() {
        let ranking = Engine::new()
            .suggest_assignees(&TaskText::new("Add login", ""), &[], None)
            .unwrap();
        assert!(ranking.ranked.is_empty());
        assert!(ranking.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_project_rejected() {
        let snap = ProjectSnapshot::new(Vec::new(), start(), start() + Duration::days(7));
        assert!(Engine::new().project_build_status(&snap).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_completed_without_timestamp_rejected() {
        let snap = ProjectSnapshot::new(
            vec![TaskRecord::new(TaskStatus::Completed)],
            start(),
            start() + Duration::days(7),
        );
        assert!(Engine::new().project_build_status(&snap).is_err());
    }

    #[test]
    fn test_all_done_is_excellent() {
        let snap = snapshot(&[(TaskStatus::Completed, 8)], 14);
        let status = Engine::new().project_build_status(&snap).unwrap();
        assert_eq!(status.health_score, 100);
        assert_eq!(status.health_status, HealthStatus::Excellent);
        assert_eq!(status.predicted_completion, Some(start() + Duration::days(14)));
    }
}

// ============================================================================
// Rule Store
// ============================================================================

mod rule_store {
    use std::sync::Arc;
    use std::thread;

    use taskpilot::core::Config;
    use taskpilot::{KeywordTables, RuleStore};

    use super::*;

    #[test]
    fn test_concurrent_reads_during_swap() {
        let store = Arc::new(RuleStore::with_defaults());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let engine = Engine::from_store(&store, &Config::default()).unwrap();
                        let result = engine.analyze_complexity("Fix typo in README", "").unwrap();
                        assert!((1..=10).contains(&result.score));
                    }
                })
            })
            .collect();

        let mut tables = KeywordTables::default();
        tables.version += 1;
        store.replace(tables).unwrap();

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.current().version, KeywordTables::default().version + 1);
    }

    #[test]
    fn test_invalid_swap_keeps_current() {
        let store = RuleStore::with_defaults();
        let mut broken = KeywordTables::default();
        broken.effort.clear();
        assert!(store.replace(broken).is_err());
        assert!(!store.current().effort.is_empty());
    }

    #[test]
    fn test_alternate_tables() {
        let mut tables = KeywordTables::default();
        tables.complexity.high.push("quantum".to_string());
        let store = RuleStore::new(tables).unwrap();
        let engine = Engine::from_store(&store, &Config::default()).unwrap();
        let result = engine.analyze_complexity("Quantum scheduler", "").unwrap();
        assert_eq!(result.score, 8);
    }
}
