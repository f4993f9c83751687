//! Rank candidate assignees by skill, department and role fit.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{CandidateProfile, MatchingConfig, SkillTag, TaskText};
use crate::rules::KeywordTables;
use crate::text::Tokens;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssigneeSuggestion {
    /// Candidate identifier
    pub candidate_id: String,

    /// Candidate display name
    pub display_name: String,

    /// Fit score (0.0 - 1.0)
    pub score: f64,

    /// Required skills this candidate covers
    pub matched_skills: BTreeSet<SkillTag>,
}

/// Ranked candidates for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssigneeRanking {
    /// Candidates, best first; equal scores ordered by id
    pub ranked: Vec<AssigneeSuggestion>,

    /// How well the pool covers the task (0.0 - 1.0)
    pub confidence: f64,

    /// Skills inferred from the task text
    pub required_skills: BTreeSet<SkillTag>,
}

impl AssigneeRanking {
    /// Best candidate, if any.
    pub fn top(&self) -> Option<&AssigneeSuggestion> {
        self.ranked.first()
    }

    /// Keep only the first `n` suggestions.
    pub fn truncate(&mut self, n: usize) {
        self.ranked.truncate(n);
    }
}

/// Skills a task needs, with how strongly each was signalled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillDemand {
    hits: Vec<(SkillTag, usize)>,
}

impl SkillDemand {
    /// Required skills.
    pub fn skills(&self) -> BTreeSet<SkillTag> {
        self.hits.iter().map(|(skill, _)| *skill).collect()
    }

    /// Skill with the most keyword hits; ties go to the earlier table entry.
    pub fn dominant(&self) -> Option<SkillTag> {
        let mut best: Option<(SkillTag, usize)> = None;
        for &(skill, hits) in &self.hits {
            if best.map_or(true, |(_, b)| hits > b) {
                best = Some((skill, hits));
            }
        }
        best.map(|(skill, _)| skill)
    }

    /// Whether no skill was detected.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Ranks people against a task's inferred skill needs.
#[derive(Debug, Clone)]
pub struct AssigneeMatcher {
    tables: Arc<KeywordTables>,
    config: MatchingConfig,
}

impl AssigneeMatcher {
    /// Create a matcher with default weights.
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        Self::with_config(tables, MatchingConfig::default())
    }

    /// Create a matcher with custom weights.
    pub fn with_config(tables: Arc<KeywordTables>, config: MatchingConfig) -> Self {
        Self { tables, config }
    }

    /// Infer which skills a piece of text calls for.
    pub fn required_skills(&self, text: &str) -> SkillDemand {
        let tokens = Tokens::new(text);
        let hits = self
            .tables
            .skills
            .iter()
            .filter_map(|rule| {
                let count = tokens.matching(&rule.keywords).len();
                (count > 0).then_some((rule.skill, count))
            })
            .collect();
        SkillDemand { hits }
    }

    /// Rank `candidates` for a task.
    ///
    /// An empty pool is not an error: the ranking is empty and the
    /// confidence is zero.
    pub fn suggest(
        &self,
        task: &TaskText,
        candidates: &[CandidateProfile],
        required_department: Option<&str>,
    ) -> AssigneeRanking {
        let demand = self.required_skills(&task.combined());
        let required_skills = demand.skills();

        if candidates.is_empty() {
            tracing::debug!("Empty candidate pool");
            return AssigneeRanking { ranked: Vec::new(), confidence: 0.0, required_skills };
        }

        let role_keywords: &[String] = demand
            .dominant()
            .and_then(|skill| self.tables.skill_rule(skill))
            .map(|rule| rule.roles.as_slice())
            .unwrap_or_default();

        let mut ranked: Vec<AssigneeSuggestion> = candidates
            .iter()
            .map(|candidate| {
                self.score_candidate(candidate, &required_skills, role_keywords, required_department)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        let top_n = self.config.confidence_top_n.max(1).min(ranked.len());
        let confidence = ranked[..top_n].iter().map(|s| s.score).sum::<f64>() / top_n as f64;

        tracing::debug!(
            candidates = ranked.len(),
            required = required_skills.len(),
            confidence,
            "Ranked assignees"
        );

        AssigneeRanking { ranked, confidence, required_skills }
    }

    fn score_candidate(
        &self,
        candidate: &CandidateProfile,
        required: &BTreeSet<SkillTag>,
        role_keywords: &[String],
        required_department: Option<&str>,
    ) -> AssigneeSuggestion {
        let matched_skills: BTreeSet<SkillTag> =
            required.intersection(&candidate.skills).copied().collect();
        let overlap = matched_skills.len() as f64 / required.len().max(1) as f64;

        let department_bonus = match required_department {
            Some(dept) if candidate.in_department(dept) => self.config.department_bonus,
            _ => 0.0,
        };

        let role_bonus = if !role_keywords.is_empty()
            && Tokens::new(&candidate.role).contains_any(role_keywords)
        {
            self.config.role_bonus
        } else {
            0.0
        };

        let score =
            (overlap * self.config.skill_weight + department_bonus + role_bonus).clamp(0.0, 1.0);

        AssigneeSuggestion {
            candidate_id: candidate.id.clone(),
            display_name: candidate.display_name.clone(),
            score,
            matched_skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::default_tables;

    fn matcher() -> AssigneeMatcher {
        AssigneeMatcher::new(default_tables())
    }

    #[test]
    fn test_required_skills_detected() {
        let demand = matcher().required_skills("Deploy the API server with Docker");
        let skills = demand.skills();
        assert!(skills.contains(&SkillTag::Backend));
        assert!(skills.contains(&SkillTag::Devops));
        assert!(!skills.contains(&SkillTag::Frontend));
    }

    #[test]
    fn test_frontend_candidate_ranks_first() {
        let candidates = vec![
            CandidateProfile::new("a", "Alice").with_skills([SkillTag::Frontend]),
            CandidateProfile::new("b", "Bob").with_skills([SkillTag::Backend]),
        ];
        let ranking = matcher().suggest(
            &TaskText::new("Add React dashboard component", ""),
            &candidates,
            None,
        );
        assert_eq!(ranking.ranked[0].candidate_id, "a");
        assert!(ranking.ranked[0].score > ranking.ranked[1].score);
        assert!(ranking.ranked[0].matched_skills.contains(&SkillTag::Frontend));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let candidates = vec![
            CandidateProfile::new("u3", "C"),
            CandidateProfile::new("u1", "A"),
            CandidateProfile::new("u2", "B"),
        ];
        let ranking = matcher().suggest(&TaskText::new("Plan offsite", ""), &candidates, None);
        let ids: Vec<_> = ranking.ranked.iter().map(|s| s.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_department_and_role_bonus() {
        let candidates = vec![
            CandidateProfile::new("x", "X")
                .with_skills([SkillTag::Backend])
                .with_role("Backend Developer")
                .with_department("Platform"),
            CandidateProfile::new("y", "Y").with_skills([SkillTag::Backend]),
        ];
        let ranking = matcher().suggest(
            &TaskText::new("Build the backend API", ""),
            &candidates,
            Some("platform"),
        );
        assert_eq!(ranking.ranked[0].candidate_id, "x");
        assert!((ranking.ranked[0].score - 0.95).abs() < 1e-9);
        assert!((ranking.ranked[1].score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pool() {
        let ranking = matcher().suggest(&TaskText::new("Add login form", ""), &[], None);
        assert!(ranking.ranked.is_empty());
        assert_eq!(ranking.confidence, 0.0);
        assert!(ranking.top().is_none());
    }

    #[test]
    fn test_confidence_averages_top_five() {
        let candidates: Vec<_> = (0..7)
            .map(|i| {
                let profile = CandidateProfile::new(format!("c{i}"), "");
                if i < 5 {
                    profile.with_skills([SkillTag::Testing])
                } else {
                    profile
                }
            })
            .collect();
        let ranking =
            matcher().suggest(&TaskText::new("Raise test coverage", ""), &candidates, None);
        assert_eq!(ranking.ranked.len(), 7);
        assert!((ranking.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_scores_bounded() {
        let config = MatchingConfig { role_bonus: 0.5, department_bonus: 0.5, ..Default::default() };
        let matcher = AssigneeMatcher::with_config(default_tables(), config);
        let candidates = vec![CandidateProfile::new("z", "Z")
            .with_skills([SkillTag::Security])
            .with_role("Security engineer")
            .with_department("Sec")];
        let ranking =
            matcher.suggest(&TaskText::new("Security audit", ""), &candidates, Some("Sec"));
        assert!((ranking.ranked[0].score - 1.0).abs() < f64::EPSILON);
    }
}
