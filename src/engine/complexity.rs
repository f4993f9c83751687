//! Complexity, priority and effort estimates from task text.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{AnalysisConfig, Priority, TaskText};
use crate::error::EngineResult;
use crate::rules::KeywordTables;
use crate::text::Tokens;

/// Lowest possible complexity score.
pub const MIN_SCORE: u8 = 1;

/// Highest possible complexity score.
pub const MAX_SCORE: u8 = 10;

/// Complexity indicator tier, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{name}")
    }
}

/// Distinct indicator keywords found per tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMatches {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

impl TierMatches {
    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.medium.is_empty() && self.low.is_empty()
    }

    /// Keywords found in `tier`.
    pub fn tier(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::High => &self.high,
            Tier::Medium => &self.medium,
            Tier::Low => &self.low,
        }
    }

    /// Tier with the most matches; ties go to the more severe tier.
    pub fn dominant(&self) -> Option<Tier> {
        let mut best: Option<(Tier, usize)> = None;
        for tier in [Tier::High, Tier::Medium, Tier::Low] {
            let count = self.tier(tier).len();
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((tier, count));
            }
        }
        best.map(|(tier, _)| tier)
    }
}

/// Outcome of a complexity analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityResult {
    /// Difficulty from 1 to 10
    pub score: u8,

    /// Priority suggested by the score alone
    pub priority: Priority,

    /// Estimated effort in hours
    pub estimated_hours: f64,

    /// How much textual signal backed the result (0.0 - 1.0)
    pub confidence: f64,

    /// Human-readable explanation
    pub reasoning: String,

    /// Number of words analyzed
    pub word_count: usize,

    /// Indicator keywords that matched
    pub indicators: TierMatches,
}

/// Map a complexity score to the priority it suggests on its own.
///
/// Never returns [`Priority::Urgent`]; urgency only comes from explicit
/// keywords in free text.
pub fn priority_for_score(score: u8) -> Priority {
    match score {
        8.. => Priority::High,
        5..=7 => Priority::Medium,
        _ => Priority::Low,
    }
}

/// Scores task text against the complexity tiers.
#[derive(Debug, Clone)]
pub struct ComplexityAnalyzer {
    tables: Arc<KeywordTables>,
    config: AnalysisConfig,
}

impl ComplexityAnalyzer {
    /// Create an analyzer with default weights.
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        Self::with_config(tables, AnalysisConfig::default())
    }

    /// Create an analyzer with custom weights.
    pub fn with_config(tables: Arc<KeywordTables>, config: AnalysisConfig) -> Self {
        Self { tables, config }
    }

    /// Analyze a title and description.
    pub fn analyze(&self, title: &str, description: &str) -> EngineResult<ComplexityResult> {
        self.analyze_text(&TaskText::new(title, description))
    }

    /// Analyze task text.
    pub fn analyze_text(&self, text: &TaskText) -> EngineResult<ComplexityResult> {
        text.validate()?;

        let tokens = Tokens::new(&text.combined());
        let indicators = self.match_tiers(&tokens);
        let score = self.score(&indicators);
        let priority = priority_for_score(score);
        let estimated_hours = self.tables.hours_for_score(score);
        let confidence = self.confidence(tokens.len(), indicators.is_empty());
        let reasoning = reasoning(tokens.len(), &indicators, score);

        tracing::debug!(
            score,
            priority = %priority,
            words = tokens.len(),
            confidence,
            "Analyzed task complexity"
        );

        Ok(ComplexityResult {
            score,
            priority,
            estimated_hours,
            confidence,
            reasoning,
            word_count: tokens.len(),
            indicators,
        })
    }

    /// Find distinct indicator keywords per tier.
    ///
    /// Each token position counts for at most one tier, the most severe one
    /// that claims it.
    pub fn match_tiers(&self, tokens: &Tokens) -> TierMatches {
        let tiers = &self.tables.complexity;
        let mut claimed: BTreeSet<usize> = BTreeSet::new();
        let mut matches = TierMatches::default();

        for (tier, keywords) in
            [(Tier::High, &tiers.high), (Tier::Medium, &tiers.medium), (Tier::Low, &tiers.low)]
        {
            for keyword in keywords {
                let free: Vec<_> = tokens
                    .find(keyword)
                    .into_iter()
                    .filter(|span| span.clone().all(|i| !claimed.contains(&i)))
                    .collect();
                if free.is_empty() {
                    continue;
                }
                for span in free {
                    claimed.extend(span);
                }
                let found = match tier {
                    Tier::High => &mut matches.high,
                    Tier::Medium => &mut matches.medium,
                    Tier::Low => &mut matches.low,
                };
                if !found.contains(keyword) {
                    found.push(keyword.clone());
                }
            }
        }

        matches
    }

    fn score(&self, indicators: &TierMatches) -> u8 {
        let cfg = &self.config;
        let count = |v: &[String]| i32::try_from(v.len()).unwrap_or(i32::MAX);

        let high = count(&indicators.high).saturating_mul(cfg.high_weight).min(cfg.high_cap);
        let medium = count(&indicators.medium).saturating_mul(cfg.medium_weight);
        let low = count(&indicators.low).saturating_mul(cfg.low_weight);

        let raw = cfg.base_score.saturating_add(high).saturating_add(medium).saturating_sub(low);
        raw.clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE)) as u8
    }

    fn confidence(&self, word_count: usize, no_signal: bool) -> f64 {
        let cfg = &self.config;
        let words = word_count.min(cfg.confidence_word_cap) as f64;
        let mut confidence = (cfg.confidence_floor + cfg.confidence_step * words)
            .min(cfg.confidence_ceiling);
        if no_signal {
            confidence = confidence.min(cfg.confidence_floor);
        }
        confidence.clamp(0.0, 1.0)
    }
}

fn reasoning(word_count: usize, indicators: &TierMatches, score: u8) -> String {
    match indicators.dominant() {
        Some(tier) => format!(
            "Analyzed {} words; {} complexity indicators dominated ({}); score {}",
            word_count,
            tier,
            indicators.tier(tier).join(", "),
            score
        ),
        None => format!(
            "Analyzed {} words; no complexity indicators matched, using default score {}",
            word_count, score
        ),
    }
}
