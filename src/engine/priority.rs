//! Priority precedence between explicit urgency words and complexity.
//!
//! Order, strongest first:
//! 1. an urgent keyword makes the task urgent
//! 2. a high keyword lifts the task to at least high
//! 3. the complexity-derived priority stands when it is high
//! 4. a low keyword drops the task to low
//! 5. otherwise the complexity-derived priority stands

use serde::{Deserialize, Serialize};

use crate::core::Priority;
use crate::rules::UrgencyTiers;
use crate::text::Tokens;

/// Urgency keywords found in free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencySignals {
    pub urgent: Vec<String>,
    pub high: Vec<String>,
    pub low: Vec<String>,
}

impl UrgencySignals {
    /// Scan text for urgency keywords.
    pub fn scan(text: &str, tiers: &UrgencyTiers) -> Self {
        let tokens = Tokens::new(text);
        let found = |keywords: &[String]| {
            tokens.matching(keywords).into_iter().map(str::to_string).collect::<Vec<_>>()
        };
        Self { urgent: found(&tiers.urgent), high: found(&tiers.high), low: found(&tiers.low) }
    }

    /// Whether no urgency keyword was found.
    pub fn is_empty(&self) -> bool {
        self.urgent.is_empty() && self.high.is_empty() && self.low.is_empty()
    }
}

/// Combine urgency signals with the complexity-derived priority.
pub fn resolve_priority(signals: &UrgencySignals, derived: Priority) -> Priority {
    if !signals.urgent.is_empty() {
        Priority::Urgent
    } else if !signals.high.is_empty() {
        derived.max(Priority::High)
    } else if derived >= Priority::High {
        derived
    } else if !signals.low.is_empty() {
        Priority::Low
    } else {
        derived
    }
}
