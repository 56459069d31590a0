//! Oscillation and tension detection over a belief's revision history.
//!
//! A belief whose weight keeps reversing direction is in unresolved tension.
//! The reason text of the latest revisions is checked against a small table
//! of opposing keyword pairs to name the tension. This is literal substring
//! matching and can be swapped for a custom rule table.

use serde::{Deserialize, Serialize};

use crate::types::{BeliefNode, BeliefRevision};

/// Oscillations at or above this count mark a belief as unresolved.
pub const UNRESOLVED_OSCILLATIONS: usize = 3;

/// Number of trailing revisions inspected for a tension reason.
const REASON_WINDOW: usize = 3;

/// A pair of opposing keywords that names a tension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensionRule {
    /// Label reported when the rule matches
    pub label: String,
    /// First keyword (lowercase)
    pub first: String,
    /// Second keyword (lowercase)
    pub second: String,
}

impl TensionRule {
    /// Create a new rule.
    pub fn new(label: &str, first: &str, second: &str) -> Self {
        Self {
            label: label.to_string(),
            first: first.to_lowercase(),
            second: second.to_lowercase(),
        }
    }
}

/// Result of analyzing a revision history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionReport {
    /// Adjacent revision pairs whose directions differ
    pub oscillation_count: usize,
    /// Max minus min weight across the history
    pub amplitude: u8,
    /// Whether the belief is in unresolved tension
    pub unresolved: bool,
    /// 1.0 for a stable belief, falling by 0.1 per oscillation
    pub stability_score: f64,
    /// Named tension, if any rule matched
    pub tension_reason: Option<String>,
}

impl TensionReport {
    fn stable() -> Self {
        Self {
            oscillation_count: 0,
            amplitude: 0,
            unresolved: false,
            stability_score: 1.0,
            tension_reason: None,
        }
    }
}

/// Detects oscillation in belief revision histories.
#[derive(Debug, Clone)]
pub struct TensionAnalyzer {
    rules: Vec<TensionRule>,
}

impl TensionAnalyzer {
    /// Create an analyzer with the default rule table.
    pub fn new() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }

    /// Create an analyzer with a custom rule table.
    pub fn with_rules(rules: Vec<TensionRule>) -> Self {
        Self { rules }
    }

    /// Default keyword pairs, checked in order.
    pub fn default_rules() -> Vec<TensionRule> {
        vec![
            TensionRule::new("logic-vs-values", "logic", "values"),
            TensionRule::new("theory-vs-practice", "theory", "practice"),
            TensionRule::new("growth-vs-safety", "growth", "safety"),
            TensionRule::new("self-vs-other", "self", "other"),
        ]
    }

    /// Registered rules.
    pub fn rules(&self) -> &[TensionRule] {
        &self.rules
    }

    /// Analyze a belief.
    pub fn analyze_belief(&self, belief: &BeliefNode) -> TensionReport {
        self.analyze(belief.revision_history())
    }

    /// Analyze a revision history.
    pub fn analyze(&self, history: &[BeliefRevision]) -> TensionReport {
        if history.is_empty() {
            return TensionReport::stable();
        }

        let mut sorted: Vec<&BeliefRevision> = history.iter().collect();
        // Stable sort keeps insertion order for equal timestamps.
        sorted.sort_by_key(|r| r.timestamp);

        let oscillation_count = sorted
            .windows(2)
            .filter(|pair| pair[0].is_upward() != pair[1].is_upward())
            .count();

        let max = sorted.iter().map(|r| r.new_weight).max().unwrap_or(0);
        let min = sorted.iter().map(|r| r.new_weight).min().unwrap_or(0);

        let stability_score = (1.0 - oscillation_count as f64 / 10.0).max(0.0);

        let recent: Vec<&BeliefRevision> = sorted.iter().rev().take(REASON_WINDOW).copied().collect();

        TensionReport {
            oscillation_count,
            amplitude: max - min,
            unresolved: oscillation_count >= UNRESOLVED_OSCILLATIONS,
            stability_score,
            tension_reason: self.tension_reason(&recent),
        }
    }

    /// First rule whose two keywords both occur in the given reasons.
    fn tension_reason(&self, recent: &[&BeliefRevision]) -> Option<String> {
        let text = recent
            .iter()
            .map(|r| r.reason.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        self.rules
            .iter()
            .find(|rule| text.contains(&rule.first) && text.contains(&rule.second))
            .map(|rule| rule.label.clone())
    }
}

impl Default for TensionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BeliefDomain, RevisionType};

    fn belief_with_weights(start: i32, weights: &[i32], reason: &str) -> BeliefNode {
        let mut node = BeliefNode::new("Test stance", BeliefDomain::Knowledge, "", start, false);
        for &w in weights {
            let kind = if w > node.weight() as i32 {
                RevisionType::Strengthen
            } else {
                RevisionType::Weaken
            };
            node.apply(kind, w, reason);
        }
        node
    }

    #[test]
    fn test_alternating_history_is_unresolved() {
        // 5 -> 7 -> 6 -> 8 -> 6 -> 9
        let node = belief_with_weights(5, &[7, 6, 8, 6, 9], "new evidence");
        let report = TensionAnalyzer::new().analyze_belief(&node);

        assert_eq!(report.oscillation_count, 4);
        assert!(report.unresolved);
        assert_eq!(report.amplitude, 3);
        assert!((report.stability_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_history_is_stable() {
        // 5 -> 6 -> 7 -> 8
        let node = belief_with_weights(5, &[6, 7, 8], "more evidence");
        let report = TensionAnalyzer::new().analyze_belief(&node);

        assert_eq!(report.oscillation_count, 0);
        assert!(!report.unresolved);
        assert_eq!(report.stability_score, 1.0);
    }

    #[test]
    fn test_empty_history() {
        let report = TensionAnalyzer::new().analyze(&[]);
        assert_eq!(report, TensionReport::stable());
    }

    #[test]
    fn test_tension_reason_from_recent_reasons() {
        let mut node = BeliefNode::new("Test stance", BeliefDomain::Ethics, "", 5, false);
        node.apply(RevisionType::Strengthen, 6, "the logic is sound");
        node.apply(RevisionType::Weaken, 5, "but it clashes with my values");

        let report = TensionAnalyzer::new().analyze_belief(&node);
        assert_eq!(report.tension_reason.as_deref(), Some("logic-vs-values"));
    }

    #[test]
    fn test_tension_reason_ignores_old_revisions() {
        let mut node = BeliefNode::new("Test stance", BeliefDomain::Ethics, "", 5, false);
        node.apply(RevisionType::Strengthen, 6, "theory suggests this");
        node.apply(RevisionType::Strengthen, 7, "unrelated");
        node.apply(RevisionType::Strengthen, 8, "unrelated");
        node.apply(RevisionType::Strengthen, 9, "in practice it works");

        let report = TensionAnalyzer::new().analyze_belief(&node);
        assert_eq!(report.tension_reason, None);
    }

    #[test]
    fn test_custom_rules() {
        let analyzer = TensionAnalyzer::with_rules(vec![TensionRule::new(
            "speed-vs-care",
            "Speed",
            "care",
        )]);
        let mut node = BeliefNode::new("Test stance", BeliefDomain::Meta, "", 5, false);
        node.apply(RevisionType::Challenge, 5, "speed matters but so does care");

        let report = analyzer.analyze_belief(&node);
        assert_eq!(report.tension_reason.as_deref(), Some("speed-vs-care"));
    }
}
