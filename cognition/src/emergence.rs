//! Belief emergence - proposes new beliefs from concepts that keep
//! recurring in insights.
//!
//! Proposing never touches the network. The caller decides which
//! candidates to commit with `BeliefNetwork::add_learned`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use beliefs::{clamp_weight, BeliefDomain, BeliefNetwork};
use congress::LogicEntry;

use crate::config::EmergenceConfig;
use crate::types::Insight;

/// Pulls candidate concept labels out of insight text.
pub trait ConceptExtractor: Send + Sync {
    /// Concept labels found in the text.
    fn extract(&self, text: &str) -> Vec<String>;
}

impl<T: ConceptExtractor + ?Sized> ConceptExtractor for Box<T> {
    fn extract(&self, text: &str) -> Vec<String> {
        (**self).extract(text)
    }
}

/// Treats runs of two or more capitalized words as a concept.
///
/// "Learning to value Deep Work over Busy Work" yields "Deep Work" and
/// "Busy Work". Punctuation ends a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedPhraseExtractor;

impl ConceptExtractor for CapitalizedPhraseExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut phrases = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        let mut flush = |run: &mut Vec<&str>| {
            if run.len() >= 2 {
                phrases.push(run.join(" "));
            }
            run.clear();
        };

        for raw in text.split_whitespace() {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            let capitalized = word.chars().next().is_some_and(char::is_uppercase);

            if capitalized {
                run.push(word);
            } else {
                flush(&mut run);
            }

            // Trailing punctuation closes the phrase
            if raw.ends_with(|c: char| !c.is_alphanumeric()) {
                flush(&mut run);
            }
        }
        flush(&mut run);

        phrases
    }
}

/// A belief the caller may choose to add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergentBeliefCandidate {
    /// Proposed stance (the concept label)
    pub stance: String,
    /// Domain inferred from keywords
    pub domain: BeliefDomain,
    /// Suggested weight (1 - 10)
    pub suggested_weight: u8,
    /// Support strength (0.0 - 1.0)
    pub strength: f64,
    /// Insights mentioning the concept
    pub supporting_insight_ids: Vec<String>,
    /// Distinct entries those insights came from
    pub source_entries: Vec<String>,
    /// Always false; emergent beliefs are learned
    pub is_core: bool,
}

/// Keyword table for domain inference, checked in order.
const DOMAIN_KEYWORDS: &[(BeliefDomain, &[&str])] = &[
    (
        BeliefDomain::Ethics,
        &["ethic", "moral", "honest", "fair", "harm", "right", "duty"],
    ),
    (
        BeliefDomain::Relational,
        &["trust", "friend", "family", "empathy", "relationship", "people", "care"],
    ),
    (
        BeliefDomain::SelfModel,
        &["self", "identity", "emotion", "feeling", "growth", "purpose"],
    ),
    (
        BeliefDomain::Meta,
        &["reasoning", "thinking", "belief", "bias", "deliberation", "reflection"],
    ),
];

/// Infer a belief domain from a label. Falls back to knowledge.
pub fn infer_domain(label: &str) -> BeliefDomain {
    let lower = label.to_lowercase();
    DOMAIN_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(domain, _)| *domain)
        .unwrap_or(BeliefDomain::Knowledge)
}

/// Watches insight history for recurring, unmodeled concepts.
pub struct BeliefEmergenceMonitor {
    config: EmergenceConfig,
    extractor: Box<dyn ConceptExtractor>,
}

impl BeliefEmergenceMonitor {
    /// Create a monitor with default thresholds.
    pub fn new() -> Self {
        Self::with_config(EmergenceConfig::default())
    }

    /// Create with custom thresholds.
    pub fn with_config(config: EmergenceConfig) -> Self {
        Self {
            config,
            extractor: Box::new(CapitalizedPhraseExtractor),
        }
    }

    /// Replace the concept extractor.
    pub fn with_extractor(mut self, extractor: impl ConceptExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Propose candidates from concepts anywhere in the history.
    pub fn propose(
        &self,
        network: &BeliefNetwork,
        history: &[Insight],
    ) -> Vec<EmergentBeliefCandidate> {
        let concepts = history.iter().flat_map(|i| self.extractor.extract(&i.content));
        self.evaluate(concepts, network, history)
    }

    /// Propose candidates from concepts in one entry's insight steps,
    /// counting support across the whole history.
    pub fn propose_for_entry(
        &self,
        entry: &LogicEntry,
        network: &BeliefNetwork,
        history: &[Insight],
    ) -> Vec<EmergentBeliefCandidate> {
        let concepts = entry
            .insight_steps()
            .into_iter()
            .flat_map(|s| self.extractor.extract(&s.content));
        self.evaluate(concepts, network, history)
    }

    fn evaluate(
        &self,
        concepts: impl Iterator<Item = String>,
        network: &BeliefNetwork,
        history: &[Insight],
    ) -> Vec<EmergentBeliefCandidate> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for concept in concepts {
            let key = concept.to_lowercase();
            if !seen.insert(key.clone()) || Self::already_modeled(&key, network) {
                continue;
            }

            let supporting: Vec<&Insight> = history
                .iter()
                .filter(|i| i.content.to_lowercase().contains(&key))
                .collect();

            let mut source_entries: Vec<String> = Vec::new();
            for insight in &supporting {
                if !source_entries.contains(&insight.source) {
                    source_entries.push(insight.source.clone());
                }
            }

            let strength = f64::min(
                1.0,
                self.config.base_strength + self.config.strength_per_insight * supporting.len() as f64,
            );

            if strength < self.config.min_strength
                || supporting.len() < self.config.min_supporting_insights
                || source_entries.len() < self.config.min_distinct_entries
            {
                continue;
            }

            let suggested_weight = clamp_weight((strength * 5.0 + 3.0).round() as i32);

            info!(
                concept = %concept,
                strength,
                support = supporting.len(),
                entries = source_entries.len(),
                "Emergent belief candidate"
            );

            candidates.push(EmergentBeliefCandidate {
                domain: infer_domain(&concept),
                stance: concept,
                suggested_weight,
                strength,
                supporting_insight_ids: supporting.iter().map(|i| i.id.clone()).collect(),
                source_entries,
                is_core: false,
            });
        }

        candidates
    }

    /// Case-insensitive substring match against existing stances, either way.
    fn already_modeled(key: &str, network: &BeliefNetwork) -> bool {
        network.beliefs().iter().any(|b| {
            let stance = b.stance.to_lowercase();
            stance.contains(key) || key.contains(&stance)
        })
    }
}

impl Default for BeliefEmergenceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InsightCategory;
    use congress::{CandidateResponse, DeliberationRouter, ReasoningStep};

    fn insight(content: &str, source: &str) -> Insight {
        Insight::new(content, InsightCategory::ReasoningPattern, source)
    }

    #[test]
    fn test_capitalized_phrases() {
        let phrases =
            CapitalizedPhraseExtractor.extract("Learning to value Deep Work over Busy Work.");
        assert_eq!(phrases, vec!["Deep Work", "Busy Work"]);

        assert!(CapitalizedPhraseExtractor.extract("nothing here").is_empty());
        assert_eq!(
            CapitalizedPhraseExtractor.extract("Rest. Deep Focus"),
            vec!["Deep Focus"]
        );
    }

    #[test]
    fn test_domain_inference() {
        assert_eq!(infer_domain("Moral Courage"), BeliefDomain::Ethics);
        assert_eq!(infer_domain("Earned Trust"), BeliefDomain::Relational);
        assert_eq!(infer_domain("Confirmation Bias"), BeliefDomain::Meta);
        assert_eq!(infer_domain("Deep Work"), BeliefDomain::Knowledge);
    }

    #[test]
    fn test_candidate_needs_distinct_entries() {
        let network = BeliefNetwork::new();
        let monitor = BeliefEmergenceMonitor::new();

        let one_entry = vec![
            insight("Deep Work beats multitasking", "e1"),
            insight("Again Deep Work wins", "e1"),
            insight("deep work is rare", "e1"),
        ];
        assert!(monitor.propose(&network, &one_entry).is_empty());

        let two_entries = vec![
            insight("Deep Work beats multitasking", "e1"),
            insight("Again Deep Work wins", "e1"),
            insight("deep work is rare", "e2"),
        ];
        let candidates = monitor.propose(&network, &two_entries);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].stance, "Deep Work");
        assert_eq!(candidates[0].strength, 1.0);
        assert_eq!(candidates[0].suggested_weight, 8);
        assert_eq!(candidates[0].source_entries, vec!["e1", "e2"]);
        assert!(!candidates[0].is_core);
    }

    #[test]
    fn test_too_few_insights() {
        let network = BeliefNetwork::new();
        let history = vec![
            insight("Deep Work beats multitasking", "e1"),
            insight("Deep Work again", "e2"),
        ];
        assert!(BeliefEmergenceMonitor::new().propose(&network, &history).is_empty());
    }

    #[test]
    fn test_existing_stance_is_skipped() {
        let network = BeliefNetwork::new();
        let history = vec![
            insight("Knowledge Is Provisional after all", "e1"),
            insight("Knowledge Is Provisional again", "e2"),
            insight("Knowledge Is Provisional, clearly", "e3"),
        ];
        assert!(BeliefEmergenceMonitor::new().propose(&network, &history).is_empty());
    }

    #[test]
    fn test_proposing_does_not_mutate() {
        let network = BeliefNetwork::new();
        let hash = network.state_hash();
        let history = vec![
            insight("Deep Work", "e1"),
            insight("Deep Work", "e2"),
            insight("Deep Work", "e3"),
        ];
        assert_eq!(BeliefEmergenceMonitor::new().propose(&network, &history).len(), 1);
        assert_eq!(network.state_hash(), hash);
    }

    #[test]
    fn test_propose_for_entry_uses_entry_concepts() {
        let network = BeliefNetwork::new();
        let route = DeliberationRouter::route(2.0).unwrap();
        let mut entry = LogicEntry::new("How do I focus?", &route);
        entry.add_step(ReasoningStep::insight("Deep Work needs quiet")).unwrap();
        entry.add_candidate(CandidateResponse::considering(1, "Find quiet").unwrap()).unwrap();
        entry.select_candidate(1).unwrap();
        entry.finalize("Find quiet", "only draft").unwrap();

        let history = vec![
            insight("Deep Work needs quiet", "e1"),
            insight("Deep Work again", "e2"),
            insight("Deep Work, always", "e3"),
            insight("Morning Pages help", "e1"),
            insight("Morning Pages again", "e2"),
            insight("Morning Pages daily", "e3"),
        ];

        let candidates = BeliefEmergenceMonitor::new().propose_for_entry(&entry, &network, &history);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].stance, "Deep Work");
        assert_eq!(candidates[0].supporting_insight_ids.len(), 3);

        // The whole history proposes both concepts
        assert_eq!(BeliefEmergenceMonitor::new().propose(&network, &history).len(), 2);
    }
}
