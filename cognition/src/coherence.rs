//! Coherence monitor - three-state health machine over the belief network.
//!
//! `Critical` pauses deliberation. The pause is lifted only by a
//! consolidation that brings the score back above the critical threshold,
//! or by an explicit [`CoherenceMonitor::reset`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::mem::discriminant;
use tracing::{debug, info, warn};

use beliefs::{clamp_weight, BeliefError, BeliefNetwork, BeliefRevision, TensionAnalyzer};

use crate::config::CoherenceConfig;
use crate::types::{CognitionError, Result};

/// Network health, carrying the score it was assessed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "score", rename_all = "snake_case")]
pub enum HealthState {
    /// Above the healthy threshold
    Healthy(f64),
    /// Between the thresholds; oscillating beliefs are tracked
    Caution(f64),
    /// At or below the critical threshold; deliberation pauses
    Critical(f64),
}

impl HealthState {
    /// Classify a score.
    pub fn from_score(score: f64, config: &CoherenceConfig) -> Self {
        if score > config.healthy_above {
            Self::Healthy(score)
        } else if score > config.critical_at_or_below {
            Self::Caution(score)
        } else {
            Self::Critical(score)
        }
    }

    /// Score carried by the state.
    pub fn score(&self) -> f64 {
        match self {
            Self::Healthy(s) | Self::Caution(s) | Self::Critical(s) => *s,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy(_) => "healthy",
            Self::Caution(_) => "caution",
            Self::Critical(_) => "critical",
        }
    }

    /// Check if critical.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical(_))
    }

    fn same_kind(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Caller-visible coherence status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceStatus {
    /// Current state
    pub state: HealthState,
    /// Current score
    pub score: f64,
    /// Beliefs in unresolved tension
    pub oscillating_belief_ids: Vec<String>,
    /// Deliberation is paused until consolidation succeeds
    pub requires_consolidation: bool,
}

/// A change of health state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// State before
    pub from: HealthState,
    /// State after
    pub to: HealthState,
    /// When it happened
    pub at: DateTime<Utc>,
}

/// How to lock an oscillating belief during consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationChoice {
    /// Highest weight in the belief's history
    HistoricalHigh,
    /// Lowest weight in the belief's history
    HistoricalLow,
    /// A weight chosen by the user (clamped into 1 - 10)
    Explicit(u8),
}

/// Result of a consolidation attempt.
#[derive(Debug, Clone)]
pub struct ConsolidationOutcome {
    /// Revisions written to lock beliefs
    pub revisions: Vec<BeliefRevision>,
    /// State after re-assessment
    pub state: HealthState,
    /// Whether deliberation may resume
    pub resumed: bool,
}

/// Tracks network health and gates deliberation.
pub struct CoherenceMonitor {
    config: CoherenceConfig,
    analyzer: TensionAnalyzer,
    current_state: HealthState,
    oscillating: Vec<String>,
    requires_consolidation: bool,
    transitions: Vec<StateTransition>,
}

impl CoherenceMonitor {
    /// Create a monitor with default thresholds.
    pub fn new() -> Self {
        Self::with_config(CoherenceConfig::default())
    }

    /// Create with custom thresholds.
    pub fn with_config(config: CoherenceConfig) -> Self {
        Self {
            config,
            analyzer: TensionAnalyzer::new(),
            current_state: HealthState::Healthy(100.0),
            oscillating: Vec::new(),
            requires_consolidation: false,
            transitions: Vec::new(),
        }
    }

    /// Use a custom tension analyzer.
    pub fn with_analyzer(mut self, analyzer: TensionAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Classify the network's current score. Pure.
    pub fn assess(&self, network: &BeliefNetwork) -> HealthState {
        HealthState::from_score(network.coherence_score(), &self.config)
    }

    /// Apply the response a state calls for.
    ///
    /// A pause raised at critical outlives a later healthy or caution
    /// assessment; only [`consolidate`](Self::consolidate) or
    /// [`reset`](Self::reset) lifts it. While paused the oscillating list
    /// is refreshed on every response.
    pub fn respond(&mut self, state: HealthState, network: &BeliefNetwork) {
        match state {
            HealthState::Healthy(_) => {
                if self.requires_consolidation {
                    self.oscillating = network.oscillating_beliefs(&self.analyzer);
                } else {
                    self.oscillating.clear();
                }
            }
            HealthState::Caution(_) => {
                self.oscillating = network.oscillating_beliefs(&self.analyzer);
            }
            HealthState::Critical(score) => {
                self.oscillating = network.oscillating_beliefs(&self.analyzer);
                if !self.requires_consolidation {
                    warn!(
                        score,
                        oscillating = self.oscillating.len(),
                        "Coherence critical, pausing deliberation"
                    );
                }
                self.requires_consolidation = true;
            }
        }
        self.set_state(state);
    }

    /// Assess and respond in one step.
    pub fn evaluate(&mut self, network: &BeliefNetwork) -> HealthState {
        let state = self.assess(network);
        self.respond(state, network);
        state
    }

    /// Evaluate and report.
    pub fn status(&mut self, network: &BeliefNetwork) -> CoherenceStatus {
        let state = self.evaluate(network);
        CoherenceStatus {
            state,
            score: state.score(),
            oscillating_belief_ids: self.oscillating.clone(),
            requires_consolidation: self.requires_consolidation,
        }
    }

    /// Gate checked before any congress runs.
    pub fn ensure_can_deliberate(&self) -> Result<()> {
        if self.requires_consolidation {
            return Err(CognitionError::ConsolidationPending(self.current_state.score()));
        }
        Ok(())
    }

    /// Lock beliefs to their chosen weights, then re-assess.
    ///
    /// Every oscillating belief needs a choice, and choices for any other
    /// belief are applied too. Nothing is written unless every choice
    /// resolves to an existing belief. If the score is still critical
    /// afterwards the pause stays in place.
    pub fn consolidate(
        &mut self,
        network: &mut BeliefNetwork,
        resolutions: &HashMap<String, ConsolidationChoice>,
    ) -> Result<ConsolidationOutcome> {
        if let Some(id) = self.oscillating.iter().find(|id| !resolutions.contains_key(*id)) {
            return Err(CognitionError::MissingResolution(id.clone()));
        }

        let mut ids: Vec<&String> = resolutions.keys().collect();
        ids.sort();

        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            let choice = resolutions[id];
            let belief = network
                .get(id)
                .ok_or_else(|| BeliefError::NotFound(id.clone()))?;

            let (high, low) = belief
                .historical_extremes()
                .unwrap_or((belief.weight(), belief.weight()));
            let target = match choice {
                ConsolidationChoice::HistoricalHigh => high,
                ConsolidationChoice::HistoricalLow => low,
                ConsolidationChoice::Explicit(weight) => clamp_weight(i32::from(weight)),
            };
            targets.push((id.clone(), choice, target, belief.weight()));
        }

        let mut revisions = Vec::new();
        for (id, choice, target, current) in targets {
            if target == current {
                debug!(belief_id = %id, weight = current, "Belief already at consolidation weight");
                continue;
            }
            let reason = format!("Consolidation: locked at {} ({:?})", target, choice);
            revisions.push(network.update_weight(&id, i32::from(target), &reason)?);
        }

        let state = self.assess(network);
        let resumed = !state.is_critical();
        if resumed {
            self.requires_consolidation = false;
            self.oscillating.clear();
            info!(score = state.score(), locked = revisions.len(), "Consolidation succeeded, resuming");
        } else {
            self.oscillating = network.oscillating_beliefs(&self.analyzer);
            warn!(score = state.score(), "Consolidation left coherence critical, staying paused");
        }
        self.set_state(state);

        Ok(ConsolidationOutcome {
            revisions,
            state,
            resumed,
        })
    }

    /// Return to `Healthy(100)` and lift any pause. Belief history is
    /// untouched.
    pub fn reset(&mut self) {
        self.oscillating.clear();
        self.requires_consolidation = false;
        self.set_state(HealthState::Healthy(100.0));
    }

    fn set_state(&mut self, state: HealthState) {
        if !state.same_kind(&self.current_state) {
            info!(
                from = self.current_state.as_str(),
                to = state.as_str(),
                score = state.score(),
                "Coherence state changed"
            );
            self.transitions.push(StateTransition {
                from: self.current_state,
                to: state,
                at: Utc::now(),
            });
        }
        self.current_state = state;
    }

    /// Last recorded state.
    pub fn current_state(&self) -> HealthState {
        self.current_state
    }

    /// Oscillating beliefs recorded at the last response.
    pub fn oscillating_beliefs(&self) -> &[String] {
        &self.oscillating
    }

    /// Whether deliberation is paused.
    pub fn requires_consolidation(&self) -> bool {
        self.requires_consolidation
    }

    /// Every state change, oldest first.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }
}

impl Default for CoherenceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the first core belief (weight 7) through 7,1,7,1,7,1:
    /// five revisions, four oscillations, coherence 0 for that belief.
    fn critical_network() -> (BeliefNetwork, String) {
        let mut network = BeliefNetwork::new();
        let id = network
            .core_beliefs()
            .into_iter()
            .find(|b| b.weight() == 7)
            .unwrap()
            .id
            .clone();

        network.update_weight(&id, 1, "values say no").unwrap();
        for _ in 0..2 {
            network.update_weight(&id, 7, "logic says yes").unwrap();
            network.update_weight(&id, 1, "values say no").unwrap();
        }
        (network, id)
    }

    #[test]
    fn test_thresholds() {
        let config = CoherenceConfig::default();
        assert!(matches!(HealthState::from_score(70.1, &config), HealthState::Healthy(_)));
        assert!(matches!(HealthState::from_score(70.0, &config), HealthState::Caution(_)));
        assert!(matches!(HealthState::from_score(50.1, &config), HealthState::Caution(_)));
        assert!(matches!(HealthState::from_score(50.0, &config), HealthState::Critical(_)));
    }

    #[test]
    fn test_default_network_is_healthy() {
        let mut monitor = CoherenceMonitor::new();
        let network = BeliefNetwork::new();

        let status = monitor.status(&network);
        assert!(matches!(status.state, HealthState::Healthy(_)));
        assert!(!status.requires_consolidation);
        assert!(monitor.ensure_can_deliberate().is_ok());
    }

    #[test]
    fn test_critical_pauses_deliberation() {
        let mut monitor = CoherenceMonitor::new();
        let (network, id) = critical_network();

        let status = monitor.status(&network);
        assert!(matches!(status.state, HealthState::Critical(s) if (s - 50.0).abs() < 1e-9));
        assert!(status.requires_consolidation);
        assert_eq!(status.oscillating_belief_ids, vec![id]);
        assert!(matches!(
            monitor.ensure_can_deliberate(),
            Err(CognitionError::ConsolidationPending(_))
        ));
        assert_eq!(monitor.transitions().len(), 1);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"]["state"], "critical");
        assert_eq!(json["requires_consolidation"], true);
    }

    #[test]
    fn test_consolidation_requires_every_choice() {
        let mut monitor = CoherenceMonitor::new();
        let (mut network, id) = critical_network();
        monitor.evaluate(&network);

        let result = monitor.consolidate(&mut network, &HashMap::new());
        assert!(matches!(result, Err(CognitionError::MissingResolution(ref m)) if *m == id));
        assert_eq!(network.get(&id).unwrap().revision_count(), 5);
    }

    #[test]
    fn test_consolidation_to_high_resumes() {
        let mut monitor = CoherenceMonitor::new();
        let (mut network, id) = critical_network();
        monitor.evaluate(&network);

        let resolutions = HashMap::from([(id.clone(), ConsolidationChoice::HistoricalHigh)]);
        let outcome = monitor.consolidate(&mut network, &resolutions).unwrap();

        assert!(outcome.resumed);
        assert_eq!(network.get(&id).unwrap().weight(), 7);
        assert!(matches!(outcome.state, HealthState::Caution(_)));
        assert!(monitor.ensure_can_deliberate().is_ok());
    }

    #[test]
    fn test_failed_consolidation_stays_paused() {
        let mut monitor = CoherenceMonitor::new();
        let (mut network, id) = critical_network();
        monitor.evaluate(&network);

        let resolutions = HashMap::from([(id.clone(), ConsolidationChoice::HistoricalLow)]);
        let outcome = monitor.consolidate(&mut network, &resolutions).unwrap();

        assert!(!outcome.resumed);
        assert!(outcome.revisions.is_empty());
        assert!(monitor.requires_consolidation());
    }

    #[test]
    fn test_reset_lifts_pause() {
        let mut monitor = CoherenceMonitor::new();
        let (network, _) = critical_network();
        monitor.evaluate(&network);

        monitor.reset();
        assert_eq!(monitor.current_state(), HealthState::Healthy(100.0));
        assert!(monitor.oscillating_beliefs().is_empty());
        assert!(monitor.ensure_can_deliberate().is_ok());
    }

    /// Weaken every core belief steadily down to 1. No belief oscillates.
    fn flattened_network() -> BeliefNetwork {
        let mut network = BeliefNetwork::new();
        let ids: Vec<String> = network.core_beliefs().iter().map(|b| b.id.clone()).collect();
        for id in &ids {
            network.update_weight(id, 1, "steady erosion").unwrap();
        }
        network
    }

    #[test]
    fn test_explicit_choice_locks_weight() {
        let mut monitor = CoherenceMonitor::new();
        let (mut network, id) = critical_network();
        monitor.evaluate(&network);

        let resolutions = HashMap::from([(id.clone(), ConsolidationChoice::Explicit(9))]);
        let outcome = monitor.consolidate(&mut network, &resolutions).unwrap();

        assert_eq!(outcome.revisions.len(), 1);
        assert_eq!(outcome.revisions[0].new_weight, 9);
        assert_eq!(network.get(&id).unwrap().weight(), 9);
        assert!(outcome.resumed);
    }

    #[test]
    fn test_explicit_choice_is_clamped_before_comparing() {
        let mut monitor = CoherenceMonitor::new();
        let (mut network, id) = critical_network();
        monitor.evaluate(&network);

        // Already at 1; a request for 0 clamps to 1 and writes nothing
        let resolutions = HashMap::from([(id.clone(), ConsolidationChoice::Explicit(0))]);
        let outcome = monitor.consolidate(&mut network, &resolutions).unwrap();

        assert!(outcome.revisions.is_empty());
        assert_eq!(network.get(&id).unwrap().revision_count(), 5);
    }

    #[test]
    fn test_consolidation_applies_non_oscillating_choices() {
        let mut monitor = CoherenceMonitor::new();
        let mut network = flattened_network();

        let status = monitor.status(&network);
        assert!(matches!(status.state, HealthState::Critical(_)));
        assert!(status.oscillating_belief_ids.is_empty());

        let resolutions: HashMap<String, ConsolidationChoice> = network
            .core_beliefs()
            .iter()
            .map(|b| (b.id.clone(), ConsolidationChoice::Explicit(10)))
            .collect();
        let outcome = monitor.consolidate(&mut network, &resolutions).unwrap();

        assert_eq!(outcome.revisions.len(), 3);
        assert!(network.core_beliefs().iter().all(|b| b.weight() == 10));
        assert!(outcome.resumed);
        assert!(monitor.ensure_can_deliberate().is_ok());
    }

    #[test]
    fn test_unknown_choice_writes_nothing() {
        let mut monitor = CoherenceMonitor::new();
        let (mut network, id) = critical_network();
        monitor.evaluate(&network);

        let resolutions = HashMap::from([
            (id.clone(), ConsolidationChoice::HistoricalHigh),
            ("missing".to_string(), ConsolidationChoice::Explicit(5)),
        ]);
        let result = monitor.consolidate(&mut network, &resolutions);

        assert!(matches!(result, Err(CognitionError::Belief(BeliefError::NotFound(_)))));
        assert_eq!(network.get(&id).unwrap().weight(), 1);
    }

    #[test]
    fn test_pause_outlives_recovery_until_consolidated() {
        let mut monitor = CoherenceMonitor::new();
        let mut network = flattened_network();
        monitor.evaluate(&network);

        let ids: Vec<String> = network.core_beliefs().iter().map(|b| b.id.clone()).collect();
        for id in &ids {
            network.update_weight(id, 8, "recovered").unwrap();
        }

        let status = monitor.status(&network);
        assert!(!status.state.is_critical());
        assert!(status.requires_consolidation);
        assert!(status.oscillating_belief_ids.is_empty());

        // Nothing oscillates, so an empty set of choices lifts the pause
        let outcome = monitor.consolidate(&mut network, &HashMap::new()).unwrap();
        assert!(outcome.resumed);
        assert!(outcome.revisions.is_empty());
        assert!(monitor.ensure_can_deliberate().is_ok());
    }
}
