//! CognitiveAgent - the outward face of the engine.
//!
//! Ties routing, the congress, insight scoring, coherence monitoring,
//! belief emergence and pattern aggregation to one belief network.
//! Network writes go through a single write lock, and the coherence gate
//! is checked before any congress starts.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use beliefs::{BeliefNetwork, BeliefRevision, TensionAnalyzer};
use congress::{
    CongressSimulator, DeliberationRouter, LogicEntry, PerspectiveDominanceTracker,
    PerspectiveProvider, PerspectiveRole, Route,
};

use crate::coherence::{CoherenceMonitor, CoherenceStatus, ConsolidationChoice, ConsolidationOutcome};
use crate::config::CognitionConfig;
use crate::emergence::{BeliefEmergenceMonitor, ConceptExtractor, EmergentBeliefCandidate};
use crate::patterns::{PatternAggregator, PatternReport};
use crate::scorer::{InsightScore, InsightScorer, NoveltyMeasure};
use crate::sink::RecordSink;
use crate::types::{Insight, InsightCategory, LearnedPattern, Result};

/// A mutation requested on one belief.
#[derive(Debug, Clone, PartialEq)]
pub enum BeliefOperation {
    /// Record a challenge without moving the weight
    Challenge,
    /// Raise the weight by one
    Strengthen,
    /// Lower the weight by one
    Weaken,
    /// Replace the reasoning
    Revise(String),
    /// Move to a weight (clamped into 1 - 10)
    UpdateWeight(i32),
}

/// The cognitive agent.
pub struct CognitiveAgent {
    /// Configuration
    config: CognitionConfig,
    /// Belief network (single writer)
    network: Arc<RwLock<BeliefNetwork>>,
    /// Congress runner
    simulator: CongressSimulator,
    /// Profound-insight scorer
    scorer: Arc<RwLock<InsightScorer>>,
    /// Winning-perspective statistics
    dominance: Arc<RwLock<PerspectiveDominanceTracker>>,
    /// Health state machine and deliberation gate
    coherence: Arc<RwLock<CoherenceMonitor>>,
    /// Emergent belief proposals
    emergence: BeliefEmergenceMonitor,
    /// Pattern review queue
    patterns: Arc<RwLock<PatternAggregator>>,
    /// Every insight recorded so far
    insights: Arc<RwLock<Vec<Insight>>>,
    /// Finalized interactions
    interactions: Arc<RwLock<usize>>,
    /// Where records are persisted
    sink: Option<Arc<dyn RecordSink>>,
}

impl CognitiveAgent {
    /// Create an agent with default configuration and the seeded network.
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self::with_config(CognitionConfig::new(agent_id))
    }

    /// Create with custom configuration.
    pub fn with_config(config: CognitionConfig) -> Self {
        Self::from_parts(
            config.clone(),
            BeliefNetwork::new(),
            InsightScorer::with_config(config.scorer.clone()),
            BeliefEmergenceMonitor::with_config(config.emergence.clone()),
            CoherenceMonitor::with_config(config.coherence.clone()),
        )
    }

    fn from_parts(
        config: CognitionConfig,
        network: BeliefNetwork,
        scorer: InsightScorer,
        emergence: BeliefEmergenceMonitor,
        mut coherence: CoherenceMonitor,
    ) -> Self {
        coherence.evaluate(&network);

        Self {
            simulator: CongressSimulator::with_config(config.congress.clone()),
            patterns: Arc::new(RwLock::new(PatternAggregator::with_config(
                config.patterns.clone(),
            ))),
            config,
            network: Arc::new(RwLock::new(network)),
            scorer: Arc::new(RwLock::new(scorer)),
            dominance: Arc::new(RwLock::new(PerspectiveDominanceTracker::new())),
            coherence: Arc::new(RwLock::new(coherence)),
            emergence,
            insights: Arc::new(RwLock::new(Vec::new())),
            interactions: Arc::new(RwLock::new(0)),
            sink: None,
        }
    }

    /// Persist records through a sink.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Get agent ID.
    pub fn id(&self) -> &str {
        &self.config.agent_id
    }

    /// Configuration in use.
    pub fn config(&self) -> &CognitionConfig {
        &self.config
    }

    fn active_sink(&self) -> Option<&Arc<dyn RecordSink>> {
        if self.config.general.audit_enabled {
            self.sink.as_ref()
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Deliberation
    // ------------------------------------------------------------------

    /// Route a complexity weight.
    pub fn submit_query(&self, weight: f64) -> Result<Route> {
        Ok(DeliberationRouter::route(weight)?)
    }

    /// Run a congress for a routed query. Refused while consolidation is
    /// pending; the provider is not called at all in that case.
    pub async fn run_deliberation(
        &self,
        query: &str,
        route: &Route,
        provider: &dyn PerspectiveProvider,
    ) -> Result<LogicEntry> {
        self.coherence.read().await.ensure_can_deliberate()?;

        let network_hash = self.network.read().await.state_hash();
        let entry = self
            .simulator
            .run(query, route, provider)
            .await?
            .with_network_hash(network_hash);

        debug!(agent_id = %self.config.agent_id, entry_id = %entry.id(), "Deliberation finished");
        Ok(entry)
    }

    /// Select a draft, finalize the entry with it, and record the entry's
    /// insights and winning perspective.
    pub async fn finalize_entry(
        &self,
        entry: &mut LogicEntry,
        draft_number: u32,
        reasoning: &str,
    ) -> Result<Vec<Insight>> {
        entry.select_candidate(draft_number)?;
        let response = entry
            .selected_candidate()
            .map(|c| c.content.clone())
            .unwrap_or_default();
        entry.finalize(response, reasoning)?;

        self.dominance.write().await.record(entry);
        *self.interactions.write().await += 1;

        let insights = Insight::from_entry(entry, InsightCategory::ReasoningPattern);
        self.insights.write().await.extend(insights.iter().cloned());

        info!(
            entry_id = %entry.id(),
            strategy = ?entry.engagement_strategy(),
            insights = insights.len(),
            "Logic entry finalized"
        );

        if let Some(sink) = self.active_sink() {
            sink.persist_entry(entry).await?;
            sink.persist_insights(&insights).await?;
        }
        Ok(insights)
    }

    /// Score a finalized entry's insight steps against the current network.
    pub async fn score_insights(&self, entry: &mut LogicEntry) -> Result<Vec<InsightScore>> {
        let scores = {
            let network = self.network.read().await;
            self.scorer.write().await.score_entry(entry, &network)?
        };

        if let Some(sink) = self.active_sink() {
            sink.persist_entry(entry).await?;
        }
        Ok(scores)
    }

    /// Record insights produced outside the congress, such as what the
    /// host learned about the user.
    pub async fn record_insights(&self, insights: Vec<Insight>) -> Result<()> {
        if let Some(sink) = self.active_sink() {
            sink.persist_insights(&insights).await?;
        }
        self.insights.write().await.extend(insights);
        Ok(())
    }

    /// Count an interaction that did not go through `finalize_entry`.
    pub async fn record_interaction(&self) {
        *self.interactions.write().await += 1;
    }

    // ------------------------------------------------------------------
    // Beliefs and coherence
    // ------------------------------------------------------------------

    /// Apply one belief mutation, then re-evaluate coherence.
    pub async fn mutate_belief(
        &self,
        id: &str,
        operation: BeliefOperation,
        reason: &str,
    ) -> Result<BeliefRevision> {
        let mut network = self.network.write().await;

        let revision = match &operation {
            BeliefOperation::Challenge => network.challenge(id, reason)?,
            BeliefOperation::Strengthen => network.strengthen(id, reason)?,
            BeliefOperation::Weaken => network.weaken(id, reason)?,
            BeliefOperation::Revise(reasoning) => network.revise(id, reasoning, reason)?,
            BeliefOperation::UpdateWeight(weight) => network.update_weight(id, *weight, reason)?,
        };

        self.coherence.write().await.evaluate(&network);

        if let Some(sink) = self.active_sink() {
            sink.persist_network(&network).await?;
        }
        Ok(revision)
    }

    /// Current coherence status.
    pub async fn coherence_status(&self) -> CoherenceStatus {
        let network = self.network.read().await;
        self.coherence.write().await.status(&network)
    }

    /// Lock every oscillating belief to the chosen weight and re-assess.
    pub async fn consolidate(
        &self,
        resolutions: &HashMap<String, ConsolidationChoice>,
    ) -> Result<ConsolidationOutcome> {
        let mut network = self.network.write().await;
        let outcome = self
            .coherence
            .write()
            .await
            .consolidate(&mut network, resolutions)?;

        if let Some(sink) = self.active_sink() {
            sink.persist_network(&network).await?;
        }
        Ok(outcome)
    }

    /// Return the monitor to healthy and lift any pause.
    pub async fn reset_coherence(&self) {
        self.coherence.write().await.reset();
    }

    /// Replace the network with persisted state.
    pub async fn load_network(&self, json: &str) -> Result<()> {
        let loaded = BeliefNetwork::from_json(json)?;
        let mut network = self.network.write().await;
        *network = loaded;

        let mut coherence = self.coherence.write().await;
        coherence.reset();
        coherence.evaluate(&network);

        info!(beliefs = network.len(), hash = %network.state_hash(), "Belief network loaded");
        Ok(())
    }

    /// Serialize the network.
    pub async fn network_snapshot(&self) -> Result<String> {
        Ok(self.network.read().await.to_json()?)
    }

    /// Hash of the current network state.
    pub async fn network_hash(&self) -> String {
        self.network.read().await.state_hash()
    }

    /// Clone of the current network.
    pub async fn network(&self) -> BeliefNetwork {
        self.network.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Emergence and patterns
    // ------------------------------------------------------------------

    /// Propose beliefs from the recorded insight history.
    pub async fn propose_emergent_beliefs(&self) -> Vec<EmergentBeliefCandidate> {
        let network = self.network.read().await;
        let insights = self.insights.read().await;
        self.emergence.propose(&network, &insights)
    }

    /// Propose beliefs from concepts in a newly finalized entry, counting
    /// support across the recorded insight history.
    pub async fn propose_emergent_beliefs_for(&self, entry: &LogicEntry) -> Vec<EmergentBeliefCandidate> {
        let network = self.network.read().await;
        let insights = self.insights.read().await;
        self.emergence.propose_for_entry(entry, &network, &insights)
    }

    /// Add a proposed belief to the network. Returns the new belief's ID.
    pub async fn commit_emergent_belief(&self, candidate: &EmergentBeliefCandidate) -> Result<String> {
        let mut network = self.network.write().await;
        let reasoning = format!(
            "Emerged from {} insights across {} deliberations",
            candidate.supporting_insight_ids.len(),
            candidate.source_entries.len()
        );
        let id = network.add_learned(
            candidate.stance.clone(),
            candidate.domain,
            reasoning,
            i32::from(candidate.suggested_weight),
        );

        self.coherence.write().await.evaluate(&network);

        if let Some(sink) = self.active_sink() {
            sink.persist_network(&network).await?;
        }
        Ok(id)
    }

    /// Aggregate patterns over the insight history and queue them.
    pub async fn aggregate_patterns(&self) -> PatternReport {
        let total = *self.interactions.read().await;
        let report = {
            let insights = self.insights.read().await;
            self.patterns.read().await.aggregate(&insights, total)
        };
        self.patterns.write().await.submit(report.clone());
        report
    }

    /// Confirm a pending pattern.
    pub async fn confirm_pattern(&self, id: &str) -> Result<LearnedPattern> {
        self.patterns.write().await.confirm(id)
    }

    /// Reject a pending pattern.
    pub async fn reject_pattern(&self, id: &str) -> Result<LearnedPattern> {
        self.patterns.write().await.reject(id)
    }

    /// Patterns waiting for review.
    pub async fn pending_patterns(&self) -> Vec<LearnedPattern> {
        self.patterns.read().await.pending().to_vec()
    }

    /// Accepted patterns.
    pub async fn accepted_patterns(&self) -> Vec<LearnedPattern> {
        self.patterns.read().await.accepted().to_vec()
    }

    /// Every recorded insight, oldest first.
    pub async fn insight_history(&self) -> Vec<Insight> {
        self.insights.read().await.clone()
    }

    /// Most frequently winning perspective.
    pub async fn dominant_perspective(&self) -> Option<PerspectiveRole> {
        self.dominance.read().await.dominant_perspective()
    }

    /// Percentage of wins held by a role.
    pub async fn perspective_share(&self, role: PerspectiveRole) -> f64 {
        self.dominance.read().await.share(role)
    }
}

/// Builder for CognitiveAgent.
pub struct CognitiveAgentBuilder {
    config: CognitionConfig,
    network: Option<BeliefNetwork>,
    analyzer: Option<TensionAnalyzer>,
    novelty: Option<Box<dyn NoveltyMeasure>>,
    extractor: Option<Box<dyn ConceptExtractor>>,
    sink: Option<Arc<dyn RecordSink>>,
}

impl CognitiveAgentBuilder {
    /// Create a new builder.
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            config: CognitionConfig::new(agent_id),
            network: None,
            analyzer: None,
            novelty: None,
            extractor: None,
            sink: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: CognitionConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from an existing network instead of the seeded one.
    pub fn with_network(mut self, network: BeliefNetwork) -> Self {
        self.network = Some(network);
        self
    }

    /// Use a custom tension analyzer for coherence monitoring.
    pub fn with_tension_analyzer(mut self, analyzer: TensionAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Use a custom novelty measure for insight scoring.
    pub fn with_novelty(mut self, novelty: impl NoveltyMeasure + 'static) -> Self {
        self.novelty = Some(Box::new(novelty));
        self
    }

    /// Use a custom concept extractor for belief emergence.
    pub fn with_extractor(mut self, extractor: impl ConceptExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Persist records through a sink.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the healthy threshold.
    pub fn healthy_above(mut self, score: f64) -> Self {
        self.config.coherence.healthy_above = score;
        self
    }

    /// Set the critical threshold.
    pub fn critical_at_or_below(mut self, score: f64) -> Self {
        self.config.coherence.critical_at_or_below = score;
        self
    }

    /// Set the profound-insight threshold.
    pub fn profound_threshold(mut self, threshold: f64) -> Self {
        self.config.scorer.profound_threshold = threshold;
        self
    }

    /// Add ethics to single-debate calls.
    pub fn include_ethics_in_single_debate(mut self, enabled: bool) -> Self {
        self.config.congress.include_ethics_in_single_debate = enabled;
        self
    }

    /// Enable/disable persistence through the sink.
    pub fn audit_enabled(mut self, enabled: bool) -> Self {
        self.config.general.audit_enabled = enabled;
        self
    }

    /// Build the agent.
    pub fn build(self) -> CognitiveAgent {
        let mut scorer = InsightScorer::with_config(self.config.scorer.clone());
        if let Some(novelty) = self.novelty {
            scorer = scorer.with_novelty(novelty);
        }

        let mut emergence = BeliefEmergenceMonitor::with_config(self.config.emergence.clone());
        if let Some(extractor) = self.extractor {
            emergence = emergence.with_extractor(extractor);
        }

        let mut coherence = CoherenceMonitor::with_config(self.config.coherence.clone());
        if let Some(analyzer) = self.analyzer {
            coherence = coherence.with_analyzer(analyzer);
        }

        let mut agent = CognitiveAgent::from_parts(
            self.config,
            self.network.unwrap_or_default(),
            scorer,
            emergence,
            coherence,
        );
        if let Some(sink) = self.sink {
            agent = agent.with_sink(sink);
        }
        agent
    }
}
