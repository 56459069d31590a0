//! Insight scorer - rates insight steps against a weighted rubric.

use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

use beliefs::{BeliefNetwork, TensionAnalyzer};
use congress::{CongressError, LogicEntry, PerspectiveRole, ProfoundInsight, ReasoningStep};

use crate::config::ScorerConfig;
use crate::text::significant_terms;
use crate::types::Result;

/// How new an insight is compared with everything seen before.
pub trait NoveltyMeasure: Send + Sync {
    /// Novelty in [0, 1]; 1 means nothing like it was seen before.
    fn novelty(&self, content: &str, prior: &[String]) -> f64;
}

impl<T: NoveltyMeasure + ?Sized> NoveltyMeasure for Box<T> {
    fn novelty(&self, content: &str, prior: &[String]) -> f64 {
        (**self).novelty(content, prior)
    }
}

/// Fraction of the insight's significant terms that appear in no prior
/// insight.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnseenTermsNovelty;

impl NoveltyMeasure for UnseenTermsNovelty {
    fn novelty(&self, content: &str, prior: &[String]) -> f64 {
        let terms = significant_terms(content);
        if terms.is_empty() {
            return 0.0;
        }
        let seen: HashSet<String> = prior.iter().flat_map(|p| significant_terms(p)).collect();
        let unseen = terms.iter().filter(|t| !seen.contains(*t)).count();
        unseen as f64 / terms.len() as f64
    }
}

/// Per-criterion breakdown for one insight step.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightScore {
    /// Step scored
    pub step_id: String,
    /// Step text
    pub content: String,
    /// Linked belief was revised this turn
    pub triggered_revision: bool,
    /// Roles whose reasoning overlaps the step
    pub overlapping_roles: Vec<PerspectiveRole>,
    /// Linked belief is in unresolved tension
    pub touches_tension: bool,
    /// Novelty (0.0 - 1.0)
    pub novelty: f64,
    /// User flagged the step
    pub user_flagged: bool,
    /// Capped total (0.0 - 1.0)
    pub total: f64,
    /// Total reached the profound threshold
    pub profound: bool,
}

/// Scores the insight steps of finalized entries.
pub struct InsightScorer {
    config: ScorerConfig,
    analyzer: TensionAnalyzer,
    novelty: Box<dyn NoveltyMeasure>,
    history: Vec<String>,
}

impl InsightScorer {
    /// Create a scorer with the default rubric.
    pub fn new() -> Self {
        Self::with_config(ScorerConfig::default())
    }

    /// Create with a custom rubric.
    pub fn with_config(config: ScorerConfig) -> Self {
        Self {
            config,
            analyzer: TensionAnalyzer::new(),
            novelty: Box::new(UnseenTermsNovelty),
            history: Vec::new(),
        }
    }

    /// Replace the novelty measure.
    pub fn with_novelty(mut self, novelty: impl NoveltyMeasure + 'static) -> Self {
        self.novelty = Box::new(novelty);
        self
    }

    /// Seed prior insight text.
    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    /// Insight text scored so far.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Score every insight step of a finalized entry and record the
    /// profound ones on it. An entry can only be scored once.
    pub fn score_entry(
        &mut self,
        entry: &mut LogicEntry,
        network: &BeliefNetwork,
    ) -> Result<Vec<InsightScore>> {
        if !entry.is_finalized() {
            return Err(CongressError::NotFinalized.into());
        }
        if entry.is_scored() {
            return Err(CongressError::AlreadyScored.into());
        }

        let scores: Vec<InsightScore> = entry
            .insight_steps()
            .into_iter()
            .map(|step| {
                let score = self.score_step(step, entry, network);
                self.history.push(step.content.clone());
                score
            })
            .collect();

        let profound: Vec<ProfoundInsight> = scores
            .iter()
            .filter(|s| s.profound)
            .map(|s| ProfoundInsight {
                step_id: s.step_id.clone(),
                content: s.content.clone(),
                score: s.total,
            })
            .collect();

        info!(
            entry_id = %entry.id(),
            scored = scores.len(),
            profound = profound.len(),
            "Insights scored"
        );
        entry.record_profound_insights(profound)?;

        Ok(scores)
    }

    /// Score one step in the context of its entry.
    pub fn score_step(
        &self,
        step: &ReasoningStep,
        entry: &LogicEntry,
        network: &BeliefNetwork,
    ) -> InsightScore {
        let linked = Self::linked_beliefs(step, entry);

        let triggered_revision = linked.iter().filter_map(|id| network.get(id)).any(|b| {
            b.revision_history()
                .iter()
                .any(|r| r.timestamp >= entry.created_at())
        });

        let touches_tension = linked
            .iter()
            .filter_map(|id| network.get(id))
            .any(|b| self.analyzer.analyze_belief(b).unresolved);

        let overlapping_roles = self.overlapping_roles(step, entry);
        let novelty = self.novelty.novelty(&step.content, &self.history).clamp(0.0, 1.0);

        let mut total = 0.0;
        if triggered_revision {
            total += self.config.revision_weight;
        }
        if overlapping_roles.len() >= self.config.min_overlapping_perspectives {
            total += self.config.perspective_overlap_weight;
        }
        if touches_tension {
            total += self.config.tension_resolution_weight;
        }
        total += self.config.novelty_weight * novelty;
        if step.user_flagged {
            total += self.config.user_flag_weight;
        }
        let total = f64::min(total, 1.0);
        let profound = total >= self.config.profound_threshold;

        debug!(
            step_id = %step.id,
            total,
            profound,
            "Insight step scored"
        );

        InsightScore {
            step_id: step.id.clone(),
            content: step.content.clone(),
            triggered_revision,
            overlapping_roles,
            touches_tension,
            novelty,
            user_flagged: step.user_flagged,
            total,
            profound,
        }
    }

    /// Beliefs linked by the step; falls back to every belief the entry's
    /// perspectives link when the step links none.
    fn linked_beliefs(step: &ReasoningStep, entry: &LogicEntry) -> BTreeSet<String> {
        if !step.linked_belief_ids.is_empty() {
            return step.linked_belief_ids.iter().cloned().collect();
        }
        entry
            .perspectives()
            .iter()
            .flat_map(|p| p.linked_belief_ids.iter().cloned())
            .collect()
    }

    fn overlapping_roles(&self, step: &ReasoningStep, entry: &LogicEntry) -> Vec<PerspectiveRole> {
        let step_terms = significant_terms(&step.content);

        entry
            .participating_roles()
            .into_iter()
            .filter(|role| {
                let role_terms: BTreeSet<String> = entry
                    .perspectives()
                    .iter()
                    .filter(|p| p.role == *role)
                    .flat_map(|p| {
                        significant_terms(&format!("{} {}", p.position, p.reasoning))
                    })
                    .collect();
                step_terms.intersection(&role_terms).count() >= self.config.min_shared_terms
            })
            .collect()
    }
}

impl Default for InsightScorer {
    fn default() -> Self {
        Self::new()
    }
}
