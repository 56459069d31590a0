//! The belief network - owns every belief and all mutations on them.
//!
//! Every weight change goes through one of the audited operations below,
//! each of which appends exactly one [`BeliefRevision`] and clamps the
//! resulting weight into range. Connections are kept symmetric.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::tension::TensionAnalyzer;
use crate::types::{
    BeliefDomain, BeliefError, BeliefNode, BeliefRevision, Result, RevisionType, MAX_WEIGHT,
    MIN_WEIGHT,
};

/// Number of core beliefs seeded at initialization.
pub const CORE_BELIEF_COUNT: usize = 3;

/// Per-domain slice of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainStats {
    /// Beliefs in this domain
    pub count: usize,
    /// Sum of their weights
    pub total_weight: u32,
    /// Share of the network's total weight (0.0 - 1.0)
    pub weight_share: f64,
}

/// How evenly weight is spread across domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBalance {
    /// Stats for every domain (empty domains included)
    pub domains: BTreeMap<BeliefDomain, DomainStats>,
    /// Domain carrying the most weight
    pub dominant: Option<BeliefDomain>,
    /// 1.0 when populated domains carry equal weight
    pub balance_score: f64,
}

/// Collection of beliefs with aggregate coherence metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefNetwork {
    beliefs: Vec<BeliefNode>,
}

impl BeliefNetwork {
    /// Create a network seeded with the three core beliefs.
    pub fn new() -> Self {
        Self {
            beliefs: Self::core_beliefs_seed(),
        }
    }

    /// Create a network with no beliefs at all. Intended for tests and
    /// tooling; a live agent always starts from [`BeliefNetwork::new`].
    pub fn empty() -> Self {
        Self { beliefs: Vec::new() }
    }

    fn core_beliefs_seed() -> Vec<BeliefNode> {
        vec![
            BeliefNode::new(
                "Honesty matters more than comfort",
                BeliefDomain::Ethics,
                "A comforting answer that misleads does more harm than an uncomfortable truth.",
                8,
                true,
            ),
            BeliefNode::new(
                "Knowledge is provisional",
                BeliefDomain::Knowledge,
                "Every conclusion stays open to revision when better evidence arrives.",
                7,
                true,
            ),
            BeliefNode::new(
                "Understanding the person comes first",
                BeliefDomain::Relational,
                "An answer only helps if it fits the person asking.",
                7,
                true,
            ),
        ]
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of beliefs.
    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    /// Whether the network has no beliefs.
    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    /// All beliefs in insertion order.
    pub fn beliefs(&self) -> &[BeliefNode] {
        &self.beliefs
    }

    /// Look up a belief by ID.
    pub fn get(&self, id: &str) -> Option<&BeliefNode> {
        self.beliefs.iter().find(|b| b.id == id)
    }

    /// Look up a belief by exact stance.
    pub fn find_by_stance(&self, stance: &str) -> Option<&BeliefNode> {
        self.beliefs.iter().find(|b| b.stance == stance)
    }

    /// Beliefs in a domain.
    pub fn by_domain(&self, domain: BeliefDomain) -> Vec<&BeliefNode> {
        self.beliefs.iter().filter(|b| b.domain == domain).collect()
    }

    /// Core beliefs.
    pub fn core_beliefs(&self) -> Vec<&BeliefNode> {
        self.beliefs.iter().filter(|b| b.is_core).collect()
    }

    /// Learned (non-core) beliefs.
    pub fn learned_beliefs(&self) -> Vec<&BeliefNode> {
        self.beliefs.iter().filter(|b| !b.is_core).collect()
    }

    /// Beliefs connected to the given belief.
    pub fn connections_of(&self, id: &str) -> Result<Vec<&BeliefNode>> {
        let belief = self.get(id).ok_or_else(|| BeliefError::NotFound(id.to_string()))?;
        Ok(belief
            .connections
            .iter()
            .filter_map(|c| self.get(c))
            .collect())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut BeliefNode> {
        self.beliefs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BeliefError::NotFound(id.to_string()))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn require_reason(reason: &str) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(BeliefError::EmptyReason);
        }
        Ok(())
    }

    fn mutate(
        &mut self,
        id: &str,
        revision_type: RevisionType,
        reason: &str,
        target: impl FnOnce(u8) -> i32,
    ) -> Result<BeliefRevision> {
        Self::require_reason(reason)?;
        let belief = self.get_mut(id)?;
        let requested = target(belief.weight);
        let revision = belief.apply(revision_type, requested, reason);

        debug!(
            belief_id = %id,
            revision_type = ?revision_type,
            previous_weight = revision.previous_weight,
            new_weight = revision.new_weight,
            "Belief revised"
        );

        Ok(revision)
    }

    /// Record a challenge to a belief. The weight is left where it is.
    pub fn challenge(&mut self, id: &str, reason: &str) -> Result<BeliefRevision> {
        self.mutate(id, RevisionType::Challenge, reason, i32::from)
    }

    /// Raise a belief's weight by one.
    pub fn strengthen(&mut self, id: &str, reason: &str) -> Result<BeliefRevision> {
        self.mutate(id, RevisionType::Strengthen, reason, |w| i32::from(w) + 1)
    }

    /// Lower a belief's weight by one. Core and learned beliefs share the
    /// same floor of 1.
    pub fn weaken(&mut self, id: &str, reason: &str) -> Result<BeliefRevision> {
        self.mutate(id, RevisionType::Weaken, reason, |w| i32::from(w) - 1)
    }

    /// Rewrite a belief's reasoning without moving its weight.
    pub fn revise(&mut self, id: &str, new_reasoning: &str, reason: &str) -> Result<BeliefRevision> {
        let revision = self.mutate(id, RevisionType::Revise, reason, i32::from)?;
        let belief = self.get_mut(id)?;
        belief.reasoning = new_reasoning.to_string();
        Ok(revision)
    }

    /// Move a belief to an arbitrary weight. Out-of-range requests are
    /// clamped. Recorded as a strengthen when the weight goes up, otherwise
    /// as a weaken, with the same reason text either way.
    pub fn update_weight(&mut self, id: &str, new_weight: i32, reason: &str) -> Result<BeliefRevision> {
        Self::require_reason(reason)?;
        let current = i32::from(self.get(id).ok_or_else(|| BeliefError::NotFound(id.to_string()))?.weight);
        let revision_type = if new_weight > current {
            RevisionType::Strengthen
        } else {
            RevisionType::Weaken
        };
        self.mutate(id, revision_type, reason, |_| new_weight)
    }

    /// Connect two beliefs (both directions). Connecting an already
    /// connected pair, or a belief to itself, changes nothing.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<()> {
        self.ensure_exists(a)?;
        self.ensure_exists(b)?;
        if a == b {
            return Ok(());
        }

        for (from, to) in [(a, b), (b, a)] {
            let node = self.get_mut(from)?;
            if !node.is_connected_to(to) {
                node.connections.push(to.to_string());
            }
        }

        debug!(belief_a = %a, belief_b = %b, "Beliefs connected");
        Ok(())
    }

    /// Remove a connection (both directions). Idempotent.
    pub fn disconnect(&mut self, a: &str, b: &str) -> Result<()> {
        self.ensure_exists(a)?;
        self.ensure_exists(b)?;

        for (from, to) in [(a, b), (b, a)] {
            let node = self.get_mut(from)?;
            node.connections.retain(|c| c != to);
        }

        debug!(belief_a = %a, belief_b = %b, "Beliefs disconnected");
        Ok(())
    }

    fn ensure_exists(&self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(BeliefError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Insert a learned belief, e.g. an accepted emergent candidate.
    /// Returns the new belief's ID.
    pub fn add_learned(
        &mut self,
        stance: impl Into<String>,
        domain: BeliefDomain,
        reasoning: impl Into<String>,
        weight: i32,
    ) -> String {
        let belief = BeliefNode::new(stance, domain, reasoning, weight, false);
        let id = belief.id.clone();

        info!(
            belief_id = %id,
            stance = %belief.stance,
            domain = %domain.as_str(),
            weight = belief.weight,
            "Learned belief added"
        );

        self.beliefs.push(belief);
        id
    }

    /// Remove a learned belief and every connection pointing at it.
    pub fn remove_learned(&mut self, id: &str) -> Result<BeliefNode> {
        let index = self
            .beliefs
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BeliefError::NotFound(id.to_string()))?;

        if self.beliefs[index].is_core {
            return Err(BeliefError::CoreBeliefProtected(id.to_string()));
        }

        let removed = self.beliefs.remove(index);
        for belief in &mut self.beliefs {
            belief.connections.retain(|c| c != id);
        }

        info!(belief_id = %id, "Learned belief removed");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Metrics
    // ------------------------------------------------------------------

    /// Network coherence (0 - 100): mean of every belief's coherence.
    pub fn coherence_score(&self) -> f64 {
        if self.beliefs.is_empty() {
            return 100.0;
        }
        let total: f64 = self.beliefs.iter().map(BeliefNode::coherence).sum();
        total / self.beliefs.len() as f64
    }

    /// IDs of beliefs currently in unresolved tension.
    pub fn oscillating_beliefs(&self, analyzer: &TensionAnalyzer) -> Vec<String> {
        self.beliefs
            .iter()
            .filter(|b| analyzer.analyze_belief(b).unresolved)
            .map(|b| b.id.clone())
            .collect()
    }

    /// Weight distribution across domains.
    pub fn domain_balance(&self) -> DomainBalance {
        let total_weight: u32 = self.beliefs.iter().map(|b| u32::from(b.weight)).sum();

        let mut domains = BTreeMap::new();
        for domain in BeliefDomain::all() {
            let members = self.by_domain(domain);
            let domain_weight: u32 = members.iter().map(|b| u32::from(b.weight)).sum();
            let weight_share = if total_weight > 0 {
                f64::from(domain_weight) / f64::from(total_weight)
            } else {
                0.0
            };
            domains.insert(
                domain,
                DomainStats {
                    count: members.len(),
                    total_weight: domain_weight,
                    weight_share,
                },
            );
        }

        let populated: Vec<(&BeliefDomain, &DomainStats)> =
            domains.iter().filter(|(_, s)| s.count > 0).collect();

        let dominant = populated
            .iter()
            .max_by(|a, b| {
                a.1.total_weight
                    .cmp(&b.1.total_weight)
                    // Earlier domain wins ties.
                    .then_with(|| b.0.cmp(a.0))
            })
            .map(|(d, _)| **d);

        let balance_score = if populated.is_empty() {
            1.0
        } else {
            let max = populated.iter().map(|(_, s)| s.weight_share).fold(0.0, f64::max);
            let min = populated.iter().map(|(_, s)| s.weight_share).fold(1.0, f64::min);
            1.0 - (max - min)
        };

        DomainBalance {
            domains,
            dominant,
            balance_score,
        }
    }

    /// SHA-256 fingerprint of the network state.
    pub fn state_hash(&self) -> String {
        let mut hasher = Sha256::new();

        // Sort by ID for deterministic hashing
        let mut beliefs: Vec<&BeliefNode> = self.beliefs.iter().collect();
        beliefs.sort_by(|a, b| a.id.cmp(&b.id));

        for belief in beliefs {
            hasher.update(belief.id.as_bytes());
            hasher.update([belief.weight]);
            hasher.update((belief.revision_history.len() as u64).to_le_bytes());
            hasher.update(belief.reasoning.as_bytes());

            let mut connections = belief.connections.clone();
            connections.sort();
            for connection in connections {
                hasher.update(connection.as_bytes());
            }
        }

        hex::encode(hasher.finalize())
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Serialize the network for persistence.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a persisted network, checking every invariant.
    pub fn from_json(json: &str) -> Result<Self> {
        let network: Self = serde_json::from_str(json)?;
        network.validate()?;
        Ok(network)
    }

    /// Check the invariants a persisted network must satisfy.
    pub fn validate(&self) -> Result<()> {
        let core_count = self.beliefs.iter().filter(|b| b.is_core).count();
        if core_count != CORE_BELIEF_COUNT {
            return Err(BeliefError::InvalidSnapshot(format!(
                "expected {} core beliefs, found {}",
                CORE_BELIEF_COUNT, core_count
            )));
        }

        let mut ids = HashSet::with_capacity(self.beliefs.len());
        for belief in &self.beliefs {
            if !ids.insert(belief.id.as_str()) {
                return Err(BeliefError::InvalidSnapshot(format!(
                    "belief id {} appears more than once",
                    belief.id
                )));
            }

            if belief.is_connected_to(&belief.id) {
                return Err(BeliefError::InvalidSnapshot(format!(
                    "belief {} is connected to itself",
                    belief.id
                )));
            }

            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&belief.weight) {
                return Err(BeliefError::InvalidSnapshot(format!(
                    "belief {} has weight {}",
                    belief.id, belief.weight
                )));
            }

            for pair in belief.revision_history.windows(2) {
                if pair[1].timestamp < pair[0].timestamp {
                    return Err(BeliefError::InvalidSnapshot(format!(
                        "belief {} has out-of-order revisions",
                        belief.id
                    )));
                }
            }

            if belief.revision_history.iter().any(|r| r.reason.trim().is_empty()) {
                return Err(BeliefError::InvalidSnapshot(format!(
                    "belief {} has a revision without a reason",
                    belief.id
                )));
            }

            for connection in &belief.connections {
                let symmetric = self
                    .get(connection)
                    .map(|other| other.is_connected_to(&belief.id))
                    .unwrap_or(false);
                if !symmetric {
                    return Err(BeliefError::InvalidSnapshot(format!(
                        "connection {} -> {} is not symmetric",
                        belief.id, connection
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for BeliefNetwork {
    fn default() -> Self {
        Self::new()
    }
}
