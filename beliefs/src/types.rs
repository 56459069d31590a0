//! Core types for the belief network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest weight a belief can hold.
pub const MIN_WEIGHT: u8 = 1;

/// Highest weight a belief can hold.
pub const MAX_WEIGHT: u8 = 10;

/// Clamp an arbitrary requested weight into the valid belief range.
pub fn clamp_weight(weight: i32) -> u8 {
    weight.clamp(MIN_WEIGHT as i32, MAX_WEIGHT as i32) as u8
}

/// Area of the agent's worldview a belief belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeliefDomain {
    /// Beliefs about the agent itself
    #[serde(rename = "self")]
    SelfModel,
    /// Beliefs about knowledge and the world
    Knowledge,
    /// Moral commitments
    Ethics,
    /// Beliefs about people and relationships
    Relational,
    /// Beliefs about reasoning itself
    Meta,
}

impl BeliefDomain {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfModel => "SELF",
            Self::Knowledge => "KNOWLEDGE",
            Self::Ethics => "ETHICS",
            Self::Relational => "RELATIONAL",
            Self::Meta => "META",
        }
    }

    /// All domains in declaration order.
    pub fn all() -> [Self; 5] {
        [
            Self::SelfModel,
            Self::Knowledge,
            Self::Ethics,
            Self::Relational,
            Self::Meta,
        ]
    }
}

/// Kind of change recorded in a belief's revision history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionType {
    /// The belief was questioned
    Challenge,
    /// Weight increased
    Strengthen,
    /// Weight decreased
    Weaken,
    /// Reasoning rewritten
    Revise,
}

/// One audited change to a belief. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRevision {
    /// When the revision happened
    pub timestamp: DateTime<Utc>,
    /// What kind of revision this was
    #[serde(rename = "type")]
    pub revision_type: RevisionType,
    /// Weight before the revision
    pub previous_weight: u8,
    /// Weight after the revision
    pub new_weight: u8,
    /// Why the revision happened
    pub reason: String,
}

impl BeliefRevision {
    /// True when the revision moved the weight upward.
    pub fn is_upward(&self) -> bool {
        self.new_weight > self.previous_weight
    }
}

/// A single weighted stance held by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefNode {
    /// Unique belief ID
    pub id: String,
    /// Short stance label
    pub stance: String,
    /// Domain of the belief
    pub domain: BeliefDomain,
    /// Free-text reasoning behind the stance
    pub reasoning: String,
    /// Current weight (1 - 10)
    pub(crate) weight: u8,
    /// Core beliefs are seeded at initialization and never removed
    pub is_core: bool,
    /// Append-only audit trail, oldest first
    pub(crate) revision_history: Vec<BeliefRevision>,
    /// IDs of connected beliefs
    pub(crate) connections: Vec<String>,
    /// When the belief was created
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub last_updated_at: DateTime<Utc>,
}

impl BeliefNode {
    /// Create a new belief. The weight is clamped into range.
    pub fn new(
        stance: impl Into<String>,
        domain: BeliefDomain,
        reasoning: impl Into<String>,
        weight: i32,
        is_core: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            stance: stance.into(),
            domain,
            reasoning: reasoning.into(),
            weight: clamp_weight(weight),
            is_core,
            revision_history: Vec::new(),
            connections: Vec::new(),
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Current weight.
    pub fn weight(&self) -> u8 {
        self.weight
    }

    /// Revision history, oldest first.
    pub fn revision_history(&self) -> &[BeliefRevision] {
        &self.revision_history
    }

    /// Number of recorded revisions.
    pub fn revision_count(&self) -> usize {
        self.revision_history.len()
    }

    /// Connected belief IDs.
    pub fn connections(&self) -> &[String] {
        &self.connections
    }

    /// Whether this belief is connected to another.
    pub fn is_connected_to(&self, other_id: &str) -> bool {
        self.connections.iter().any(|c| c == other_id)
    }

    /// Individual coherence contribution (0 - 100).
    ///
    /// High weight raises it; every revision costs two points regardless of
    /// direction.
    pub fn coherence(&self) -> f64 {
        let base = f64::from(self.weight) * 10.0;
        let penalty = self.revision_history.len() as f64 * 2.0;
        (base - penalty).clamp(0.0, 100.0)
    }

    /// Highest and lowest weight reached across the revision history.
    pub fn historical_extremes(&self) -> Option<(u8, u8)> {
        let max = self.revision_history.iter().map(|r| r.new_weight).max()?;
        let min = self.revision_history.iter().map(|r| r.new_weight).min()?;
        Some((max, min))
    }

    /// Append a revision and move the weight. Used by the network, which
    /// validates the reason first.
    pub(crate) fn apply(
        &mut self,
        revision_type: RevisionType,
        requested_weight: i32,
        reason: &str,
    ) -> BeliefRevision {
        let previous_weight = self.weight;
        let new_weight = clamp_weight(requested_weight);

        // Keep the history monotonic even if the wall clock steps backwards.
        let mut timestamp = Utc::now();
        if let Some(last) = self.revision_history.last() {
            if timestamp < last.timestamp {
                timestamp = last.timestamp;
            }
        }

        let revision = BeliefRevision {
            timestamp,
            revision_type,
            previous_weight,
            new_weight,
            reason: reason.to_string(),
        };

        self.weight = new_weight;
        self.last_updated_at = timestamp;
        self.revision_history.push(revision.clone());
        revision
    }
}

/// Error types for belief operations.
#[derive(Debug, thiserror::Error)]
pub enum BeliefError {
    /// A mutation was attempted without a reason
    #[error("Belief mutation requires a non-empty reason")]
    EmptyReason,

    /// Belief lookup failed
    #[error("Belief not found: {0}")]
    NotFound(String),

    /// Core beliefs cannot be removed
    #[error("Core belief {0} cannot be removed")]
    CoreBeliefProtected(String),

    /// Loaded state violates a network invariant
    #[error("Invalid network snapshot: {0}")]
    InvalidSnapshot(String),

    /// Snapshot (de)serialization failed
    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BeliefError>;
