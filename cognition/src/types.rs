//! Core types for cognition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beliefs::BeliefError;
use congress::{CongressError, LogicEntry};

/// What an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    /// What the user prefers
    UserPreference,
    /// How the user tends to behave
    UserPattern,
    /// Facts about the user's situation
    UserContext,
    /// The agent looking at itself
    SelfReflection,
    /// How the agent reasons
    ReasoningPattern,
    /// How the agent's beliefs are changing
    BeliefGrowth,
}

impl InsightCategory {
    /// Whether the insight describes the user rather than the agent.
    pub fn is_human_facing(&self) -> bool {
        matches!(
            self,
            Self::UserPreference | Self::UserPattern | Self::UserContext
        )
    }
}

/// Something the agent learned. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Unique insight ID
    pub id: String,
    /// Insight text
    pub content: String,
    /// Category
    pub category: InsightCategory,
    /// Belief this insight relates to
    pub related_belief_id: Option<String>,
    /// Where the insight came from (the logic entry ID for congress insights)
    pub source: String,
    /// When the insight was recorded
    pub timestamp: DateTime<Utc>,
}

impl Insight {
    /// Create a new insight.
    pub fn new(
        content: impl Into<String>,
        category: InsightCategory,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            category,
            related_belief_id: None,
            source: source.into(),
            timestamp: Utc::now(),
        }
    }

    /// Relate the insight to a belief.
    pub fn with_related_belief(mut self, belief_id: impl Into<String>) -> Self {
        self.related_belief_id = Some(belief_id.into());
        self
    }

    /// Derive insights from an entry's insight steps. Each step's first
    /// linked belief becomes the related belief.
    pub fn from_entry(entry: &LogicEntry, category: InsightCategory) -> Vec<Self> {
        entry
            .insight_steps()
            .into_iter()
            .map(|step| {
                let insight = Self::new(step.content.clone(), category, entry.id());
                match step.linked_belief_ids.first() {
                    Some(id) => insight.with_related_belief(id.clone()),
                    None => insight,
                }
            })
            .collect()
    }
}

/// A recurring pattern found across interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    /// Unique pattern ID
    pub id: String,
    /// Pattern label (normalized insight text)
    pub pattern: String,
    /// Human-readable description
    pub description: String,
    /// Insight texts supporting the pattern
    pub evidence: Vec<String>,
    /// Share of interactions showing the pattern (0.0 - 1.0)
    pub frequency: f64,
    /// Beliefs the evidence relates to
    pub related_beliefs: Vec<String>,
    /// When the pattern was found
    pub discovered_at: DateTime<Utc>,
}

impl LearnedPattern {
    /// Create a pattern. Frequency is clamped into [0, 1].
    pub fn new(
        pattern: impl Into<String>,
        description: impl Into<String>,
        evidence: Vec<String>,
        frequency: f64,
        related_beliefs: Vec<String>,
    ) -> Self {
        let frequency = if frequency.is_nan() {
            0.0
        } else {
            frequency.clamp(0.0, 1.0)
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pattern: pattern.into(),
            description: description.into(),
            evidence,
            frequency,
            related_beliefs,
            discovered_at: Utc::now(),
        }
    }
}

/// Error types for cognition.
#[derive(Debug, thiserror::Error)]
pub enum CognitionError {
    /// Deliberation is paused until the network is consolidated
    #[error("Deliberation paused: consolidation required (coherence {0:.1})")]
    ConsolidationPending(f64),

    /// Consolidation is missing a choice for an oscillating belief
    #[error("No consolidation choice for oscillating belief {0}")]
    MissingResolution(String),

    /// Pattern not in the review queue
    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    /// Belief network error
    #[error("Belief error: {0}")]
    Belief(#[from] BeliefError),

    /// Congress error
    #[error("Congress error: {0}")]
    Congress(#[from] CongressError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence sink failure
    #[error("Sink error: {0}")]
    Sink(String),
}

impl From<serde_yaml::Error> for CognitionError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CognitionError>;
