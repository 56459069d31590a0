//! Core types for congress deliberation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderError;

/// Highest strength an argument can carry.
pub const MAX_ARGUMENT_STRENGTH: f64 = 10.0;

/// One of the four fixed reasoning stances in a congress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerspectiveRole {
    /// Argues for the most promising answer
    Advocate,
    /// Attacks weaknesses in the advocate's case
    Skeptic,
    /// Integrates the strongest points of both
    Synthesizer,
    /// Checks the answer against ethical commitments
    Ethics,
}

impl PerspectiveRole {
    /// Roles in canonical order. Used for tie-breaking.
    pub fn canonical_order() -> [Self; 4] {
        [Self::Advocate, Self::Skeptic, Self::Synthesizer, Self::Ethics]
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advocate => "advocate",
            Self::Skeptic => "skeptic",
            Self::Synthesizer => "synthesizer",
            Self::Ethics => "ethics",
        }
    }
}

/// One perspective's contribution to a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongressPerspective {
    /// Which stance produced this argument
    pub role: PerspectiveRole,
    /// Position taken
    pub position: String,
    /// Reasoning behind the position
    pub reasoning: String,
    /// Strength of the argument (0.0 - 10.0)
    pub strength_of_argument: f64,
    /// Call that produced this perspective (1-based)
    pub call_number: u8,
    /// Beliefs this argument leans on
    pub linked_belief_ids: Vec<String>,
}

impl CongressPerspective {
    /// Create a validated perspective.
    pub fn new(
        role: PerspectiveRole,
        position: impl Into<String>,
        reasoning: impl Into<String>,
        strength_of_argument: f64,
        call_number: u8,
    ) -> Result<Self> {
        if !(0.0..=MAX_ARGUMENT_STRENGTH).contains(&strength_of_argument) {
            return Err(CongressError::InvalidStrength(strength_of_argument));
        }
        if call_number == 0 {
            return Err(CongressError::CallOutOfSequence(call_number));
        }

        Ok(Self {
            role,
            position: position.into(),
            reasoning: reasoning.into(),
            strength_of_argument,
            call_number,
            linked_belief_ids: Vec::new(),
        })
    }

    /// Link beliefs to this perspective.
    pub fn with_linked_beliefs(mut self, ids: Vec<String>) -> Self {
        self.linked_belief_ids = ids;
        self
    }
}

/// Kind of reasoning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Initial look at the query
    Analysis,
    /// Something worth worrying about
    Concern,
    /// Summary of a debate exchange
    Debate,
    /// Something learned
    Insight,
    /// Earlier reasoning replaced
    Revision,
}

/// A step in the deliberation trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Unique step ID
    pub id: String,
    /// Step type
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Step content
    pub content: String,
    /// When the step was recorded
    pub timestamp: DateTime<Utc>,
    /// Reasoning being replaced (revision steps only)
    pub original_reasoning: Option<String>,
    /// Why it was replaced (revision steps only)
    pub revision_reason: Option<String>,
    /// Call this step closes, if any
    pub call_number: Option<u8>,
    /// Beliefs this step touches
    pub linked_belief_ids: Vec<String>,
    /// Whether the user explicitly flagged this step
    pub user_flagged: bool,
}

impl ReasoningStep {
    /// Create a non-revision step.
    pub fn new(step_type: StepType, content: impl Into<String>) -> Result<Self> {
        if step_type == StepType::Revision {
            return Err(CongressError::IncompleteRevisionStep);
        }
        Ok(Self::build(step_type, content.into(), None, None))
    }

    /// Create a revision step. Both the original reasoning and the reason
    /// for revising are required.
    pub fn revision(
        content: impl Into<String>,
        original_reasoning: impl Into<String>,
        revision_reason: impl Into<String>,
    ) -> Result<Self> {
        let original_reasoning = original_reasoning.into();
        let revision_reason = revision_reason.into();
        if original_reasoning.trim().is_empty() || revision_reason.trim().is_empty() {
            return Err(CongressError::IncompleteRevisionStep);
        }
        Ok(Self::build(
            StepType::Revision,
            content.into(),
            Some(original_reasoning),
            Some(revision_reason),
        ))
    }

    fn build(
        step_type: StepType,
        content: String,
        original_reasoning: Option<String>,
        revision_reason: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            step_type,
            content,
            timestamp: Utc::now(),
            original_reasoning,
            revision_reason,
            call_number: None,
            linked_belief_ids: Vec::new(),
            user_flagged: false,
        }
    }

    /// Shorthand for an insight step.
    pub fn insight(content: impl Into<String>) -> Self {
        Self::build(StepType::Insight, content.into(), None, None)
    }

    /// Shorthand for a debate step.
    pub fn debate(content: impl Into<String>) -> Self {
        Self::build(StepType::Debate, content.into(), None, None)
    }

    /// Attach the call this step belongs to.
    pub fn with_call(mut self, call_number: u8) -> Self {
        self.call_number = Some(call_number);
        self
    }

    /// Link beliefs to this step.
    pub fn with_linked_beliefs(mut self, ids: Vec<String>) -> Self {
        self.linked_belief_ids = ids;
        self
    }

    /// Mark the step as flagged by the user.
    pub fn flagged_by_user(mut self) -> Self {
        self.user_flagged = true;
        self
    }

    /// Check the revision pairing invariant. Steps arrive from providers as
    /// plain data, so they are checked again before entering an entry.
    pub fn validate(&self) -> Result<()> {
        let paired = self
            .original_reasoning
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
            && self
                .revision_reason
                .as_deref()
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);

        if self.step_type == StepType::Revision && !paired {
            return Err(CongressError::IncompleteRevisionStep);
        }
        Ok(())
    }
}

/// Status of a candidate response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Still in the running
    Considering,
    /// Chosen as the final answer
    Selected,
    /// Discarded
    Rejected,
}

/// A draft answer considered during deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResponse {
    /// Draft number, unique within an entry (1-based)
    pub draft_number: u32,
    /// Draft text
    pub content: String,
    /// Current status
    pub status: CandidateStatus,
    /// Why the draft was rejected; present exactly when rejected
    pub rejection_reason: Option<String>,
}

impl CandidateResponse {
    /// Create a validated candidate.
    pub fn new(
        draft_number: u32,
        content: impl Into<String>,
        status: CandidateStatus,
        rejection_reason: Option<String>,
    ) -> Result<Self> {
        let candidate = Self {
            draft_number,
            content: content.into(),
            status,
            rejection_reason,
        };
        candidate.validate()?;
        Ok(candidate)
    }

    /// A draft still under consideration.
    pub fn considering(draft_number: u32, content: impl Into<String>) -> Result<Self> {
        Self::new(draft_number, content, CandidateStatus::Considering, None)
    }

    /// A rejected draft with its reason.
    pub fn rejected(
        draft_number: u32,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<Self> {
        Self::new(draft_number, content, CandidateStatus::Rejected, Some(reason.into()))
    }

    /// Check the draft-number and rejection-reason invariants.
    pub fn validate(&self) -> Result<()> {
        if self.draft_number == 0 {
            return Err(CongressError::InvalidDraftNumber);
        }

        let has_reason = self
            .rejection_reason
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false);

        match (self.status, has_reason) {
            (CandidateStatus::Rejected, false) => {
                Err(CongressError::MissingRejectionReason(self.draft_number))
            }
            (CandidateStatus::Considering | CandidateStatus::Selected, _)
                if self.rejection_reason.is_some() =>
            {
                Err(CongressError::UnexpectedRejectionReason(self.draft_number))
            }
            _ => Ok(()),
        }
    }
}

/// Error types for congress deliberation.
#[derive(Debug, thiserror::Error)]
pub enum CongressError {
    /// Complexity weight outside [1, 9]
    #[error("Complexity weight {0} is outside [1, 9]")]
    ComplexityOutOfRange(f64),

    /// Route fields disagree with what the weight derives
    #[error("Route does not match the routing of weight {0}")]
    RouteMismatch(f64),

    /// Argument strength outside [0, 10]
    #[error("Argument strength {0} is outside [0, 10]")]
    InvalidStrength(f64),

    /// Perspective call number not in the route's call sequence
    #[error("Call number {0} is not part of the call sequence")]
    CallOutOfSequence(u8),

    /// Perspectives were added under the direct strategy
    #[error("Direct engagement must not carry perspectives")]
    PerspectivesUnderDirect,

    /// Rejected draft without a reason
    #[error("Rejected draft {0} has no rejection reason")]
    MissingRejectionReason(u32),

    /// Non-rejected draft carrying a rejection reason
    #[error("Draft {0} carries a rejection reason but is not rejected")]
    UnexpectedRejectionReason(u32),

    /// Draft number of zero
    #[error("Draft numbers start at 1")]
    InvalidDraftNumber,

    /// Draft number reused within an entry
    #[error("Draft {0} already exists in this entry")]
    DuplicateDraft(u32),

    /// Draft number not present in the entry
    #[error("Draft {0} not found")]
    DraftNotFound(u32),

    /// Revision step missing its paired fields
    #[error("Revision steps need both original reasoning and a revision reason")]
    IncompleteRevisionStep,

    /// Finalize needs exactly one selected draft
    #[error("Finalize requires exactly one selected draft, found {0}")]
    SelectionCount(usize),

    /// Entry was already finalized
    #[error("Logic entry is already finalized")]
    AlreadyFinalized,

    /// Operation needs a finalized entry
    #[error("Logic entry has not been finalized")]
    NotFinalized,

    /// Profound insights were already recorded
    #[error("Profound insights were already recorded for this entry")]
    AlreadyScored,

    /// Perspective provider failed
    #[error("Perspective provider error: {0}")]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, CongressError>;
