//! Logic entry - the record of one deliberation.
//!
//! An entry collects perspectives, reasoning steps and candidate drafts while
//! a congress runs. `finalize` is a one-time transition; afterwards the only
//! permitted write is recording which insights were judged profound.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::router::{ComplexityCategory, EngagementStrategy, Route};
use crate::types::{
    CandidateResponse, CandidateStatus, CongressError, CongressPerspective, PerspectiveRole,
    ReasoningStep, Result, StepType, MAX_ARGUMENT_STRENGTH,
};

/// An insight step the scorer judged profound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfoundInsight {
    /// Reasoning step the insight came from
    pub step_id: String,
    /// Insight text
    pub content: String,
    /// Rubric score (0.0 - 1.0)
    pub score: f64,
}

/// One deliberation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicEntry {
    id: String,
    user_query: String,
    weight: f64,
    complexity_category: ComplexityCategory,
    engagement_strategy: EngagementStrategy,
    call_sequence: Vec<u8>,
    perspectives: Vec<CongressPerspective>,
    reasoning_steps: Vec<ReasoningStep>,
    candidate_responses: Vec<CandidateResponse>,
    profound_insights: Option<Vec<ProfoundInsight>>,
    network_hash: Option<String>,
    final_response: Option<String>,
    final_reasoning: Option<String>,
    created_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

impl LogicEntry {
    /// Start a new entry for a routed query.
    pub fn new(user_query: impl Into<String>, route: &Route) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_query: user_query.into(),
            weight: route.weight(),
            complexity_category: route.category(),
            engagement_strategy: route.strategy(),
            call_sequence: route.call_sequence().to_vec(),
            perspectives: Vec::new(),
            reasoning_steps: Vec::new(),
            candidate_responses: Vec::new(),
            profound_insights: None,
            network_hash: None,
            final_response: None,
            final_reasoning: None,
            created_at: Utc::now(),
            finalized_at: None,
        }
    }

    /// Record the belief network state the entry deliberated against.
    pub fn with_network_hash(mut self, hash: impl Into<String>) -> Self {
        self.network_hash = Some(hash.into());
        self
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_finalized() {
            return Err(CongressError::AlreadyFinalized);
        }
        Ok(())
    }

    /// Add a perspective produced by one of the entry's calls.
    pub fn add_perspective(&mut self, perspective: CongressPerspective) -> Result<()> {
        self.ensure_open()?;

        if self.engagement_strategy == EngagementStrategy::Direct {
            return Err(CongressError::PerspectivesUnderDirect);
        }
        if !self.call_sequence.contains(&perspective.call_number) {
            return Err(CongressError::CallOutOfSequence(perspective.call_number));
        }
        if !(0.0..=MAX_ARGUMENT_STRENGTH).contains(&perspective.strength_of_argument) {
            return Err(CongressError::InvalidStrength(perspective.strength_of_argument));
        }

        self.perspectives.push(perspective);
        Ok(())
    }

    /// Add a reasoning step.
    pub fn add_step(&mut self, step: ReasoningStep) -> Result<()> {
        self.ensure_open()?;
        step.validate()?;
        self.reasoning_steps.push(step);
        Ok(())
    }

    /// Add a candidate draft.
    pub fn add_candidate(&mut self, candidate: CandidateResponse) -> Result<()> {
        self.ensure_open()?;
        candidate.validate()?;

        if self
            .candidate_responses
            .iter()
            .any(|c| c.draft_number == candidate.draft_number)
        {
            return Err(CongressError::DuplicateDraft(candidate.draft_number));
        }

        self.candidate_responses.push(candidate);
        Ok(())
    }

    fn candidate_mut(&mut self, draft_number: u32) -> Result<&mut CandidateResponse> {
        self.candidate_responses
            .iter_mut()
            .find(|c| c.draft_number == draft_number)
            .ok_or(CongressError::DraftNotFound(draft_number))
    }

    /// Select a draft. Any previously selected draft goes back to
    /// considering, so at most one draft is ever selected.
    pub fn select_candidate(&mut self, draft_number: u32) -> Result<()> {
        self.ensure_open()?;
        self.candidate_mut(draft_number)?;

        for candidate in &mut self.candidate_responses {
            if candidate.draft_number == draft_number {
                candidate.status = CandidateStatus::Selected;
                candidate.rejection_reason = None;
            } else if candidate.status == CandidateStatus::Selected {
                candidate.status = CandidateStatus::Considering;
            }
        }
        Ok(())
    }

    /// Reject a draft with a reason.
    pub fn reject_candidate(&mut self, draft_number: u32, reason: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(CongressError::MissingRejectionReason(draft_number));
        }

        let candidate = self.candidate_mut(draft_number)?;
        candidate.status = CandidateStatus::Rejected;
        candidate.rejection_reason = Some(reason);
        Ok(())
    }

    /// Freeze the entry with its final answer. Exactly one draft must be
    /// selected, and this can only happen once.
    pub fn finalize(
        &mut self,
        response: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Result<()> {
        self.ensure_open()?;

        let selected = self
            .candidate_responses
            .iter()
            .filter(|c| c.status == CandidateStatus::Selected)
            .count();
        if selected != 1 {
            return Err(CongressError::SelectionCount(selected));
        }

        self.final_response = Some(response.into());
        self.final_reasoning = Some(reasoning.into());
        self.finalized_at = Some(Utc::now());

        debug!(entry_id = %self.id, "Logic entry finalized");
        Ok(())
    }

    /// Record the profound insights found by the scorer. Only allowed once,
    /// and only on a finalized entry.
    pub fn record_profound_insights(&mut self, insights: Vec<ProfoundInsight>) -> Result<()> {
        if !self.is_finalized() {
            return Err(CongressError::NotFinalized);
        }
        if self.profound_insights.is_some() {
            return Err(CongressError::AlreadyScored);
        }
        self.profound_insights = Some(insights);
        Ok(())
    }

    /// Entry ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The user's query.
    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    /// Complexity weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Complexity category.
    pub fn complexity_category(&self) -> ComplexityCategory {
        self.complexity_category
    }

    /// Engagement strategy.
    pub fn engagement_strategy(&self) -> EngagementStrategy {
        self.engagement_strategy
    }

    /// Call sequence.
    pub fn call_sequence(&self) -> &[u8] {
        &self.call_sequence
    }

    /// All perspectives in the order they were produced.
    pub fn perspectives(&self) -> &[CongressPerspective] {
        &self.perspectives
    }

    /// Perspectives produced by one call.
    pub fn perspectives_for_call(&self, call_number: u8) -> Vec<&CongressPerspective> {
        self.perspectives
            .iter()
            .filter(|p| p.call_number == call_number)
            .collect()
    }

    /// Perspective with the strongest argument. Ties go to the role that
    /// comes first in canonical order.
    pub fn winning_perspective(&self) -> Option<&CongressPerspective> {
        self.perspectives.iter().fold(None, |best, p| match best {
            None => Some(p),
            Some(b) if p.strength_of_argument > b.strength_of_argument => Some(p),
            Some(b) if p.strength_of_argument == b.strength_of_argument && p.role < b.role => {
                Some(p)
            }
            Some(b) => Some(b),
        })
    }

    /// Roles that took part.
    pub fn participating_roles(&self) -> Vec<PerspectiveRole> {
        let mut roles: Vec<PerspectiveRole> = self.perspectives.iter().map(|p| p.role).collect();
        roles.sort();
        roles.dedup();
        roles
    }

    /// Reasoning steps in order.
    pub fn reasoning_steps(&self) -> &[ReasoningStep] {
        &self.reasoning_steps
    }

    /// Insight-type reasoning steps.
    pub fn insight_steps(&self) -> Vec<&ReasoningStep> {
        self.reasoning_steps
            .iter()
            .filter(|s| s.step_type == StepType::Insight)
            .collect()
    }

    /// Candidate drafts.
    pub fn candidate_responses(&self) -> &[CandidateResponse] {
        &self.candidate_responses
    }

    /// The selected draft, if any.
    pub fn selected_candidate(&self) -> Option<&CandidateResponse> {
        self.candidate_responses
            .iter()
            .find(|c| c.status == CandidateStatus::Selected)
    }

    /// Profound insights; empty until scored.
    pub fn profound_insights(&self) -> &[ProfoundInsight] {
        self.profound_insights.as_deref().unwrap_or(&[])
    }

    /// Whether the scorer has run on this entry.
    pub fn is_scored(&self) -> bool {
        self.profound_insights.is_some()
    }

    /// Network hash recorded at deliberation time.
    pub fn network_hash(&self) -> Option<&str> {
        self.network_hash.as_deref()
    }

    /// Final response, once finalized.
    pub fn final_response(&self) -> Option<&str> {
        self.final_response.as_deref()
    }

    /// Final reasoning, once finalized.
    pub fn final_reasoning(&self) -> Option<&str> {
        self.final_reasoning.as_deref()
    }

    /// When the entry was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the entry was finalized.
    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    /// Whether the entry is frozen.
    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::DeliberationRouter;

    fn moderate_entry() -> LogicEntry {
        let route = DeliberationRouter::route(4.0).unwrap();
        LogicEntry::new("Should I learn Rust?", &route)
    }

    #[test]
    fn test_direct_entry_rejects_perspectives() {
        let route = DeliberationRouter::route(1.0).unwrap();
        let mut entry = LogicEntry::new("What time is it?", &route);

        let perspective =
            CongressPerspective::new(PerspectiveRole::Advocate, "p", "r", 5.0, 1).unwrap();
        assert!(matches!(
            entry.add_perspective(perspective),
            Err(CongressError::PerspectivesUnderDirect)
        ));
        assert!(entry.perspectives().is_empty());
    }

    #[test]
    fn test_call_number_must_be_in_sequence() {
        let mut entry = moderate_entry();
        let perspective =
            CongressPerspective::new(PerspectiveRole::Skeptic, "p", "r", 5.0, 2).unwrap();
        assert!(matches!(
            entry.add_perspective(perspective),
            Err(CongressError::CallOutOfSequence(2))
        ));
    }

    #[test]
    fn test_duplicate_drafts_rejected() {
        let mut entry = moderate_entry();
        entry.add_candidate(CandidateResponse::considering(1, "a").unwrap()).unwrap();
        assert!(matches!(
            entry.add_candidate(CandidateResponse::considering(1, "b").unwrap()),
            Err(CongressError::DuplicateDraft(1))
        ));
    }

    #[test]
    fn test_finalize_requires_single_selection() {
        let mut entry = moderate_entry();
        entry.add_candidate(CandidateResponse::considering(1, "a").unwrap()).unwrap();
        entry.add_candidate(CandidateResponse::considering(2, "b").unwrap()).unwrap();

        assert!(matches!(
            entry.finalize("a", "because"),
            Err(CongressError::SelectionCount(0))
        ));

        entry.select_candidate(1).unwrap();
        entry.select_candidate(2).unwrap();
        assert_eq!(entry.selected_candidate().unwrap().draft_number, 2);

        assert!(matches!(
            entry.reject_candidate(1, "  "),
            Err(CongressError::MissingRejectionReason(1))
        ));
        entry.reject_candidate(1, "too long").unwrap();

        entry.finalize("b", "shorter and kinder").unwrap();
        assert!(entry.is_finalized());
        assert_eq!(entry.final_response(), Some("b"));
    }

    #[test]
    fn test_entry_frozen_after_finalize() {
        let mut entry = moderate_entry();
        entry.add_candidate(CandidateResponse::considering(1, "a").unwrap()).unwrap();
        entry.select_candidate(1).unwrap();
        entry.finalize("a", "only option").unwrap();

        assert!(matches!(
            entry.finalize("again", "again"),
            Err(CongressError::AlreadyFinalized)
        ));
        assert!(matches!(
            entry.add_step(ReasoningStep::insight("late thought")),
            Err(CongressError::AlreadyFinalized)
        ));
        assert!(entry.add_candidate(CandidateResponse::considering(2, "b").unwrap()).is_err());
    }

    #[test]
    fn test_profound_insights_recorded_once_after_finalize() {
        let mut entry = moderate_entry();
        assert!(matches!(
            entry.record_profound_insights(vec![]),
            Err(CongressError::NotFinalized)
        ));

        entry.add_candidate(CandidateResponse::considering(1, "a").unwrap()).unwrap();
        entry.select_candidate(1).unwrap();
        entry.finalize("a", "only option").unwrap();

        entry.record_profound_insights(vec![]).unwrap();
        assert!(entry.is_scored());
        assert!(matches!(
            entry.record_profound_insights(vec![]),
            Err(CongressError::AlreadyScored)
        ));
    }

    #[test]
    fn test_entry_serializes_numeric_weight() {
        let entry = moderate_entry().with_network_hash("abc123");
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json["weight"].is_number());
        assert_eq!(json["engagement_strategy"], "single_debate");
        assert_eq!(json["network_hash"], "abc123");
    }

    #[test]
    fn test_winning_perspective_tie_break() {
        let mut entry = moderate_entry();
        entry
            .add_perspective(
                CongressPerspective::new(PerspectiveRole::Synthesizer, "s", "r", 7.0, 1).unwrap(),
            )
            .unwrap();
        entry
            .add_perspective(
                CongressPerspective::new(PerspectiveRole::Skeptic, "k", "r", 7.0, 1).unwrap(),
            )
            .unwrap();
        entry
            .add_perspective(
                CongressPerspective::new(PerspectiveRole::Advocate, "a", "r", 6.0, 1).unwrap(),
            )
            .unwrap();

        assert_eq!(entry.winning_perspective().unwrap().role, PerspectiveRole::Skeptic);
    }
}
