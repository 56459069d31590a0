//! Scripted provider for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::traits::*;
use crate::types::{CandidateResponse, PerspectiveRole, ReasoningStep};

/// Provider that answers from canned text.
///
/// Strengths, reasoning, per-call insights and drafts are all configurable.
pub struct ScriptedProvider {
    provider_id: String,
    available: AtomicBool,
    strengths: HashMap<PerspectiveRole, f64>,
    reasoning: HashMap<PerspectiveRole, String>,
    linked_beliefs: HashMap<PerspectiveRole, Vec<String>>,
    call_steps: HashMap<u8, Vec<ReasoningStep>>,
    drafts: Vec<String>,
    call_count: AtomicU32,
}

impl ScriptedProvider {
    /// Create a new scripted provider.
    pub fn new(provider_id: impl Into<String>) -> Self {
        let strengths = HashMap::from([
            (PerspectiveRole::Advocate, 6.0),
            (PerspectiveRole::Skeptic, 5.0),
            (PerspectiveRole::Synthesizer, 7.0),
            (PerspectiveRole::Ethics, 4.0),
        ]);

        Self {
            provider_id: provider_id.into(),
            available: AtomicBool::new(true),
            strengths,
            reasoning: HashMap::new(),
            linked_beliefs: HashMap::new(),
            call_steps: HashMap::new(),
            drafts: vec!["Scripted answer".to_string()],
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the strength a role argues with.
    pub fn with_strength(mut self, role: PerspectiveRole, strength: f64) -> Self {
        self.strengths.insert(role, strength);
        self
    }

    /// Set the reasoning text a role produces.
    pub fn with_reasoning(mut self, role: PerspectiveRole, reasoning: impl Into<String>) -> Self {
        self.reasoning.insert(role, reasoning.into());
        self
    }

    /// Link beliefs to every argument a role produces.
    pub fn with_linked_beliefs(mut self, role: PerspectiveRole, ids: Vec<String>) -> Self {
        self.linked_beliefs.insert(role, ids);
        self
    }

    /// Add a step emitted when the given call closes.
    pub fn with_call_step(mut self, call_number: u8, step: ReasoningStep) -> Self {
        self.call_steps.entry(call_number).or_default().push(step);
        self
    }

    /// Add an insight emitted when the given call closes.
    pub fn with_insight(self, call_number: u8, content: impl Into<String>) -> Self {
        self.with_call_step(call_number, ReasoningStep::insight(content))
    }

    /// Replace the drafts. Every draft starts out as considering.
    pub fn with_drafts(mut self, drafts: Vec<String>) -> Self {
        self.drafts = drafts;
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Number of provider calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "Scripted provider disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new("scripted")
    }
}

#[async_trait]
impl PerspectiveProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.provider_id
    }

    async fn argue(&self, request: &PerspectiveRequest) -> Result<PerspectiveArgument, ProviderError> {
        self.begin_call()?;

        let reasoning = self.reasoning.get(&request.role).cloned().unwrap_or_else(|| {
            format!(
                "The {} view of \"{}\" after {} prior arguments",
                request.role.as_str(),
                request.query,
                request.transcript.len()
            )
        });

        Ok(PerspectiveArgument {
            position: format!("{} position (call {})", request.role.as_str(), request.call_number),
            reasoning,
            strength: self.strengths.get(&request.role).copied().unwrap_or(5.0),
            linked_belief_ids: self
                .linked_beliefs
                .get(&request.role)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn summarize_call(
        &self,
        request: &CallSummaryRequest,
    ) -> Result<Vec<ReasoningStep>, ProviderError> {
        self.begin_call()?;
        Ok(self
            .call_steps
            .get(&request.call_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn draft(&self, _request: &DraftRequest) -> Result<Vec<CandidateResponse>, ProviderError> {
        self.begin_call()?;
        self.drafts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                CandidateResponse::considering(i as u32 + 1, text.clone())
                    .map_err(|e| ProviderError::InvalidOutput(e.to_string()))
            })
            .collect()
    }
}
