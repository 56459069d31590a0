//! Core trait for perspective providers.
//!
//! This module defines the `PerspectiveProvider` trait - the seam between the
//! congress and whatever actually produces argument text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::router::EngagementStrategy;
use crate::types::{CandidateResponse, CongressPerspective, PerspectiveRole, ReasoningStep};

/// Error types for provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider is not available
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Provider returned something unusable
    #[error("Invalid provider output: {0}")]
    InvalidOutput(String),
}

/// Request for the opening analysis of a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The user's query
    pub query: String,
    /// Complexity weight
    pub weight: f64,
    /// Strategy chosen by the router
    pub strategy: EngagementStrategy,
}

/// Request for one perspective's argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveRequest {
    /// The user's query
    pub query: String,
    /// Role to argue as
    pub role: PerspectiveRole,
    /// Current call number
    pub call_number: u8,
    /// Strategy being executed
    pub strategy: EngagementStrategy,
    /// Every perspective produced so far, in order
    pub transcript: Vec<CongressPerspective>,
}

/// A provider's argument for one perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveArgument {
    /// Position taken
    pub position: String,
    /// Reasoning behind it
    pub reasoning: String,
    /// Strength (0.0 - 10.0); validated by the congress
    pub strength: f64,
    /// Beliefs the argument leans on
    pub linked_belief_ids: Vec<String>,
}

/// Request for the steps that close a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummaryRequest {
    /// The user's query
    pub query: String,
    /// Call being closed
    pub call_number: u8,
    /// Perspectives produced in this call
    pub perspectives: Vec<CongressPerspective>,
}

/// Request for candidate drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    /// The user's query
    pub query: String,
    /// Strategy that was executed
    pub strategy: EngagementStrategy,
    /// All perspectives produced
    pub perspectives: Vec<CongressPerspective>,
    /// All reasoning steps so far
    pub steps: Vec<ReasoningStep>,
}

/// Produces the content of a congress.
///
/// Calls are awaited one at a time, in call order; the congress never issues
/// two requests concurrently. Timeouts, if any, belong to the implementation.
#[async_trait]
pub trait PerspectiveProvider: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &str;

    /// Opening analysis of the query.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, ProviderError> {
        Ok(format!(
            "Assessed \"{}\" at complexity {:.1}",
            request.query, request.weight
        ))
    }

    /// Argue as one perspective.
    async fn argue(&self, request: &PerspectiveRequest) -> Result<PerspectiveArgument, ProviderError>;

    /// Debate, insight or concern steps closing a call. Returning nothing is
    /// allowed; the congress then records a debate summary itself.
    async fn summarize_call(
        &self,
        _request: &CallSummaryRequest,
    ) -> Result<Vec<ReasoningStep>, ProviderError> {
        Ok(Vec::new())
    }

    /// Candidate drafts for the final answer.
    async fn draft(&self, request: &DraftRequest) -> Result<Vec<CandidateResponse>, ProviderError>;
}
