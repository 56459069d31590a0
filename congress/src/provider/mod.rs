//! Perspective providers.
//!
//! The congress only enforces structure; argument text, strengths and drafts
//! come from a provider the host supplies:
//! - A scripted provider for tests and offline runs
//! - Anything else (rules engine, LLM client) implemented by the host

pub mod scripted;
pub mod traits;

pub use scripted::ScriptedProvider;
pub use traits::{
    AnalysisRequest, CallSummaryRequest, DraftRequest, PerspectiveArgument, PerspectiveProvider,
    PerspectiveRequest, ProviderError,
};
