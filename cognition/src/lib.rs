//! Cognition - keeps a deliberating agent's beliefs coherent and learns
//! from what its congress produces.
//!
//! - **Coherence monitoring**: healthy, caution and critical states, with
//!   deliberation paused at critical until beliefs are consolidated
//! - **Insight scoring**: a weighted rubric marks profound insights
//! - **Belief emergence**: recurring concepts become belief proposals
//! - **Pattern aggregation**: recurring user insights become patterns
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CognitiveAgent                        │
//! │                                                              │
//! │  gate ──► Router ──► Congress ──► finalize ──► InsightScorer │
//! │   ▲                                   │                      │
//! │   │                          insight history                 │
//! │   │                          │              │                │
//! │  CoherenceMonitor   BeliefEmergenceMonitor  PatternAggregator│
//! │   ▲                          │                               │
//! │   └──────── BeliefNetwork ◄──┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod coherence;
pub mod config;
pub mod emergence;
pub mod patterns;
pub mod scorer;
pub mod sink;
pub mod text;
pub mod types;

// Re-export main types
pub use agent::{BeliefOperation, CognitiveAgent, CognitiveAgentBuilder};
pub use coherence::{
    CoherenceMonitor, CoherenceStatus, ConsolidationChoice, ConsolidationOutcome, HealthState,
};
pub use config::CognitionConfig;
pub use emergence::{BeliefEmergenceMonitor, CapitalizedPhraseExtractor, ConceptExtractor, EmergentBeliefCandidate};
pub use patterns::{PatternAggregator, PatternReport};
pub use scorer::{InsightScore, InsightScorer, NoveltyMeasure, UnseenTermsNovelty};
pub use sink::{MemorySink, RecordSink};
pub use types::*;
