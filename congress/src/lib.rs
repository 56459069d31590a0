//! Congress - multi-perspective deliberation
//!
//! A query's complexity weight decides how much deliberation it gets:
//!
//! - **Direct** (weight < 3): answer without any perspectives
//! - **Single debate** (3 - 6): advocate, skeptic and synthesizer in one call
//! - **Multi call** (6 - 9): four sequential calls, the last re-running
//!   every perspective including ethics
//!
//! # Architecture
//!
//! ```text
//! weight ──► DeliberationRouter ──► Route
//!                                     │
//!                                     ▼
//!            PerspectiveProvider ◄── CongressSimulator ──► LogicEntry
//!                                                              │
//!                                          PerspectiveDominanceTracker
//! ```
//!
//! The provider is the only source of argument text. Everything else here
//! is validation and bookkeeping.

pub mod dominance;
pub mod entry;
pub mod provider;
pub mod router;
pub mod simulator;
pub mod types;

// Re-export main types
pub use dominance::PerspectiveDominanceTracker;
pub use entry::{LogicEntry, ProfoundInsight};
pub use provider::{PerspectiveProvider, ProviderError, ScriptedProvider};
pub use router::{ComplexityCategory, DeliberationRouter, EngagementStrategy, Route};
pub use simulator::{CongressConfig, CongressSimulator};
pub use types::*;
