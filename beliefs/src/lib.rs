//! Belief network for a deliberating agent.
//!
//! Beliefs are weighted stances (1 - 10) that only change through audited
//! operations. Every change appends a revision with a reason, so the full
//! history of how the agent came to hold a stance is always available.
//!
//! - [`BeliefNetwork`]: owns all beliefs, mutations and coherence metrics
//! - [`TensionAnalyzer`]: detects oscillation in a belief's revision history
//!
//! # Example
//!
//! ```
//! use beliefs::BeliefNetwork;
//!
//! let mut network = BeliefNetwork::new();
//! let id = network.core_beliefs()[0].id.clone();
//! network.weaken(&id, "a counterexample came up").unwrap();
//! assert_eq!(network.get(&id).unwrap().revision_count(), 1);
//! ```

pub mod network;
pub mod tension;
pub mod types;

// Re-export main types
pub use network::{BeliefNetwork, DomainBalance, DomainStats, CORE_BELIEF_COUNT};
pub use tension::{TensionAnalyzer, TensionReport, TensionRule};
pub use types::*;
