//! Record sink - where mutated records go after each operation.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use beliefs::BeliefNetwork;
use congress::LogicEntry;

use crate::types::{CognitionError, Insight, Result};

/// Maximum records of each kind a memory sink keeps.
const MAX_SINK_RECORDS: usize = 1_000;

/// Persists records produced by the agent.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist the belief network after a mutation.
    async fn persist_network(&self, network: &BeliefNetwork) -> Result<()>;

    /// Persist a finalized (or scored) logic entry.
    async fn persist_entry(&self, entry: &LogicEntry) -> Result<()>;

    /// Persist newly recorded insights.
    async fn persist_insights(&self, insights: &[Insight]) -> Result<()>;
}

/// In-memory sink keeping the most recent records, newest first.
pub struct MemorySink {
    networks: Arc<RwLock<VecDeque<String>>>,
    entries: Arc<RwLock<VecDeque<LogicEntry>>>,
    insights: Arc<RwLock<VecDeque<Insight>>>,
    max_records: usize,
}

impl MemorySink {
    /// Create a new memory sink.
    pub fn new() -> Self {
        Self::with_max_records(MAX_SINK_RECORDS)
    }

    /// Create with a custom retention limit.
    pub fn with_max_records(max_records: usize) -> Self {
        Self {
            networks: Arc::new(RwLock::new(VecDeque::new())),
            entries: Arc::new(RwLock::new(VecDeque::new())),
            insights: Arc::new(RwLock::new(VecDeque::new())),
            max_records,
        }
    }

    fn push<T>(list: &mut VecDeque<T>, item: T, max: usize) {
        list.push_front(item);
        while list.len() > max {
            list.pop_back();
        }
    }

    /// Most recent network snapshot, as JSON.
    pub async fn latest_network(&self) -> Option<String> {
        self.networks.read().await.front().cloned()
    }

    /// Number of network snapshots kept.
    pub async fn network_count(&self) -> usize {
        self.networks.read().await.len()
    }

    /// Persisted entries, newest first.
    pub async fn entries(&self) -> Vec<LogicEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Persisted insights, newest first.
    pub async fn insights(&self) -> Vec<Insight> {
        self.insights.read().await.iter().cloned().collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn persist_network(&self, network: &BeliefNetwork) -> Result<()> {
        let json = network
            .to_json()
            .map_err(|e| CognitionError::Sink(e.to_string()))?;
        let mut networks = self.networks.write().await;
        Self::push(&mut networks, json, self.max_records);
        Ok(())
    }

    async fn persist_entry(&self, entry: &LogicEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        // A scored entry replaces its earlier finalized copy
        entries.retain(|e| e.id() != entry.id());
        Self::push(&mut entries, entry.clone(), self.max_records);
        Ok(())
    }

    async fn persist_insights(&self, insights: &[Insight]) -> Result<()> {
        let mut stored = self.insights.write().await;
        for insight in insights {
            Self::push(&mut stored, insight.clone(), self.max_records);
        }
        Ok(())
    }
}
