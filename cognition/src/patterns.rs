//! Pattern aggregation over human-facing insights.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::PatternConfig;
use crate::text::normalize;
use crate::types::{CognitionError, Insight, LearnedPattern, Result};

/// Patterns split by confidence tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Confident enough to accept without review
    pub accepted: Vec<LearnedPattern>,
    /// Waiting for an explicit confirm or reject
    pub pending: Vec<LearnedPattern>,
}

/// Groups recurring insights into patterns and keeps the review queue.
pub struct PatternAggregator {
    config: PatternConfig,
    accepted: Vec<LearnedPattern>,
    pending: Vec<LearnedPattern>,
}

impl PatternAggregator {
    /// Create an aggregator with default thresholds.
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default())
    }

    /// Create with custom thresholds.
    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            accepted: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Group human-facing insights by normalized text. Every group with
    /// enough members lands in exactly one bucket.
    pub fn aggregate(&self, history: &[Insight], total_interactions: usize) -> PatternReport {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&Insight>> = HashMap::new();

        for insight in history.iter().filter(|i| i.category.is_human_facing()) {
            let key = normalize(&insight.content);
            if key.is_empty() {
                continue;
            }
            let group = groups.entry(key.clone()).or_default();
            if group.is_empty() {
                order.push(key);
            }
            group.push(insight);
        }

        let mut report = PatternReport::default();
        for key in order {
            let members = match groups.remove(&key) {
                Some(members) if members.len() >= self.config.min_group_size => members,
                _ => continue,
            };

            let total = total_interactions.max(members.len());
            let confidence = members.len() as f64 / total as f64;

            let mut related: Vec<String> = Vec::new();
            for id in members.iter().filter_map(|m| m.related_belief_id.as_ref()) {
                if !related.contains(id) {
                    related.push(id.clone());
                }
            }

            let pattern = LearnedPattern::new(
                key,
                format!("Seen in {} of {} interactions", members.len(), total),
                members.iter().map(|m| m.content.clone()).collect(),
                confidence,
                related,
            );

            if confidence >= self.config.auto_accept_confidence {
                report.accepted.push(pattern);
            } else {
                report.pending.push(pattern);
            }
        }

        debug!(
            accepted = report.accepted.len(),
            pending = report.pending.len(),
            "Patterns aggregated"
        );
        report
    }

    /// Add a report to the queue. A pattern already known by label is
    /// replaced with the newer one.
    pub fn submit(&mut self, report: PatternReport) {
        for pattern in report.accepted {
            info!(pattern = %pattern.pattern, frequency = pattern.frequency, "Pattern accepted");
            self.pending.retain(|p| p.pattern != pattern.pattern);
            Self::upsert(&mut self.accepted, pattern);
        }
        for pattern in report.pending {
            if self.accepted.iter().any(|p| p.pattern == pattern.pattern) {
                continue;
            }
            Self::upsert(&mut self.pending, pattern);
        }
    }

    fn upsert(list: &mut Vec<LearnedPattern>, pattern: LearnedPattern) {
        match list.iter_mut().find(|p| p.pattern == pattern.pattern) {
            Some(existing) => *existing = pattern,
            None => list.push(pattern),
        }
    }

    fn take_pending(&mut self, id: &str) -> Result<LearnedPattern> {
        let index = self
            .pending
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CognitionError::PatternNotFound(id.to_string()))?;
        Ok(self.pending.remove(index))
    }

    /// Move a pending pattern to accepted.
    pub fn confirm(&mut self, id: &str) -> Result<LearnedPattern> {
        let pattern = self.take_pending(id)?;
        info!(pattern = %pattern.pattern, "Pending pattern confirmed");
        self.accepted.push(pattern.clone());
        Ok(pattern)
    }

    /// Drop a pending pattern.
    pub fn reject(&mut self, id: &str) -> Result<LearnedPattern> {
        let pattern = self.take_pending(id)?;
        info!(pattern = %pattern.pattern, "Pending pattern rejected");
        Ok(pattern)
    }

    /// Patterns waiting for review.
    pub fn pending(&self) -> &[LearnedPattern] {
        &self.pending
    }

    /// Accepted patterns.
    pub fn accepted(&self) -> &[LearnedPattern] {
        &self.accepted
    }
}

impl Default for PatternAggregator {
    fn default() -> Self {
        Self::new()
    }
}
