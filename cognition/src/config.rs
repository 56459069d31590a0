//! Configuration for the cognitive agent.

use congress::CongressConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a cognitive agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitionConfig {
    /// Agent ID
    pub agent_id: String,
    /// Coherence thresholds
    #[serde(default)]
    pub coherence: CoherenceConfig,
    /// Insight scoring rubric
    #[serde(default)]
    pub scorer: ScorerConfig,
    /// Belief emergence thresholds
    #[serde(default)]
    pub emergence: EmergenceConfig,
    /// Pattern aggregation thresholds
    #[serde(default)]
    pub patterns: PatternConfig,
    /// Congress settings
    #[serde(default)]
    pub congress: CongressConfig,
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Default for CognitionConfig {
    fn default() -> Self {
        Self {
            agent_id: uuid::Uuid::new_v4().to_string(),
            coherence: CoherenceConfig::default(),
            scorer: ScorerConfig::default(),
            emergence: EmergenceConfig::default(),
            patterns: PatternConfig::default(),
            congress: CongressConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl CognitionConfig {
    /// Create a new config with agent ID.
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Default::default()
        }
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Coherence health thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceConfig {
    /// Scores strictly above this are healthy
    pub healthy_above: f64,
    /// Scores at or below this are critical
    pub critical_at_or_below: f64,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            healthy_above: 70.0,
            critical_at_or_below: 50.0,
        }
    }
}

/// Weights and thresholds for the profound-insight rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Insight triggered a belief revision this turn
    pub revision_weight: f64,
    /// Insight overlaps the reasoning of several perspectives
    pub perspective_overlap_weight: f64,
    /// Insight touches a belief in unresolved tension
    pub tension_resolution_weight: f64,
    /// Scaled by novelty (0.0 - 1.0)
    pub novelty_weight: f64,
    /// User explicitly flagged the step
    pub user_flag_weight: f64,
    /// Minimum total for a profound insight
    pub profound_threshold: f64,
    /// Distinct roles needed for the overlap criterion
    pub min_overlapping_perspectives: usize,
    /// Significant terms a role must share with the step
    pub min_shared_terms: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            revision_weight: 0.30,
            perspective_overlap_weight: 0.25,
            tension_resolution_weight: 0.20,
            novelty_weight: 0.15,
            user_flag_weight: 0.10,
            profound_threshold: 0.6,
            min_overlapping_perspectives: 2,
            min_shared_terms: 2,
        }
    }
}

/// Thresholds for proposing emergent beliefs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergenceConfig {
    /// Strength before any supporting insight
    pub base_strength: f64,
    /// Strength added per supporting insight
    pub strength_per_insight: f64,
    /// Minimum strength to propose
    pub min_strength: f64,
    /// Minimum supporting insights
    pub min_supporting_insights: usize,
    /// Minimum distinct entries the support must span
    pub min_distinct_entries: usize,
}

impl Default for EmergenceConfig {
    fn default() -> Self {
        Self {
            base_strength: 0.5,
            strength_per_insight: 0.2,
            min_strength: 0.7,
            min_supporting_insights: 3,
            min_distinct_entries: 2,
        }
    }
}

/// Thresholds for pattern aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Members a group needs to become a pattern
    pub min_group_size: usize,
    /// Confidence at or above which patterns are accepted without review
    pub auto_accept_confidence: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_group_size: 2,
            auto_accept_confidence: 0.6,
        }
    }
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Persist records through the sink
    pub audit_enabled: bool,
    /// Log level hint for the embedding host
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            audit_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CognitionConfig::default();
        assert_eq!(config.coherence.healthy_above, 70.0);
        assert_eq!(config.scorer.profound_threshold, 0.6);
        assert_eq!(config.emergence.min_supporting_insights, 3);
        assert!(!config.congress.include_ethics_in_single_debate);
        assert!(config.general.audit_enabled);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = CognitionConfig::new("test-agent");
        let yaml = config.to_yaml().unwrap();
        let parsed = CognitionConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.agent_id, "test-agent");
        assert_eq!(parsed.patterns.min_group_size, 2);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "agent_id: partial\nscorer:\n  revision_weight: 0.4\n  perspective_overlap_weight: 0.25\n  tension_resolution_weight: 0.2\n  novelty_weight: 0.15\n  user_flag_weight: 0.1\n  profound_threshold: 0.7\n  min_overlapping_perspectives: 2\n  min_shared_terms: 1\n";
        let config = CognitionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.scorer.profound_threshold, 0.7);
        assert_eq!(config.coherence.critical_at_or_below, 50.0);
    }
}
