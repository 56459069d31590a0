//! Congress simulator - executes a routed call sequence.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entry::LogicEntry;
use crate::provider::{
    AnalysisRequest, CallSummaryRequest, DraftRequest, PerspectiveProvider, PerspectiveRequest,
};
use crate::router::Route;
use crate::types::{CongressPerspective, ReasoningStep, Result, StepType};

/// Congress configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CongressConfig {
    /// Add the ethics perspective to single-debate calls
    pub include_ethics_in_single_debate: bool,
}

/// Runs the calls a route asks for and records them in a logic entry.
pub struct CongressSimulator {
    config: CongressConfig,
}

impl CongressSimulator {
    /// Create a simulator with default configuration.
    pub fn new() -> Self {
        Self::with_config(CongressConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: CongressConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &CongressConfig {
        &self.config
    }

    /// Run a congress for a routed query.
    ///
    /// The returned entry is not finalized: the caller picks exactly one
    /// draft and calls [`LogicEntry::finalize`].
    pub async fn run(
        &self,
        query: &str,
        route: &Route,
        provider: &dyn PerspectiveProvider,
    ) -> Result<LogicEntry> {
        let mut entry = LogicEntry::new(query, route);

        debug!(
            entry_id = %entry.id(),
            provider = provider.id(),
            strategy = ?route.strategy(),
            calls = route.call_sequence().len(),
            "Starting congress"
        );

        // Analysis always comes before any perspective
        let analysis = provider
            .analyze(&AnalysisRequest {
                query: query.to_string(),
                weight: route.weight(),
                strategy: route.strategy(),
            })
            .await?;
        entry.add_step(ReasoningStep::new(StepType::Analysis, analysis)?)?;

        for &call_number in route.call_sequence() {
            self.run_call(&mut entry, query, route, call_number, provider)
                .await?;
        }

        let drafts = provider
            .draft(&DraftRequest {
                query: query.to_string(),
                strategy: route.strategy(),
                perspectives: entry.perspectives().to_vec(),
                steps: entry.reasoning_steps().to_vec(),
            })
            .await?;
        for draft in drafts {
            entry.add_candidate(draft)?;
        }

        info!(
            entry_id = %entry.id(),
            perspectives = entry.perspectives().len(),
            steps = entry.reasoning_steps().len(),
            drafts = entry.candidate_responses().len(),
            "Congress completed"
        );

        Ok(entry)
    }

    async fn run_call(
        &self,
        entry: &mut LogicEntry,
        query: &str,
        route: &Route,
        call_number: u8,
        provider: &dyn PerspectiveProvider,
    ) -> Result<()> {
        let roles = route
            .strategy()
            .roles_for_call(call_number, self.config.include_ethics_in_single_debate);

        for role in roles {
            let argument = provider
                .argue(&PerspectiveRequest {
                    query: query.to_string(),
                    role,
                    call_number,
                    strategy: route.strategy(),
                    transcript: entry.perspectives().to_vec(),
                })
                .await?;

            let perspective = CongressPerspective::new(
                role,
                argument.position,
                argument.reasoning,
                argument.strength,
                call_number,
            )?
            .with_linked_beliefs(argument.linked_belief_ids);

            debug!(
                call_number,
                role = role.as_str(),
                strength = perspective.strength_of_argument,
                "Perspective recorded"
            );
            entry.add_perspective(perspective)?;
        }

        let this_call: Vec<CongressPerspective> = entry
            .perspectives_for_call(call_number)
            .into_iter()
            .cloned()
            .collect();

        let steps = provider
            .summarize_call(&CallSummaryRequest {
                query: query.to_string(),
                call_number,
                perspectives: this_call.clone(),
            })
            .await?;

        let closes_call = steps
            .iter()
            .any(|s| matches!(s.step_type, StepType::Debate | StepType::Insight));

        for mut step in steps {
            if step.call_number.is_none() {
                step.call_number = Some(call_number);
            }
            entry.add_step(step)?;
        }

        if !closes_call {
            let summary = Self::debate_summary(call_number, &this_call);
            entry.add_step(ReasoningStep::debate(summary).with_call(call_number))?;
        }

        Ok(())
    }

    fn debate_summary(call_number: u8, perspectives: &[CongressPerspective]) -> String {
        let parts: Vec<String> = perspectives
            .iter()
            .map(|p| format!("{} ({:.1})", p.role.as_str(), p.strength_of_argument))
            .collect();
        format!("Call {} heard: {}", call_number, parts.join(", "))
    }
}

impl Default for CongressSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedProvider;
    use crate::router::DeliberationRouter;
    use crate::types::{CongressError, PerspectiveRole};

    #[tokio::test]
    async fn test_direct_run_has_no_perspectives() {
        let provider = ScriptedProvider::new("test");
        let route = DeliberationRouter::route(2.0).unwrap();

        let entry = CongressSimulator::new()
            .run("What's 2 + 2?", &route, &provider)
            .await
            .unwrap();

        assert!(entry.perspectives().is_empty());
        assert_eq!(entry.reasoning_steps()[0].step_type, StepType::Analysis);
        assert_eq!(entry.candidate_responses().len(), 1);
    }

    #[tokio::test]
    async fn test_single_debate_run() {
        let provider = ScriptedProvider::new("test").with_insight(1, "Rest is part of the work");
        let route = DeliberationRouter::route(4.0).unwrap();

        let entry = CongressSimulator::new()
            .run("Should I take a break?", &route, &provider)
            .await
            .unwrap();

        assert_eq!(
            entry.participating_roles(),
            vec![
                PerspectiveRole::Advocate,
                PerspectiveRole::Skeptic,
                PerspectiveRole::Synthesizer
            ]
        );
        assert_eq!(entry.insight_steps().len(), 1);
        assert_eq!(entry.insight_steps()[0].call_number, Some(1));
    }

    #[tokio::test]
    async fn test_single_debate_with_ethics() {
        let provider = ScriptedProvider::new("test");
        let route = DeliberationRouter::route(4.0).unwrap();
        let simulator = CongressSimulator::with_config(CongressConfig {
            include_ethics_in_single_debate: true,
        });

        let entry = simulator.run("Should I tell her?", &route, &provider).await.unwrap();
        assert_eq!(entry.perspectives().len(), 4);
    }

    #[tokio::test]
    async fn test_multi_call_run() {
        let provider = ScriptedProvider::new("test");
        let route = DeliberationRouter::route(8.0).unwrap();

        let entry = CongressSimulator::new()
            .run("Should I change careers?", &route, &provider)
            .await
            .unwrap();

        assert_eq!(entry.perspectives_for_call(1)[0].role, PerspectiveRole::Advocate);
        assert_eq!(entry.perspectives_for_call(2)[0].role, PerspectiveRole::Skeptic);
        assert_eq!(entry.perspectives_for_call(3)[0].role, PerspectiveRole::Synthesizer);
        assert_eq!(entry.perspectives_for_call(4).len(), 4);

        // One synthesized debate step closes each call
        let debates = entry
            .reasoning_steps()
            .iter()
            .filter(|s| s.step_type == StepType::Debate)
            .count();
        assert_eq!(debates, 4);
    }

    #[tokio::test]
    async fn test_invalid_strength_fails_fast() {
        let provider = ScriptedProvider::new("test").with_strength(PerspectiveRole::Skeptic, 12.0);
        let route = DeliberationRouter::route(4.0).unwrap();

        let result = CongressSimulator::new().run("Anything", &route, &provider).await;
        assert!(matches!(result, Err(CongressError::InvalidStrength(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = ScriptedProvider::new("test").with_available(false);
        let route = DeliberationRouter::route(4.0).unwrap();

        let result = CongressSimulator::new().run("Anything", &route, &provider).await;
        assert!(matches!(result, Err(CongressError::Provider(_))));
    }
}
