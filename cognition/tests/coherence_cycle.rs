//! Healthy -> critical -> paused -> consolidated -> deliberating again.

use std::collections::HashMap;
use std::sync::Arc;

use cognition::{
    BeliefOperation, CognitionError, CognitiveAgentBuilder, ConsolidationChoice, HealthState,
    MemorySink,
};
use congress::ScriptedProvider;

#[tokio::test]
async fn test_coherence_cycle() {
    let sink = Arc::new(MemorySink::new());
    let agent = CognitiveAgentBuilder::new("cycle-agent")
        .with_sink(sink.clone())
        .build();
    let provider = ScriptedProvider::new("cycle").with_insight(1, "Rest restores focus");

    // Seeded network starts healthy
    let status = agent.coherence_status().await;
    assert!(matches!(status.state, HealthState::Healthy(s) if s > 70.0 && s < 75.0));

    let route = agent.submit_query(4.0).unwrap();
    let mut entry = agent
        .run_deliberation("Should I rest?", &route, &provider)
        .await
        .unwrap();
    agent.finalize_entry(&mut entry, 1, "only draft").await.unwrap();
    let calls_before = provider.call_count();

    // Swing a weight-7 core belief 7 -> 1 -> 7 -> 1 -> 7 -> 1
    let id = agent
        .network()
        .await
        .core_beliefs()
        .into_iter()
        .find(|b| b.weight() == 7)
        .unwrap()
        .id
        .clone();
    for (weight, reason) in [
        (1, "values say otherwise"),
        (7, "logic says yes"),
        (1, "values say otherwise"),
        (7, "logic says yes"),
        (1, "values say otherwise"),
    ] {
        agent
            .mutate_belief(&id, BeliefOperation::UpdateWeight(weight), reason)
            .await
            .unwrap();
    }

    let status = agent.coherence_status().await;
    assert!(matches!(status.state, HealthState::Critical(s) if s <= 50.0));
    assert!(status.requires_consolidation);
    assert_eq!(status.oscillating_belief_ids, vec![id.clone()]);

    // The gate refuses new deliberation without calling the provider
    let blocked = agent
        .run_deliberation("Should I rest again?", &route, &provider)
        .await;
    assert!(matches!(blocked, Err(CognitionError::ConsolidationPending(_))));
    assert_eq!(provider.call_count(), calls_before);

    // Every oscillating belief needs a choice
    let missing = agent.consolidate(&HashMap::new()).await;
    assert!(matches!(missing, Err(CognitionError::MissingResolution(_))));

    // Locking at the low extreme leaves the network critical
    let low = HashMap::from([(id.clone(), ConsolidationChoice::HistoricalLow)]);
    let outcome = agent.consolidate(&low).await.unwrap();
    assert!(!outcome.resumed);
    assert!(agent.coherence_status().await.requires_consolidation);

    let high = HashMap::from([(id.clone(), ConsolidationChoice::HistoricalHigh)]);
    let outcome = agent.consolidate(&high).await.unwrap();
    assert!(outcome.resumed);
    assert!(matches!(outcome.state, HealthState::Caution(_)));

    let status = agent.coherence_status().await;
    assert!(!status.requires_consolidation);

    let entry = agent
        .run_deliberation("Should I rest again?", &route, &provider)
        .await
        .unwrap();
    assert!(!entry.perspectives().is_empty());
    assert!(provider.call_count() > calls_before);

    // Every mutation and consolidation was persisted
    assert_eq!(sink.network_count().await, 7);
}
