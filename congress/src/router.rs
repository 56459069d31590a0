//! Deliberation router - maps a complexity weight to an engagement strategy.

use serde::{Deserialize, Serialize};

use crate::types::{CongressError, PerspectiveRole, Result};

/// Lowest accepted complexity weight.
pub const MIN_COMPLEXITY: f64 = 1.0;
/// Highest accepted complexity weight.
pub const MAX_COMPLEXITY: f64 = 9.0;

const MODERATE_FROM: f64 = 3.0;
const COMPLEX_FROM: f64 = 6.0;

/// How complex a query is judged to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityCategory {
    /// Answer directly
    Simple,
    /// One debate round
    Moderate,
    /// Full multi-call congress
    Complex,
}

/// How the congress engages with a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStrategy {
    /// No perspectives at all
    Direct,
    /// One call with advocate, skeptic and synthesizer together
    SingleDebate,
    /// Four sequential calls
    MultiCall,
}

impl EngagementStrategy {
    /// Roles requested in the given call.
    ///
    /// MultiCall runs advocate, skeptic and synthesizer in turn, then
    /// re-runs every perspective in call 4 to test robustness.
    pub fn roles_for_call(&self, call_number: u8, include_ethics: bool) -> Vec<PerspectiveRole> {
        match (self, call_number) {
            (Self::Direct, _) => vec![],
            (Self::SingleDebate, 1) => {
                let mut roles = vec![
                    PerspectiveRole::Advocate,
                    PerspectiveRole::Skeptic,
                    PerspectiveRole::Synthesizer,
                ];
                if include_ethics {
                    roles.push(PerspectiveRole::Ethics);
                }
                roles
            }
            (Self::MultiCall, 1) => vec![PerspectiveRole::Advocate],
            (Self::MultiCall, 2) => vec![PerspectiveRole::Skeptic],
            (Self::MultiCall, 3) => vec![PerspectiveRole::Synthesizer],
            (Self::MultiCall, 4) => PerspectiveRole::canonical_order().to_vec(),
            _ => vec![],
        }
    }
}

/// Routing decision for a query.
///
/// Only [`DeliberationRouter::route`] builds one. Deserializing re-derives
/// the route from its weight and rejects any field that disagrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RouteRecord")]
pub struct Route {
    weight: f64,
    category: ComplexityCategory,
    strategy: EngagementStrategy,
    call_sequence: Vec<u8>,
}

impl Route {
    /// Complexity weight the route was computed from.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Derived complexity category.
    pub fn category(&self) -> ComplexityCategory {
        self.category
    }

    /// Derived engagement strategy.
    pub fn strategy(&self) -> EngagementStrategy {
        self.strategy
    }

    /// Ordered call numbers to execute (empty for direct).
    pub fn call_sequence(&self) -> &[u8] {
        &self.call_sequence
    }
}

#[derive(Deserialize)]
struct RouteRecord {
    weight: f64,
    category: ComplexityCategory,
    strategy: EngagementStrategy,
    call_sequence: Vec<u8>,
}

impl TryFrom<RouteRecord> for Route {
    type Error = CongressError;

    fn try_from(record: RouteRecord) -> Result<Self> {
        let route = DeliberationRouter::route(record.weight)?;
        if route.category != record.category
            || route.strategy != record.strategy
            || route.call_sequence != record.call_sequence
        {
            return Err(CongressError::RouteMismatch(record.weight));
        }
        Ok(route)
    }
}

/// Pure mapping from complexity weight to route.
pub struct DeliberationRouter;

impl DeliberationRouter {
    /// Route a complexity weight. Weights outside [1, 9] are a caller bug
    /// and are rejected rather than clamped.
    pub fn route(weight: f64) -> Result<Route> {
        if !(MIN_COMPLEXITY..=MAX_COMPLEXITY).contains(&weight) {
            return Err(CongressError::ComplexityOutOfRange(weight));
        }

        let (category, strategy, call_sequence) = if weight < MODERATE_FROM {
            (ComplexityCategory::Simple, EngagementStrategy::Direct, vec![])
        } else if weight < COMPLEX_FROM {
            (ComplexityCategory::Moderate, EngagementStrategy::SingleDebate, vec![1])
        } else {
            (ComplexityCategory::Complex, EngagementStrategy::MultiCall, vec![1, 2, 3, 4])
        };

        Ok(Route {
            weight,
            category,
            strategy,
            call_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_range_is_direct() {
        for w in [1.0, 1.5, 2.0, 2.99] {
            let route = DeliberationRouter::route(w).unwrap();
            assert_eq!(route.category(), ComplexityCategory::Simple);
            assert_eq!(route.strategy(), EngagementStrategy::Direct);
            assert!(route.call_sequence().is_empty());
        }
    }

    #[test]
    fn test_moderate_range_is_single_debate() {
        for w in [3.0, 4.5, 5.99] {
            let route = DeliberationRouter::route(w).unwrap();
            assert_eq!(route.category(), ComplexityCategory::Moderate);
            assert_eq!(route.strategy(), EngagementStrategy::SingleDebate);
            assert_eq!(route.call_sequence(), &[1]);
        }
    }

    #[test]
    fn test_complex_range_is_multi_call() {
        for w in [6.0, 7.5, 9.0] {
            let route = DeliberationRouter::route(w).unwrap();
            assert_eq!(route.category(), ComplexityCategory::Complex);
            assert_eq!(route.strategy(), EngagementStrategy::MultiCall);
            assert_eq!(route.call_sequence(), &[1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            DeliberationRouter::route(0.5),
            Err(CongressError::ComplexityOutOfRange(_))
        ));
        assert!(DeliberationRouter::route(9.5).is_err());
        assert!(DeliberationRouter::route(f64::NAN).is_err());
    }

    #[test]
    fn test_roles_for_call() {
        let single = EngagementStrategy::SingleDebate;
        assert_eq!(single.roles_for_call(1, false).len(), 3);
        assert_eq!(single.roles_for_call(1, true).len(), 4);

        let multi = EngagementStrategy::MultiCall;
        assert_eq!(multi.roles_for_call(2, false), vec![PerspectiveRole::Skeptic]);
        assert_eq!(multi.roles_for_call(4, false).len(), 4);
        assert!(EngagementStrategy::Direct.roles_for_call(1, true).is_empty());
    }

    #[test]
    fn test_hand_built_route_rejected() {
        let out_of_range = r#"{"weight":42.0,"category":"simple","strategy":"multi_call","call_sequence":[]}"#;
        assert!(serde_json::from_str::<Route>(out_of_range).is_err());

        let mismatched = r#"{"weight":4.0,"category":"simple","strategy":"multi_call","call_sequence":[]}"#;
        assert!(serde_json::from_str::<Route>(mismatched).is_err());

        let route = DeliberationRouter::route(7.0).unwrap();
        let json = serde_json::to_string(&route).unwrap();
        assert_eq!(serde_json::from_str::<Route>(&json).unwrap(), route);
    }
}
