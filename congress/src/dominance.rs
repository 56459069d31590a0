//! Tracks which perspective tends to win deliberations.

use std::collections::HashMap;
use tracing::debug;

use crate::entry::LogicEntry;
use crate::types::PerspectiveRole;

/// Running win counts and strength history per perspective.
#[derive(Debug, Clone, Default)]
pub struct PerspectiveDominanceTracker {
    wins: HashMap<PerspectiveRole, u32>,
    strengths: HashMap<PerspectiveRole, Vec<f64>>,
    entries_recorded: u32,
}

impl PerspectiveDominanceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed entry. Entries without perspectives count as
    /// recorded but produce no winner.
    pub fn record(&mut self, entry: &LogicEntry) {
        self.entries_recorded += 1;

        for perspective in entry.perspectives() {
            self.strengths
                .entry(perspective.role)
                .or_default()
                .push(perspective.strength_of_argument);
        }

        if let Some(winner) = entry.winning_perspective() {
            *self.wins.entry(winner.role).or_insert(0) += 1;
            debug!(
                entry_id = %entry.id(),
                winner = winner.role.as_str(),
                strength = winner.strength_of_argument,
                "Recorded winning perspective"
            );
        }
    }

    /// Wins recorded for a role.
    pub fn wins(&self, role: PerspectiveRole) -> u32 {
        self.wins.get(&role).copied().unwrap_or(0)
    }

    fn total_wins(&self) -> u32 {
        self.wins.values().sum()
    }

    /// Role with the most wins. Ties go to the earliest role in canonical
    /// order. `None` until some entry has produced a winner.
    pub fn dominant_perspective(&self) -> Option<PerspectiveRole> {
        let mut best: Option<(PerspectiveRole, u32)> = None;
        for role in PerspectiveRole::canonical_order() {
            let wins = self.wins(role);
            if wins == 0 {
                continue;
            }
            match best {
                Some((_, top)) if wins <= top => {}
                _ => best = Some((role, wins)),
            }
        }
        best.map(|(role, _)| role)
    }

    /// Percentage (0 - 100) of wins held by a role.
    pub fn share(&self, role: PerspectiveRole) -> f64 {
        let total = self.total_wins();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.wins(role)) / f64::from(total) * 100.0
    }

    /// Fixed qualitative description of what a role's dominance means.
    pub fn describe(role: PerspectiveRole) -> &'static str {
        match role {
            PerspectiveRole::Advocate => "Leans toward optimistic, action-oriented answers",
            PerspectiveRole::Skeptic => "Leans toward caution and probing for weaknesses",
            PerspectiveRole::Synthesizer => "Leans toward integrating competing views",
            PerspectiveRole::Ethics => "Leans toward weighing values and consequences first",
        }
    }

    /// Every strength a role has argued with, in record order.
    pub fn strengths(&self, role: PerspectiveRole) -> &[f64] {
        self.strengths.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mean argument strength for a role.
    pub fn average_strength(&self, role: PerspectiveRole) -> Option<f64> {
        let values = self.strengths(role);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Entries recorded since creation or the last reset.
    pub fn entries_recorded(&self) -> u32 {
        self.entries_recorded
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.wins.clear();
        self.strengths.clear();
        self.entries_recorded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::DeliberationRouter;
    use crate::types::CongressPerspective;

    fn entry_with(strengths: &[(PerspectiveRole, f64)]) -> LogicEntry {
        let route = DeliberationRouter::route(4.0).unwrap();
        let mut entry = LogicEntry::new("q", &route);
        for (role, strength) in strengths {
            entry
                .add_perspective(CongressPerspective::new(*role, "p", "r", *strength, 1).unwrap())
                .unwrap();
        }
        entry
    }

    #[test]
    fn test_dominant_perspective() {
        let mut tracker = PerspectiveDominanceTracker::new();
        assert_eq!(tracker.dominant_perspective(), None);

        tracker.record(&entry_with(&[
            (PerspectiveRole::Advocate, 5.0),
            (PerspectiveRole::Skeptic, 8.0),
        ]));
        tracker.record(&entry_with(&[
            (PerspectiveRole::Skeptic, 9.0),
            (PerspectiveRole::Synthesizer, 6.0),
        ]));
        tracker.record(&entry_with(&[(PerspectiveRole::Synthesizer, 7.0)]));

        assert_eq!(tracker.dominant_perspective(), Some(PerspectiveRole::Skeptic));
        assert_eq!(tracker.entries_recorded(), 3);
        assert!((tracker.share(PerspectiveRole::Skeptic) - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(tracker.strengths(PerspectiveRole::Skeptic), &[8.0, 9.0]);
        assert_eq!(tracker.average_strength(PerspectiveRole::Synthesizer), Some(6.5));
    }

    #[test]
    fn test_tie_goes_to_canonical_order() {
        let mut tracker = PerspectiveDominanceTracker::new();
        tracker.record(&entry_with(&[(PerspectiveRole::Synthesizer, 7.0)]));
        tracker.record(&entry_with(&[(PerspectiveRole::Advocate, 7.0)]));

        assert_eq!(tracker.dominant_perspective(), Some(PerspectiveRole::Advocate));
    }

    #[test]
    fn test_direct_entries_have_no_winner() {
        let mut tracker = PerspectiveDominanceTracker::new();
        let route = DeliberationRouter::route(1.0).unwrap();
        tracker.record(&LogicEntry::new("hi", &route));

        assert_eq!(tracker.entries_recorded(), 1);
        assert_eq!(tracker.dominant_perspective(), None);
        assert_eq!(tracker.share(PerspectiveRole::Advocate), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut tracker = PerspectiveDominanceTracker::new();
        tracker.record(&entry_with(&[(PerspectiveRole::Ethics, 9.0)]));
        tracker.reset();

        assert_eq!(tracker.entries_recorded(), 0);
        assert_eq!(tracker.wins(PerspectiveRole::Ethics), 0);
        assert!(tracker.strengths(PerspectiveRole::Ethics).is_empty());
        assert!(!PerspectiveDominanceTracker::describe(PerspectiveRole::Ethics).is_empty());
    }
}
