//! Deterministic role assignment from self-assessment scores
//!
//! Turns noisy self-reported `(judge_score, solver_score)` pairs into one
//! judge and [`SOLVER_COUNT`] solvers:
//!
//! 1. Optionally keep only the top [`MIN_PARTICIPANTS`] agents by overall
//!    capability `max(judge, solver)`.
//! 2. Rank by judge preference `judge - solver`, optionally weighted as
//!    `diff * (1 + |diff|)` so strong preferences beat near-ties.
//! 3. The best-ranked agent judges; the next [`SOLVER_COUNT`] agents solve.
//! 4. Solver slots are labelled by descending solver score.
//!
//! Every ordering uses the roster position as its final key, so equal
//! scores always resolve to the agent listed first.

use super::role::{MIN_PARTICIPANTS, Role, SOLVER_COUNT, SolverSlot};
use crate::agent::AgentId;
use crate::core::error::DomainError;
use crate::orchestration::stage::Stage;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One agent's self-assessment scores, in roster order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub agent_id: AgentId,
    pub judge_score: f64,
    pub solver_score: f64,
}

impl ScoreCard {
    pub fn new(agent_id: impl Into<AgentId>, judge_score: f64, solver_score: f64) -> Self {
        Self {
            agent_id: agent_id.into(),
            judge_score,
            solver_score,
        }
    }

    /// Overall capability used by the top-K pre-filter
    pub fn capability(&self) -> f64 {
        self.judge_score.max(self.solver_score)
    }

    /// Preference for judging over solving
    pub fn judge_preference(&self, weighted: bool) -> f64 {
        let diff = self.judge_score - self.solver_score;
        if weighted { diff * (1.0 + diff.abs()) } else { diff }
    }
}

/// Tunables for [`assign_roles`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPolicy {
    /// Keep only the top candidates by capability when the roster is larger
    pub preselect_top_k: bool,
    /// Weight judge preference by its own magnitude
    pub weighted_preference: bool,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            preselect_top_k: true,
            weighted_preference: true,
        }
    }
}

/// Outcome of role assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub judge: AgentId,
    pub solvers: [AgentId; SOLVER_COUNT],
}

impl RoleAssignment {
    pub fn solver(&self, slot: SolverSlot) -> &AgentId {
        &self.solvers[slot.index()]
    }

    pub fn role_of(&self, agent_id: &AgentId) -> Option<Role> {
        if &self.judge == agent_id {
            return Some(Role::Judge);
        }
        SolverSlot::ALL
            .into_iter()
            .find(|slot| self.solver(*slot) == agent_id)
            .map(Role::Solver)
    }

    /// Solver slots paired with their agents, in label order
    pub fn solver_slots(&self) -> impl Iterator<Item = (SolverSlot, &AgentId)> {
        SolverSlot::ALL.into_iter().map(|slot| (slot, self.solver(slot)))
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Partition assessed agents into a judge and solvers
///
/// `cards` must be in roster order; that order is the tie-break.
pub fn assign_roles(
    cards: &[ScoreCard],
    policy: &AssignmentPolicy,
) -> Result<RoleAssignment, DomainError> {
    if cards.len() < MIN_PARTICIPANTS {
        return Err(DomainError::InsufficientParticipants {
            stage: Stage::RoleAssessment,
            required: MIN_PARTICIPANTS,
            available: cards.len(),
        });
    }

    let mut ranked: Vec<(usize, &ScoreCard)> = cards.iter().enumerate().collect();

    if policy.preselect_top_k && ranked.len() > MIN_PARTICIPANTS {
        ranked.sort_by(|(ia, a), (ib, b)| {
            descending(a.capability(), b.capability()).then(ia.cmp(ib))
        });
        ranked.truncate(MIN_PARTICIPANTS);
    }

    ranked.sort_by(|(ia, a), (ib, b)| {
        descending(
            a.judge_preference(policy.weighted_preference),
            b.judge_preference(policy.weighted_preference),
        )
        .then(ia.cmp(ib))
    });

    let judge = ranked[0].1.agent_id.clone();

    let mut solvers: Vec<(usize, &ScoreCard)> = ranked[1..=SOLVER_COUNT].to_vec();
    solvers.sort_by(|(ia, a), (ib, b)| {
        descending(a.solver_score, b.solver_score).then(ia.cmp(ib))
    });

    let solvers: [AgentId; SOLVER_COUNT] = [
        solvers[0].1.agent_id.clone(),
        solvers[1].1.agent_id.clone(),
        solvers[2].1.agent_id.clone(),
    ];

    Ok(RoleAssignment { judge, solvers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(assignment: &RoleAssignment) -> (String, Vec<String>) {
        (
            assignment.judge.to_string(),
            assignment.solvers.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_reference_scenario() {
        let cards = vec![
            ScoreCard::new("A", 0.9, 0.1),
            ScoreCard::new("B", 0.2, 0.8),
            ScoreCard::new("C", 0.3, 0.7),
            ScoreCard::new("D", 0.4, 0.6),
        ];
        let assignment = assign_roles(&cards, &AssignmentPolicy::default()).unwrap();
        let (judge, solvers) = ids(&assignment);
        assert_eq!(judge, "A");
        // Preference ranks D, C, B; slots follow solver score instead
        assert_eq!(solvers, vec!["B", "C", "D"]);
        assert_eq!(
            assignment.role_of(&AgentId::new("C")),
            Some(Role::Solver(SolverSlot::Two))
        );
        assert_eq!(assignment.role_of(&AgentId::new("A")), Some(Role::Judge));
        assert_eq!(assignment.role_of(&AgentId::new("Z")), None);
    }

    #[test]
    fn test_insufficient_participants() {
        let cards = vec![
            ScoreCard::new("A", 0.9, 0.1),
            ScoreCard::new("B", 0.2, 0.8),
            ScoreCard::new("C", 0.3, 0.7),
        ];
        let err = assign_roles(&cards, &AssignmentPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientParticipants {
                stage: Stage::RoleAssessment,
                required: 4,
                available: 3,
            }
        );
    }

    #[test]
    fn test_ties_resolve_by_roster_order() {
        let cards = vec![
            ScoreCard::new("first", 0.5, 0.5),
            ScoreCard::new("second", 0.5, 0.5),
            ScoreCard::new("third", 0.5, 0.5),
            ScoreCard::new("fourth", 0.5, 0.5),
        ];
        for _ in 0..10 {
            let assignment = assign_roles(&cards, &AssignmentPolicy::default()).unwrap();
            let (judge, solvers) = ids(&assignment);
            assert_eq!(judge, "first");
            assert_eq!(solvers, vec!["second", "third", "fourth"]);
        }
    }

    #[test]
    fn test_tie_break_independent_of_score_permutation() {
        // Pairs with identical scores: the earlier roster entry wins each tie
        let cards = vec![
            ScoreCard::new("x", 0.6, 0.4),
            ScoreCard::new("y", 0.6, 0.4),
            ScoreCard::new("z", 0.1, 0.9),
            ScoreCard::new("w", 0.1, 0.9),
        ];
        let (judge, solvers) = ids(&assign_roles(&cards, &AssignmentPolicy::default()).unwrap());
        assert_eq!(judge, "x");
        assert_eq!(solvers, vec!["z", "w", "y"]);
    }

    #[test]
    fn test_preselect_drops_weakest() {
        // "weak" has the highest judge preference but the lowest capability
        let cards = vec![
            ScoreCard::new("weak", 0.3, 0.0),
            ScoreCard::new("A", 0.9, 0.2),
            ScoreCard::new("B", 0.2, 0.8),
            ScoreCard::new("C", 0.3, 0.7),
            ScoreCard::new("D", 0.4, 0.6),
        ];
        let (judge, solvers) = ids(&assign_roles(&cards, &AssignmentPolicy::default()).unwrap());
        assert_eq!(judge, "A");
        assert_eq!(solvers, vec!["B", "C", "D"]);

        let no_preselect = AssignmentPolicy {
            preselect_top_k: false,
            weighted_preference: true,
        };
        let (judge, solvers) = ids(&assign_roles(&cards, &no_preselect).unwrap());
        assert_eq!(judge, "A");
        // weak: 0.3 * 1.3 = 0.39 ranks second, ahead of every solver-leaning agent
        assert!(solvers.contains(&"weak".to_string()));
    }

    #[test]
    fn test_weighting_separates_strong_preference() {
        let strong = ScoreCard::new("strong", 0.95, 0.45);
        let weak = ScoreCard::new("weak", 0.51, 0.49);
        assert!(strong.judge_preference(true) > weak.judge_preference(true));
        assert!((strong.judge_preference(false) - 0.5).abs() < 1e-9);
        assert!((strong.judge_preference(true) - 0.75).abs() < 1e-9);
        assert!((weak.judge_preference(true) - 0.0204).abs() < 1e-9);
    }

    #[test]
    fn test_negative_preference_is_amplified_downwards() {
        let card = ScoreCard::new("s", 0.1, 0.9);
        assert!((card.judge_preference(true) - (-0.8 * 1.8)).abs() < 1e-9);
    }
}
