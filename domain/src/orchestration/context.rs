//! Per-solver debate context
//!
//! Each solver owns its solution, the reviews it received and its refined
//! solution. Reviews reach a context only through [`SolverContext::receive_review`],
//! which refuses anything addressed to a different solver.

use crate::agent::AgentId;
use crate::core::error::DomainError;
use crate::core::problem::{Problem, ProblemBrief};
use crate::debate::output::{RefinementOutput, ReviewOutput, SolutionOutput};
use crate::debate::record::{RefinedSolution, Review, Solution};
use crate::roles::{RoleAssignment, SOLVER_COUNT, SolverSlot};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct SolverContext {
    slot: SolverSlot,
    agent_id: AgentId,
    solution: Option<Solution>,
    reviews: Vec<Review>,
    refined: Option<RefinedSolution>,
    refinement_skipped: bool,
}

impl SolverContext {
    pub fn new(slot: SolverSlot, agent_id: AgentId) -> Self {
        Self {
            slot,
            agent_id,
            solution: None,
            reviews: Vec::new(),
            refined: None,
            refinement_skipped: false,
        }
    }

    pub fn slot(&self) -> SolverSlot {
        self.slot
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn refined(&self) -> Option<&RefinedSolution> {
        self.refined.as_ref()
    }

    pub fn refinement_skipped(&self) -> bool {
        self.refinement_skipped
    }

    pub fn review_ids(&self) -> Vec<String> {
        self.reviews.iter().map(|r| r.id().to_string()).collect()
    }

    pub fn set_solution(&mut self, solution: Solution) -> Result<(), DomainError> {
        if solution.solver_id != self.agent_id {
            return Err(DomainError::RoleIntegrity(format!(
                "solution by '{}' given to {} ('{}')",
                solution.solver_id, self.slot, self.agent_id
            )));
        }
        self.solution = Some(solution);
        Ok(())
    }

    /// Accept a review addressed to this solver's current solution
    pub fn receive_review(&mut self, review: Review) -> Result<(), DomainError> {
        if review.reviewee_id != self.agent_id {
            return Err(DomainError::RoleIntegrity(format!(
                "review intended for '{}' received by '{}'",
                review.reviewee_id, self.agent_id
            )));
        }
        if review.reviewer_id == self.agent_id {
            return Err(DomainError::SelfReview(review.reviewer_id));
        }
        match &self.solution {
            Some(solution) if solution.id() == review.solution_id => {}
            _ => {
                return Err(DomainError::RoleIntegrity(format!(
                    "review {} references solution {} which '{}' does not hold",
                    review.id(),
                    review.solution_id,
                    self.agent_id
                )));
            }
        }
        self.reviews.push(review);
        Ok(())
    }

    pub fn set_refined(&mut self, refined: RefinedSolution) -> Result<(), DomainError> {
        if refined.solver_id != self.agent_id {
            return Err(DomainError::RoleIntegrity(format!(
                "refined solution by '{}' given to '{}'",
                refined.solver_id, self.agent_id
            )));
        }
        if self.solution.as_ref().map(Solution::id) != Some(refined.parent_solution_id.as_str()) {
            return Err(DomainError::RoleIntegrity(format!(
                "refined solution of '{}' does not descend from its solution",
                self.agent_id
            )));
        }
        self.refined = Some(refined);
        Ok(())
    }

    /// Mark that this solver received no reviews and will not refine
    pub fn skip_refinement(&mut self) {
        self.refinement_skipped = true;
    }

    /// Ready to refine: has a solution and at least one review
    pub fn can_refine(&self) -> bool {
        self.solution.is_some() && !self.reviews.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.solution.is_some() && self.refined.is_some()
    }
}

/// The solvers of one session, indexed by slot
#[derive(Debug, Clone)]
pub struct SolverPanel {
    contexts: [SolverContext; SOLVER_COUNT],
}

impl SolverPanel {
    pub fn from_assignment(assignment: &RoleAssignment) -> Self {
        Self {
            contexts: SolverSlot::ALL
                .map(|slot| SolverContext::new(slot, assignment.solver(slot).clone())),
        }
    }

    pub fn get(&self, slot: SolverSlot) -> &SolverContext {
        &self.contexts[slot.index()]
    }

    pub fn get_mut(&mut self, slot: SolverSlot) -> &mut SolverContext {
        &mut self.contexts[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SolverContext> {
        self.contexts.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SolverContext> {
        self.contexts.iter_mut()
    }

    pub fn solved_count(&self) -> usize {
        self.contexts.iter().filter(|c| c.solution.is_some()).count()
    }

    /// Every ordered (reviewer, reviewee) pair among solvers holding a
    /// solution, excluding self-pairs
    pub fn review_pairs(&self) -> Vec<(SolverSlot, SolverSlot)> {
        let solved: Vec<SolverSlot> = self
            .contexts
            .iter()
            .filter(|c| c.solution.is_some())
            .map(|c| c.slot)
            .collect();
        solved
            .iter()
            .flat_map(|&reviewer| {
                solved
                    .iter()
                    .filter(move |&&reviewee| reviewee != reviewer)
                    .map(move |&reviewee| (reviewer, reviewee))
            })
            .collect()
    }

    /// Hand a completed review to its reviewee
    pub fn deliver_review(&mut self, reviewee: SolverSlot, review: Review) -> Result<(), DomainError> {
        self.get_mut(reviewee).receive_review(review)
    }

    /// Build the judge's input; every solver must hold both solutions
    pub fn judgment_input<'a>(&'a self, problem: &'a Problem) -> Result<JudgmentInput<'a>, DomainError> {
        let mut solver_contexts = Vec::with_capacity(SOLVER_COUNT);
        for ctx in &self.contexts {
            let solution = ctx.solution.as_ref().ok_or(DomainError::IncompleteSolver {
                slot: ctx.slot,
                missing: "original solution",
            })?;
            let refined = ctx.refined.as_ref().ok_or(DomainError::IncompleteSolver {
                slot: ctx.slot,
                missing: "refined solution",
            })?;
            solver_contexts.push(SolverBrief {
                solver: ctx.slot,
                solution: &solution.output,
                received_reviews: ctx.reviews.iter().map(|r| &r.output).collect(),
                refined_solution: &refined.output,
            });
        }
        Ok(JudgmentInput {
            problem: problem.brief(),
            solver_contexts,
        })
    }
}

/// What a reviewer sees: the problem and one peer's solution
#[derive(Debug, Clone, Serialize)]
pub struct PeerReviewInput<'a> {
    pub problem: ProblemBrief<'a>,
    pub solution: &'a SolutionOutput,
}

/// What a solver sees when refining
#[derive(Debug, Clone, Serialize)]
pub struct RefinementInput<'a> {
    pub problem: ProblemBrief<'a>,
    pub solution: &'a SolutionOutput,
    pub reviews: Vec<&'a ReviewOutput>,
}

impl<'a> RefinementInput<'a> {
    /// `None` when the solver has no solution or no reviews
    pub fn for_context(problem: &'a Problem, ctx: &'a SolverContext) -> Option<Self> {
        if !ctx.can_refine() {
            return None;
        }
        let solution = ctx.solution.as_ref()?;
        Some(Self {
            problem: problem.brief(),
            solution: &solution.output,
            reviews: ctx.reviews.iter().map(|r| &r.output).collect(),
        })
    }
}

/// One solver as presented to the judge, labelled by slot only
#[derive(Debug, Clone, Serialize)]
pub struct SolverBrief<'a> {
    pub solver: SolverSlot,
    pub solution: &'a SolutionOutput,
    pub received_reviews: Vec<&'a ReviewOutput>,
    pub refined_solution: &'a RefinementOutput,
}

#[derive(Debug, Clone, Serialize)]
pub struct JudgmentInput<'a> {
    pub problem: ProblemBrief<'a>,
    pub solver_contexts: Vec<SolverBrief<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::output::{PeerEvaluation, Verdict};
    use crate::debate::record::RecordMeta;

    fn assignment() -> RoleAssignment {
        RoleAssignment {
            judge: AgentId::new("A"),
            solvers: [AgentId::new("B"), AgentId::new("C"), AgentId::new("D")],
        }
    }

    fn problem() -> Problem {
        Problem::new("p1", "Logic", "Who lies?", "Green", "hard")
    }

    fn solution_for(agent: &str) -> Solution {
        Solution {
            meta: RecordMeta::new(format!("sol-{}", agent), "run", "p1"),
            solver_id: AgentId::new(agent),
            output: SolutionOutput {
                answer: "Green".into(),
                reasoning: vec!["case analysis".into()],
                confidence: None,
            },
        }
    }

    fn review(reviewer: &str, reviewed: &Solution) -> Review {
        Review::new(
            RecordMeta::new(format!("rev-{}-{}", reviewer, reviewed.solver_id), "run", "p1"),
            AgentId::new(reviewer),
            reviewed,
            ReviewOutput {
                evaluation: PeerEvaluation::default(),
                overall_assessment: Verdict::MostlyCorrect,
                confidence: 0.6,
            },
        )
        .unwrap()
    }

    fn refined_for(ctx: &SolverContext) -> RefinedSolution {
        RefinedSolution {
            meta: RecordMeta::new(format!("ref-{}", ctx.agent_id()), "run", "p1"),
            solver_id: ctx.agent_id().clone(),
            parent_solution_id: ctx.solution().unwrap().id().to_string(),
            review_ids: ctx.review_ids(),
            output: RefinementOutput {
                changes_made: vec![],
                refined_reasoning: vec!["kept".into()],
                refined_answer: "Green".into(),
                answer_changed: false,
                confidence: 0.8,
            },
        }
    }

    fn solved_panel() -> SolverPanel {
        let mut panel = SolverPanel::from_assignment(&assignment());
        for agent in ["B", "C", "D"] {
            let slot = assignment().role_of(&AgentId::new(agent)).unwrap().solver_slot().unwrap();
            panel.get_mut(slot).set_solution(solution_for(agent)).unwrap();
        }
        panel
    }

    #[test]
    fn test_review_pairs_full_cross_product() {
        let panel = solved_panel();
        let pairs = panel.review_pairs();
        assert_eq!(pairs.len(), SOLVER_COUNT * (SOLVER_COUNT - 1));
        assert!(pairs.iter().all(|(reviewer, reviewee)| reviewer != reviewee));
    }

    #[test]
    fn test_review_pairs_skip_unsolved() {
        let mut panel = SolverPanel::from_assignment(&assignment());
        panel.get_mut(SolverSlot::One).set_solution(solution_for("B")).unwrap();
        panel.get_mut(SolverSlot::Three).set_solution(solution_for("D")).unwrap();
        let pairs = panel.review_pairs();
        assert_eq!(
            pairs,
            vec![(SolverSlot::One, SolverSlot::Three), (SolverSlot::Three, SolverSlot::One)]
        );
    }

    #[test]
    fn test_misaddressed_review_rejected() {
        let mut panel = solved_panel();
        let for_c = review("B", panel.get(SolverSlot::Two).solution().unwrap());
        let err = panel.deliver_review(SolverSlot::Three, for_c).unwrap_err();
        assert_eq!(err.kind(), "role_integrity");
        assert!(panel.get(SolverSlot::Three).reviews().is_empty());
    }

    #[test]
    fn test_refinement_uses_only_received_reviews() {
        let mut panel = solved_panel();
        let b_solution = panel.get(SolverSlot::One).solution().unwrap().clone();
        panel.deliver_review(SolverSlot::One, review("C", &b_solution)).unwrap();
        panel.deliver_review(SolverSlot::One, review("D", &b_solution)).unwrap();

        let problem = problem();
        let input = RefinementInput::for_context(&problem, panel.get(SolverSlot::One)).unwrap();
        assert_eq!(input.reviews.len(), 2);
        assert_eq!(panel.get(SolverSlot::One).review_ids(), vec!["rev-C-B", "rev-D-B"]);

        assert!(RefinementInput::for_context(&problem, panel.get(SolverSlot::Two)).is_none());
    }

    #[test]
    fn test_judgment_input_requires_complete_contexts() {
        let mut panel = solved_panel();
        let problem = problem();
        let err = panel.judgment_input(&problem).unwrap_err();
        assert_eq!(
            err,
            DomainError::IncompleteSolver {
                slot: SolverSlot::One,
                missing: "refined solution"
            }
        );

        for slot in SolverSlot::ALL {
            let refined = refined_for(panel.get(slot));
            panel.get_mut(slot).set_refined(refined).unwrap();
        }
        let input = panel.judgment_input(&problem).unwrap();
        assert_eq!(input.solver_contexts.len(), SOLVER_COUNT);

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["solver_contexts"][1]["solver"], "Solver 2");
        assert!(value["problem"].get("ground_answer").is_none());
    }

    #[test]
    fn test_refined_must_descend_from_solution() {
        let mut panel = solved_panel();
        let mut refined = refined_for(panel.get(SolverSlot::Two));
        refined.parent_solution_id = "other".into();
        assert!(panel.get_mut(SolverSlot::Two).set_refined(refined).is_err());
    }
}
