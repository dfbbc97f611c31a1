//! Prompt templates for the debate stages
//!
//! System prompts state the role and the rules; user prompts carry the
//! stage input as a JSON document. Output structure is enforced separately
//! through the provider's JSON-schema mode, so prompts only ask for a single
//! JSON object.

use crate::core::problem::Problem;
use crate::orchestration::context::{JudgmentInput, PeerReviewInput, RefinementInput};
use serde::Serialize;

/// A system/user prompt pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

const OUTPUT_RULES: &str = r#"Output rules:
- Reply with a single JSON object that matches the enforced output schema
- Do not add, rename, or remove fields
- Do not wrap the object in markdown or add any other text"#;

const DEFAULT_SOLVER_POLICY: &str = r#"You are a general-purpose problem solver.
Focus on correctness, clear reasoning, and explicit assumptions."#;

/// Category-specific guidance for solvers
fn solver_policy(category: &str) -> &'static str {
    match category {
        "Mathematical/Logical Reasoning" => {
            r#"You specialise in mathematical and logical reasoning.
Show every derivation step, handle edge cases carefully, and verify intermediate results.
Do not make intuitive leaps or skip algebra."#
        }
        "Physics & Scientific Reasoning" => {
            r#"You specialise in physics and scientific reasoning.
Pick formulas deliberately, keep units consistent, state assumptions, and check limiting cases."#
        }
        "Logic & Constraint Satisfaction" => {
            r#"You specialise in logic and constraint satisfaction.
Check consistency, analyse every case, eliminate contradictions, and track assumptions explicitly.
Avoid probabilistic language and unverified conclusions."#
        }
        "Strategic Game Theory" => {
            r#"You specialise in strategic and game-theoretic reasoning.
Work from payoff structures, incentives, best responses, and equilibria.
Back every claim formally rather than narratively."#
        }
        _ => DEFAULT_SOLVER_POLICY,
    }
}

fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn wrap_input(tag: &str, instruction: &str, body: String) -> String {
    format!(
        r#"The JSON object below is the complete and authoritative input for this task.
{instruction}

<{tag}>
{body}
</{tag}>"#
    )
}

/// Builds the prompts for every debate stage
pub struct DebatePrompts;

impl DebatePrompts {
    pub fn role_assessment(problem: &Problem) -> PromptPair {
        let system = format!(
            r#"You are one agent in a multi-agent problem solving system.
Assess how well suited you are to each role for the given problem:
- Solver: derives a solution from scratch
- Judge: evaluates, compares, and critiques several solutions

Score each role between 0 and 1 from the problem's characteristics alone.
Do not solve the problem and do not pick a final role.

{OUTPUT_RULES}"#
        );
        let user = wrap_input(
            "problem",
            "Use only this problem to score your suitability for each role.",
            render_json(&problem.brief()),
        );
        PromptPair { system, user }
    }

    pub fn solve(problem: &Problem) -> PromptPair {
        let system = format!(
            r#"You are one agent in a multi-agent problem solving system.
Your role is Solver for a problem in the category "{category}".

{policy}

Rules:
- Derive the answer only from your own reasoning over the given input
- Do not assume information that is not present
- The answer field holds only the final answer, with no justification
- The answer must follow from the reasoning you give

{OUTPUT_RULES}"#,
            category = problem.category,
            policy = solver_policy(&problem.category),
        );
        let user = wrap_input(
            "problem",
            "Solve this problem using only the information it contains.",
            render_json(&problem.brief()),
        );
        PromptPair { system, user }
    }

    pub fn peer_review(input: &PeerReviewInput<'_>) -> PromptPair {
        let system = format!(
            r#"You are one agent in a multi-agent problem solving system.
Your role is peer reviewer of another solver's solution.

Evaluate the solution for correctness, logical validity, completeness, and clarity.
- Do not restate the solution or solve the problem again
- Point out logical errors, unjustified steps, missing cases, and inconsistencies
- Locate every error precisely and rate its severity
- If there are no critical issues, say why the solution is correct

{OUTPUT_RULES}"#
        );
        let user = wrap_input(
            "review_input",
            "Review the solution against the problem using only this input.",
            render_json(input),
        );
        PromptPair { system, user }
    }

    pub fn refine(input: &RefinementInput<'_>) -> PromptPair {
        let system = format!(
            r#"You are one agent in a multi-agent problem solving system.
Your role is to refine your earlier solution using the peer reviews you received.

- Address every critique and mark it accepted or rejected
- Incorporate accepted critiques into revised reasoning
- Defend the original reasoning where a critique is wrong
- Do not solve the problem again from scratch
- The refined answer must follow from the refined reasoning

{OUTPUT_RULES}"#
        );
        let user = wrap_input(
            "refinement_input",
            "Refine the solution using only this input.",
            render_json(input),
        );
        PromptPair { system, user }
    }

    pub fn judge(input: &JudgmentInput<'_>) -> PromptPair {
        let labels = input
            .solver_contexts
            .iter()
            .map(|s| s.solver.label())
            .collect::<Vec<_>>()
            .join(", ");
        let system = format!(
            r#"You are one agent in a multi-agent problem solving system.
Your role is final judge: select the single best refined solution.

For each solver:
1. Assess the correctness of the original solution
2. Separate valid critiques from invalid ones in its reviews
3. Judge how well the refined solution addressed the valid critiques

Then compare only the refined solutions and select exactly one winner among: {labels}.
- Prefer correctness and logical soundness over style or length
- If several are correct, prefer the most rigorous and complete reasoning
- Do not merge solutions or invent new arguments

{OUTPUT_RULES}"#
        );
        let user = wrap_input(
            "judgment_input",
            "Judge the solvers using only this input.",
            render_json(input),
        );
        PromptPair { system, user }
    }
}
