//! Structured model outputs
//!
//! One type per stage. Each derives [`JsonSchema`] so the schema sent to
//! the provider and the type the response is parsed into cannot drift
//! apart. Field doc comments become schema descriptions.

use crate::roles::SolverSlot;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model output that can be requested with a JSON schema and checked
/// after parsing
pub trait StructuredOutput:
    DeserializeOwned + Serialize + JsonSchema + Clone + Send + Sync + 'static
{
    /// Name sent alongside the schema to providers that require one
    const SCHEMA_NAME: &'static str;

    /// Semantic checks serde cannot express (numeric ranges, non-empty fields)
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// JSON schema for this output
    fn json_schema() -> Value {
        let schema = schemars::r#gen::SchemaSettings::draft07()
            .with(|s| s.inline_subschemas = true)
            .into_generator()
            .into_root_schema_for::<Self>();
        serde_json::to_value(schema).unwrap_or(Value::Null)
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within [0, 1], got {}", field, value))
    }
}

fn check_not_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

/// Self-assessed suitability for each role on a given problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoleAssessmentOutput {
    /// Suitability for judging and comparing solutions (0-1)
    pub judge_score: f64,
    /// Suitability for deriving a solution from scratch (0-1)
    pub solver_score: f64,
    /// Why these scores fit the problem
    pub reasoning: String,
}

impl StructuredOutput for RoleAssessmentOutput {
    const SCHEMA_NAME: &'static str = "role_assessment";

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("judge_score", self.judge_score)?;
        check_unit_interval("solver_score", self.solver_score)
    }
}

/// A solver's original answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SolutionOutput {
    /// Final answer only, without justification
    pub answer: String,
    /// Step-by-step reasoning leading to the answer
    pub reasoning: Vec<String>,
    /// Confidence in the answer (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl StructuredOutput for SolutionOutput {
    const SCHEMA_NAME: &'static str = "problem_solution";

    fn validate(&self) -> Result<(), String> {
        check_not_blank("answer", &self.answer)?;
        if let Some(confidence) = self.confidence {
            check_unit_interval("confidence", confidence)?;
        }
        Ok(())
    }
}

/// Category of a defect found during peer review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    LogicalError,
    MissingCase,
    InvalidAssumption,
    MathError,
    Inconsistency,
    UnclearReasoning,
}

/// Impact of a defect on correctness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

/// A concrete defect in the reviewed solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewFinding {
    /// Where the defect occurs (e.g. "Step 5", "Case n=0")
    pub location: String,
    pub error_type: ErrorType,
    /// Why this is a defect
    pub description: String,
    pub severity: Severity,
}

/// Qualitative evaluation of a peer's solution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PeerEvaluation {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub errors: Vec<ReviewFinding>,
    pub suggested_changes: Vec<String>,
}

/// Overall categorical verdict of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    MostlyCorrect,
    PromisingButFlawed,
    Incorrect,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Correct => "correct",
            Verdict::MostlyCorrect => "mostly_correct",
            Verdict::PromisingButFlawed => "promising_but_flawed",
            Verdict::Incorrect => "incorrect",
        };
        f.write_str(s)
    }
}

/// One solver's review of another solver's solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewOutput {
    pub evaluation: PeerEvaluation,
    pub overall_assessment: Verdict,
    /// Confidence in the overall assessment (0-1)
    pub confidence: f64,
}

impl ReviewOutput {
    /// Most severe finding, if any
    pub fn worst_severity(&self) -> Option<Severity> {
        self.evaluation.errors.iter().map(|e| e.severity).max()
    }
}

impl StructuredOutput for ReviewOutput {
    const SCHEMA_NAME: &'static str = "problem_solution_review";

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("confidence", self.confidence)
    }
}

/// How one critique was handled during refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CritiqueResolution {
    /// Identifier of the review the critique came from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critique_id: Option<String>,
    /// The critique being addressed
    pub critique: String,
    /// How the solution responds to it
    pub response: String,
    /// Whether the critique was accepted as valid
    pub accepted: bool,
}

/// A solver's revision after reading its reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RefinementOutput {
    pub changes_made: Vec<CritiqueResolution>,
    pub refined_reasoning: Vec<String>,
    pub refined_answer: String,
    /// Whether the final answer differs from the original one
    pub answer_changed: bool,
    /// Confidence in the refined answer (0-1)
    pub confidence: f64,
}

impl StructuredOutput for RefinementOutput {
    const SCHEMA_NAME: &'static str = "refined_problem_solution";

    fn validate(&self) -> Result<(), String> {
        check_not_blank("refined_answer", &self.refined_answer)?;
        check_unit_interval("confidence", self.confidence)
    }
}

/// The judge's comparative decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JudgmentOutput {
    /// Evaluation steps leading to the decision
    pub reasoning: Vec<String>,
    /// Label of the solver whose refined solution wins
    pub winner_solver: SolverSlot,
    /// Confidence in the decision (0-1)
    pub confidence: f64,
}

impl StructuredOutput for JudgmentOutput {
    const SCHEMA_NAME: &'static str = "final_judgement";

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("confidence", self.confidence)
    }
}
