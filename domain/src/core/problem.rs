//! Problem entity and problem-set slicing

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A problem to be debated (Entity)
///
/// Deserializes from the dataset record layout
/// (`id`, `category`, `subcategory`, `problem_statement`, `ground_answer`, `difficulty`).
/// The ground-truth answer and difficulty never reach an agent; prompts are
/// built from [`ProblemBrief`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(rename = "problem_statement")]
    pub statement: String,
    pub ground_answer: String,
    pub difficulty: String,
}

impl Problem {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        statement: impl Into<String>,
        ground_answer: impl Into<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            subcategory: None,
            statement: statement.into(),
            ground_answer: ground_answer.into(),
            difficulty: difficulty.into(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// The agent-visible view of this problem
    pub fn brief(&self) -> ProblemBrief<'_> {
        ProblemBrief {
            category: &self.category,
            subcategory: self.subcategory.as_deref(),
            statement: &self.statement,
        }
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::InvalidProblem("id cannot be empty".to_string()));
        }
        if self.statement.trim().is_empty() {
            return Err(DomainError::InvalidProblem(format!(
                "problem '{}' has an empty statement",
                self.id
            )));
        }
        Ok(())
    }
}

/// What an agent is allowed to see of a [`Problem`]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProblemBrief<'a> {
    pub category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<&'a str>,
    pub statement: &'a str,
}

/// An ordered, validated problem set (Value Object)
#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    problems: Vec<Problem>,
}

impl ProblemSet {
    /// Build a problem set, rejecting invalid problems and duplicate ids
    pub fn new(problems: Vec<Problem>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for problem in &problems {
            problem.validate()?;
            if !seen.insert(problem.id.as_str()) {
                return Err(DomainError::InvalidProblem(format!(
                    "duplicate problem id '{}'",
                    problem.id
                )));
            }
        }
        Ok(Self { problems })
    }

    /// Drop the first `skip` problems, then keep at most `take`
    pub fn slice(self, skip: usize, take: Option<usize>) -> Self {
        let iter = self.problems.into_iter().skip(skip);
        let problems = match take {
            Some(take) => iter.take(take).collect(),
            None => iter.collect(),
        };
        Self { problems }
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter()
    }

    pub fn into_vec(self) -> Vec<Problem> {
        self.problems
    }
}
