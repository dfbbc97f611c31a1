//! Load a problem set from a JSON array file

use debate_domain::{DomainError, Problem, ProblemSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid dataset {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
}

/// Read every problem from `path`, validate the whole set, then slice it
///
/// Validation runs before slicing so a duplicate id anywhere in the file is
/// reported even when the run only covers part of it.
pub fn load_problems(
    path: &Path,
    skip: usize,
    take: Option<usize>,
) -> Result<ProblemSet, DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let problems: Vec<Problem> =
        serde_json::from_str(&text).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let total = problems.len();
    let set = ProblemSet::new(problems)
        .map_err(|source| DatasetError::Invalid {
            path: path.to_path_buf(),
            source,
        })?
        .slice(skip, take);

    info!(
        path = %path.display(),
        total,
        selected = set.len(),
        skip,
        "Loaded problem set"
    );
    Ok(set)
}
