use onezone_core::{DomainError, EvaluationError};
use thiserror::Error;

use crate::{ConfigurationError, Phase};

/// Errors produced while configuring, running or querying a one-zone model.
///
/// `Configuration` and `InvalidState` are raised before anything is mutated.
/// An `Evaluation` error raised mid-run finalizes the run; the failed step is
/// never committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("species {0} is not tracked")]
    UnknownSpecies(String),

    #[error("cannot {operation} while the run is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },
}
