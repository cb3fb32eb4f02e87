use std::fmt;

use thiserror::Error;

/// An input outside the mathematically valid range of a function.
///
/// Built-in initial mass functions signal this with their `-1` sentinel for
/// negative stellar masses. Physical rates that must be non-negative (star
/// formation efficiency, inflow, mass loading) report it as well.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{quantity} = {value} is outside its valid domain")]
pub struct DomainError {
    /// The name of the offending quantity.
    pub quantity: &'static str,

    /// The offending value.
    pub value: f64,
}

impl DomainError {
    /// Creates a domain error for the named quantity.
    #[must_use]
    pub fn new(quantity: &'static str, value: f64) -> Self {
        Self { quantity, value }
    }
}

/// Arguments passed to a callback, kept for error reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Args {
    One(f64),
    Two(f64, f64),
}

impl Args {
    /// Returns `true` if every argument is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::One(x) => x.is_finite(),
            Self::Two(x, y) => x.is_finite() && y.is_finite(),
        }
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(x) => write!(f, "({x})"),
            Self::Two(x, y) => write!(f, "({x}, {y})"),
        }
    }
}

/// A callback could not produce a usable value.
///
/// Rate laws are deterministic, so none of these is ever retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// The callback was asked to evaluate a non-finite argument.
    #[error("callback called with non-finite arguments {0}")]
    NonFiniteInput(Args),

    /// The wrapped function returned NaN or an infinity.
    #[error("callback returned {value} at {args}")]
    NonFiniteOutput { args: Args, value: f64 },

    /// The wrapped function reported a failure of its own.
    #[error("callback failed at {args}: {reason}")]
    Failed { args: Args, reason: String },

    /// The function is not applicable at these arguments.
    #[error("callback inapplicable at {args}: {source}")]
    Domain {
        args: Args,
        #[source]
        source: DomainError,
    },
}

impl EvaluationError {
    /// Reports that a callback's value lies outside the domain of `quantity`.
    #[must_use]
    pub fn domain(args: Args, quantity: &'static str, value: f64) -> Self {
        Self::Domain {
            args,
            source: DomainError::new(quantity, value),
        }
    }

    /// Returns the arguments that triggered the failure.
    #[must_use]
    pub fn args(&self) -> Args {
        match self {
            Self::NonFiniteInput(args)
            | Self::NonFiniteOutput { args, .. }
            | Self::Failed { args, .. }
            | Self::Domain { args, .. } => *args,
        }
    }
}

/// Rejects non-finite arguments before a wrapped function runs.
pub(crate) fn check_args(args: Args) -> Result<(), EvaluationError> {
    if args.is_finite() {
        Ok(())
    } else {
        Err(EvaluationError::NonFiniteInput(args))
    }
}

/// Accepts a wrapped function's value only if it is finite.
pub(crate) fn check_value(args: Args, value: f64) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFiniteOutput { args, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_display() {
        assert_eq!(Args::One(2.5).to_string(), "(2.5)");
        assert_eq!(Args::Two(1.0, -3.0).to_string(), "(1, -3)");
    }

    #[test]
    fn non_finite_arguments_are_rejected() {
        assert!(check_args(Args::One(1.0)).is_ok());
        assert_eq!(
            check_args(Args::Two(1.0, f64::NAN)).map_err(|e| e.to_string()),
            Err("callback called with non-finite arguments (1, NaN)".to_string()),
        );
    }

    #[test]
    fn errors_carry_their_arguments() {
        let error = check_value(Args::One(4.0), f64::INFINITY).unwrap_err();
        assert_eq!(error.args(), Args::One(4.0));
        assert_eq!(error.to_string(), "callback returned inf at (4)");
    }
}
