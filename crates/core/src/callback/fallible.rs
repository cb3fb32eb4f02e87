use std::fmt::Display;

use crate::{
    Args, EvaluationError,
    error::{check_args, check_value},
};

use super::{Callback1, Callback2};

/// Adapts a closure that can fail into a callback.
///
/// The closure returns `Result<f64, E>`; an `Err` becomes
/// [`EvaluationError::Failed`] with the error's message and the arguments
/// that produced it.
///
/// # Example
///
/// ```
/// use onezone_core::{Callback1, Fallible};
///
/// let lookup = Fallible(|z: f64| {
///     if z <= 0.05 { Ok(0.015) } else { Err("metallicity outside table") }
/// });
///
/// assert_eq!(lookup.evaluate(0.01), Ok(0.015));
/// assert!(lookup.evaluate(0.1).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub F);

impl<F, E> Callback1 for Fallible<F>
where
    F: Fn(f64) -> Result<f64, E> + Send + Sync,
    E: Display,
{
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        let args = Args::One(x);
        check_args(args)?;
        let value = (self.0)(x).map_err(|error| EvaluationError::Failed {
            args,
            reason: error.to_string(),
        })?;
        check_value(args, value)
    }
}

impl<F, E> Callback2 for Fallible<F>
where
    F: Fn(f64, f64) -> Result<f64, E> + Send + Sync,
    E: Display,
{
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        let args = Args::Two(x, y);
        check_args(args)?;
        let value = (self.0)(x, y).map_err(|error| EvaluationError::Failed {
            args,
            reason: error.to_string(),
        })?;
        check_value(args, value)
    }
}
