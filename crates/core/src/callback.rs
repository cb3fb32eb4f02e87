//! Real-valued rate laws of one or two arguments.
//!
//! Every physical rate in a one-zone model is supplied as a callback: the
//! initial mass function, the star formation efficiency, the inflow rate, the
//! outflow mass loading and the per-channel yields. The integrator only ever
//! sees the [`Callback1`] and [`Callback2`] traits, so a built-in rate law,
//! a Rust closure and a function living on the other side of an FFI boundary
//! are interchangeable.
//!
//! Implementations provided here:
//!
//! - closures: any `Fn(f64) -> f64` or `Fn(f64, f64) -> f64` that is
//!   `Send + Sync`
//! - [`Fallible`]: closures returning `Result<f64, E>`
//! - [`Constant`]: a fixed value, for either arity
//! - [`Foreign1`], [`Foreign2`]: an `extern "C"` function plus an opaque
//!   context pointer
//! - `Arc<T>` forwards to `T`, so one rate law can be shared by many models
//!
//! Every implementation rejects non-finite arguments and non-finite results
//! with an [`EvaluationError`].

mod constant;
mod fallible;
mod foreign;

use std::sync::Arc;

use crate::{
    EvaluationError,
    error::{Args, check_args, check_value},
};

pub use constant::Constant;
pub use fallible::Fallible;
pub use foreign::{Foreign1, Foreign2, ForeignFn1, ForeignFn2};

/// A real function of one real argument.
///
/// Evaluation must be deterministic and must not mutate shared state, which
/// is why `evaluate` takes `&self` and the trait requires `Send + Sync`.
pub trait Callback1: Send + Sync {
    /// Evaluates the function at `x`.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if `x` is not finite, if the wrapped
    /// function fails, or if it returns a non-finite value.
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError>;
}

/// A real function of two real arguments.
///
/// See [`Callback1`] for the evaluation contract.
pub trait Callback2: Send + Sync {
    /// Evaluates the function at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if an argument is not finite, if the
    /// wrapped function fails, or if it returns a non-finite value.
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationError>;
}

impl<F> Callback1 for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        let args = Args::One(x);
        check_args(args)?;
        check_value(args, self(x))
    }
}

impl<F> Callback2 for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        let args = Args::Two(x, y);
        check_args(args)?;
        check_value(args, self(x, y))
    }
}

impl<T: Callback1 + ?Sized> Callback1 for Arc<T> {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        Callback1::evaluate(&**self, x)
    }
}

impl<T: Callback2 + ?Sized> Callback2 for Arc<T> {
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        Callback2::evaluate(&**self, x, y)
    }
}
