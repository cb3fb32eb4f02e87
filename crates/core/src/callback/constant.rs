use crate::{Args, EvaluationError, error::check_args};

use super::{Callback1, Callback2};

/// A rate law that ignores its arguments and returns a fixed value.
///
/// Useful for constant inflow rates, constant mass loading, or to switch an
/// enrichment channel off with `Constant(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Constant {
    /// Returns the fixed value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Callback1 for Constant {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        let args = Args::One(x);
        check_args(args)?;
        if self.0.is_finite() {
            Ok(self.0)
        } else {
            Err(EvaluationError::NonFiniteOutput {
                args,
                value: self.0,
            })
        }
    }
}

impl Callback2 for Constant {
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        let args = Args::Two(x, y);
        check_args(args)?;
        if self.0.is_finite() {
            Ok(self.0)
        } else {
            Err(EvaluationError::NonFiniteOutput {
                args,
                value: self.0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_the_same_value_for_any_argument() {
        let five = Constant(5.0);

        assert_eq!(Callback1::evaluate(&five, 0.0), Ok(5.0));
        assert_eq!(Callback1::evaluate(&five, 1e9), Ok(5.0));
        assert_eq!(Callback2::evaluate(&five, -3.0, 2.0), Ok(5.0));
    }

    #[test]
    fn zero_is_exactly_zero() {
        let off = Constant(0.0);
        let value = Callback1::evaluate(&off, 12.0).unwrap();

        assert!(value == 0.0 && value.is_sign_positive());
    }

    #[test]
    fn non_finite_constant_fails_on_evaluation() {
        let broken = Constant(f64::NAN);
        assert!(Callback1::evaluate(&broken, 1.0).is_err());
    }
}
