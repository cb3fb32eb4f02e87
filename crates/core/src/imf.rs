//! Built-in stellar initial mass functions.
//!
//! Both functions are defined only up to an overall normalization; callers
//! that need absolute numbers normalize by an integral over their mass range.
//! A negative stellar mass returns the sentinel `-1`, which the [`Callback1`]
//! implementations translate into [`EvaluationError::Domain`].
//!
//! At `m = 0` the power laws diverge. Both functions return [`f64::MAX`]
//! there so that every non-negative mass maps to a positive finite value.

use std::{fmt, sync::Arc};

use crate::{
    Args, Callback1, EvaluationError,
    error::check_args,
    quadrature::{DEFAULT_INTERVALS, simpson_log},
};

/// The Salpeter (1955) IMF, `m^-2.35`, up to normalization.
///
/// Returns `-1` if `m < 0`.
#[must_use]
pub fn salpeter55(m: f64) -> f64 {
    if m < 0.0 {
        -1.0
    } else {
        finite_pole(m.powf(-2.35))
    }
}

/// The Kroupa (2001) IMF, up to normalization.
///
/// A three-segment broken power law with slopes `-0.3` below 0.08 Msun,
/// `-1.3` between 0.08 and 0.5 Msun, and `-2.3` above 0.5 Msun. The segment
/// coefficients follow from continuity at the break masses:
///
/// ```text
/// m < 0.08          m^-0.3
/// 0.08 <= m < 0.5   0.08^(1.0) · m^-1.3         = 0.08 m^-1.3
/// m >= 0.5          0.08 · 0.5^(1.0) · m^-2.3   = 0.04 m^-2.3
/// ```
///
/// Returns `-1` if `m < 0`.
#[must_use]
pub fn kroupa01(m: f64) -> f64 {
    const LOW_BREAK: f64 = 0.08;
    const HIGH_BREAK: f64 = 0.5;

    if m < 0.0 {
        -1.0
    } else if m < LOW_BREAK {
        finite_pole(m.powf(-0.3))
    } else if m < HIGH_BREAK {
        LOW_BREAK.powf(-0.3 + 1.3) * m.powf(-1.3)
    } else {
        LOW_BREAK.powf(-0.3 + 1.3) * HIGH_BREAK.powf(-1.3 + 2.3) * m.powf(-2.3)
    }
}

fn finite_pole(value: f64) -> f64 {
    if value.is_infinite() { f64::MAX } else { value }
}

/// Checks an IMF value against the negative-mass sentinel.
fn checked(m: f64, value: f64) -> Result<f64, EvaluationError> {
    if value < 0.0 {
        Err(EvaluationError::domain(Args::One(m), "stellar mass", m))
    } else {
        Ok(value)
    }
}

/// [`salpeter55`] as a one-argument callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Salpeter55;

/// [`kroupa01`] as a one-argument callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kroupa01;

impl Callback1 for Salpeter55 {
    fn evaluate(&self, m: f64) -> Result<f64, EvaluationError> {
        check_args(Args::One(m))?;
        checked(m, salpeter55(m))
    }
}

impl Callback1 for Kroupa01 {
    fn evaluate(&self, m: f64) -> Result<f64, EvaluationError> {
        check_args(Args::One(m))?;
        checked(m, kroupa01(m))
    }
}

/// The stellar initial mass function of a model.
///
/// Either built-in can be swapped for a user-supplied function without the
/// integrator noticing. A custom IMF that returns a negative value is treated
/// like the built-in sentinel: the mass is outside its domain.
#[derive(Clone, Default)]
pub enum Imf {
    Salpeter,
    #[default]
    Kroupa,
    Custom(Arc<dyn Callback1>),
}

impl Imf {
    /// Wraps a user-supplied IMF.
    pub fn custom(imf: impl Callback1 + 'static) -> Self {
        Self::Custom(Arc::new(imf))
    }

    /// Returns the mass-weighted integral `∫ m ξ(m) dm` over `[lo, hi]`.
    ///
    /// This is the stellar mass formed in that range per unit of IMF
    /// normalization. An empty range integrates to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the IMF fails anywhere it is sampled.
    pub fn mass_weighted_integral(&self, lo: f64, hi: f64) -> Result<f64, EvaluationError> {
        simpson_log(|m| Ok(m * self.evaluate(m)?), lo, hi, DEFAULT_INTERVALS)
    }
}

impl Callback1 for Imf {
    fn evaluate(&self, m: f64) -> Result<f64, EvaluationError> {
        match self {
            Self::Salpeter => Salpeter55.evaluate(m),
            Self::Kroupa => Kroupa01.evaluate(m),
            Self::Custom(imf) => checked(m, imf.evaluate(m)?),
        }
    }
}

impl fmt::Debug for Imf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Salpeter => f.write_str("Salpeter"),
            Self::Kroupa => f.write_str("Kroupa"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::DomainError;

    const NEGATIVE_MASSES: [f64; 5] = [-1e-12, -0.08, -0.5, -1.0, -150.0];
    const MASSES: [f64; 9] = [0.0, 1e-6, 0.01, 0.08, 0.3, 0.5, 1.0, 8.0, 100.0];

    #[test]
    fn negative_masses_return_the_sentinel() {
        for m in NEGATIVE_MASSES {
            assert_eq!(salpeter55(m), -1.0, "salpeter55({m})");
            assert_eq!(kroupa01(m), -1.0, "kroupa01({m})");
        }
    }

    #[test]
    fn non_negative_masses_are_positive_and_finite() {
        for m in MASSES {
            for value in [salpeter55(m), kroupa01(m)] {
                assert!(value > 0.0 && value.is_finite(), "IMF({m}) = {value}");
            }
        }
    }

    #[test]
    fn kroupa_is_continuous_at_its_breaks() {
        for m in [0.08, 0.5] {
            let below = kroupa01(m * (1.0 - 1e-12));
            let at = kroupa01(m);
            assert_relative_eq!(below, at, max_relative = 1e-9);
        }
    }

    #[test]
    fn kroupa_segments_have_the_documented_slopes() {
        let slope = |a: f64, b: f64| (kroupa01(b) / kroupa01(a)).ln() / (b / a).ln();

        assert_relative_eq!(slope(0.01, 0.05), -0.3, epsilon = 1e-12);
        assert_relative_eq!(slope(0.1, 0.4), -1.3, epsilon = 1e-12);
        assert_relative_eq!(slope(1.0, 50.0), -2.3, epsilon = 1e-12);
    }

    #[test]
    fn salpeter_has_slope_minus_two_point_three_five() {
        assert_relative_eq!(salpeter55(1.0), 1.0);
        assert_relative_eq!(salpeter55(10.0), 10.0_f64.powf(-2.35));
    }

    #[test]
    fn callbacks_report_the_sentinel_as_a_domain_error() {
        let error = Salpeter55.evaluate(-2.0).unwrap_err();
        assert_eq!(
            error,
            EvaluationError::Domain {
                args: Args::One(-2.0),
                source: DomainError::new("stellar mass", -2.0),
            },
        );

        assert!(matches!(
            Imf::Kroupa.evaluate(-0.1),
            Err(EvaluationError::Domain { .. })
        ));
    }

    #[test]
    fn custom_imfs_use_the_same_contract() {
        let top_heavy = Imf::custom(|m: f64| if m < 0.0 { -1.0 } else { m.powf(-1.9) });

        assert_relative_eq!(top_heavy.evaluate(2.0).unwrap(), 2.0_f64.powf(-1.9));
        assert!(matches!(
            top_heavy.evaluate(-3.0),
            Err(EvaluationError::Domain { .. })
        ));
    }

    #[test]
    fn builtins_match_their_callbacks() {
        for m in MASSES {
            assert_eq!(Imf::Salpeter.evaluate(m), Ok(salpeter55(m)));
            assert_eq!(Imf::Kroupa.evaluate(m), Ok(kroupa01(m)));
        }
    }

    #[test]
    fn mass_weighted_integral_of_salpeter() {
        // ∫ m · m^-2.35 dm = (lo^-0.35 - hi^-0.35) / 0.35
        let exact = (0.08_f64.powf(-0.35) - 100.0_f64.powf(-0.35)) / 0.35;
        let integral = Imf::Salpeter.mass_weighted_integral(0.08, 100.0).unwrap();
        assert_relative_eq!(integral, exact, max_relative = 1e-8);
    }

    #[test]
    fn mass_weighted_integral_spans_kroupa_breaks() {
        let whole = Imf::Kroupa.mass_weighted_integral(0.08, 100.0).unwrap();
        let parts = Imf::Kroupa.mass_weighted_integral(0.08, 0.5).unwrap()
            + Imf::Kroupa.mass_weighted_integral(0.5, 100.0).unwrap();
        assert_relative_eq!(whole, parts, max_relative = 1e-3);
    }
}
