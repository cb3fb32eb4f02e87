//! Numerical integration over stellar mass.
//!
//! Initial mass functions and the quantities weighted by them are close to
//! power laws, which are smooth in `ln m`. Integrating in log space keeps
//! composite Simpson accurate with a modest number of intervals across mass
//! ranges spanning several decades.

/// Default number of Simpson intervals used by [`simpson_log`] callers.
pub const DEFAULT_INTERVALS: usize = 256;

/// Integrates `f(m) dm` from `lo` to `hi` with composite Simpson in `ln m`.
///
/// The substitution `m = e^u` turns the integral into `∫ f(e^u) e^u du`,
/// which is sampled on `intervals` equal steps in `u` (rounded up to an even
/// count, at least 2).
///
/// Returns `Ok(0.0)` without calling `f` when the range is empty
/// (`hi <= lo`). `lo` must be strictly positive.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
///
/// # Example
///
/// ```
/// use onezone_core::quadrature::simpson_log;
///
/// let integral = simpson_log(|m| Ok::<_, ()>(m.powf(-2.0)), 1.0, 10.0, 64).unwrap();
/// assert!((integral - 0.9).abs() < 1e-8);
/// ```
pub fn simpson_log<F, E>(mut f: F, lo: f64, hi: f64, intervals: usize) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    debug_assert!(lo > 0.0, "log-space quadrature needs a positive lower bound");

    if hi <= lo {
        return Ok(0.0);
    }

    let n = intervals.max(2).next_multiple_of(2);
    let (u_lo, u_hi) = (lo.ln(), hi.ln());

    #[allow(clippy::cast_precision_loss)]
    let h = (u_hi - u_lo) / n as f64;

    let mut sum = 0.0;
    for i in 0..=n {
        // Pin the end points so the integrand sees the exact bounds.
        let m = match i {
            0 => lo,
            _ if i == n => hi,
            #[allow(clippy::cast_precision_loss)]
            _ => (u_lo + h * i as f64).exp(),
        };

        let weight = if i == 0 || i == n {
            1.0
        } else if i % 2 == 1 {
            4.0
        } else {
            2.0
        };

        sum += weight * f(m)? * m;
    }

    Ok(sum * h / 3.0)
}
