//! Stellar populations and the kernels that age them.
//!
//! Every step forms one simple stellar population. Its mass is released back
//! into the ISM over the following steps according to kernels indexed by the
//! population's age in steps:
//!
//! - `returned(k)`: fraction of the population's mass returned as gas while
//!   it ages from `kΔ` to `(k+1)Δ`
//! - `sneia(k)`: fraction of its Type Ia supernovae exploding in that bin
//! - `agb(k)`: fraction of its mass in stars leaving the main sequence in
//!   that bin with masses up to the AGB limit, paired with the turnoff mass
//!   `agb_turnoff(k)` at the bin midpoint
//!
//! The kernels depend only on the IMF, the parameters and the step size, so
//! they are built once per run.

use log::debug;
use onezone_core::{Callback1, EvaluationError, Imf, quadrature::simpson_log};

use crate::{DelayTimeDistribution, Parameters, Recycling, Timeline};

/// Lifetime of a 1 Msun star, in Gyr.
pub const SOLAR_LIFETIME: f64 = 10.0;

/// Exponent of the mass-lifetime relation `τ = τ_sun · m^-3.5`.
pub const LIFETIME_EXPONENT: f64 = 3.5;

/// Upper end of the delay-time window over which Type Ia rates are
/// normalized, in Gyr.
pub const IA_HORIZON: f64 = 15.0;

/// Simpson intervals per age bin. Bins are narrow in mass, except the first.
const BIN_INTERVALS: usize = 64;

/// Main-sequence lifetime of a star of mass `m`, in Gyr.
#[must_use]
pub fn lifetime(m: f64) -> f64 {
    SOLAR_LIFETIME * m.powf(-LIFETIME_EXPONENT)
}

/// Mass of the stars whose lifetime equals `age`, in Msun.
///
/// Stars above this mass have died. Infinite for non-positive ages.
#[must_use]
pub fn turnoff_mass(age: f64) -> f64 {
    if age <= 0.0 {
        f64::INFINITY
    } else {
        (age / SOLAR_LIFETIME).powf(-1.0 / LIFETIME_EXPONENT)
    }
}

/// Remnant mass left by a star of initial mass `m`, after Kalirai et al.
/// (2008). Stars above 8 Msun leave a 1.44 Msun remnant.
#[must_use]
pub fn remnant_mass(m: f64) -> f64 {
    if m < 8.0 { 0.394 + 0.109 * m } else { 1.44 }
}

/// Mass a star of initial mass `m` returns to the ISM.
fn ejected_mass(m: f64) -> f64 {
    (m - remnant_mass(m)).max(0.0)
}

/// Fraction of a population's mass returned to the ISM by the time it
/// reaches `age`.
///
/// # Errors
///
/// Returns an error if the IMF fails anywhere it is sampled.
pub fn cumulative_return_fraction(
    imf: &Imf,
    age: f64,
    parameters: &Parameters,
) -> Result<f64, EvaluationError> {
    let (lower, upper) = (parameters.lower_stellar_mass, parameters.upper_stellar_mass);
    let norm = imf.mass_weighted_integral(lower, upper)?;
    let returned = ejected_integral(imf, turnoff_mass(age).max(lower), upper, BIN_INTERVALS * 4)?;
    Ok(returned / norm)
}

fn ejected_integral(imf: &Imf, lo: f64, hi: f64, intervals: usize) -> Result<f64, EvaluationError> {
    simpson_log(|m| Ok(ejected_mass(m) * imf.evaluate(m)?), lo, hi, intervals)
}

/// Fraction of a population's Type Ia supernovae exploding at ages in
/// `[a, b]`, in Gyr.
///
/// The distribution is zero before `minimum_delay` and past [`IA_HORIZON`].
#[must_use]
pub fn ia_fraction(dtd: DelayTimeDistribution, minimum_delay: f64, a: f64, b: f64) -> f64 {
    let (a, b) = (a.max(minimum_delay), b.min(IA_HORIZON));
    if b <= a {
        return 0.0;
    }
    dtd_integral(dtd, a, b) / dtd_integral(dtd, minimum_delay, IA_HORIZON)
}

/// `∫ R(t) dt` over `[a, b]`, with `0 < a < b`.
fn dtd_integral(dtd: DelayTimeDistribution, a: f64, b: f64) -> f64 {
    match dtd {
        DelayTimeDistribution::PowerLaw { slope } => {
            let exponent = slope + 1.0;
            if exponent.abs() < 1e-12 {
                (b / a).ln()
            } else {
                (b.powf(exponent) - a.powf(exponent)) / exponent
            }
        }
        DelayTimeDistribution::Exponential { timescale } => {
            timescale * ((-a / timescale).exp() - (-b / timescale).exp())
        }
    }
}

/// Age-indexed release kernels of one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kernels {
    returned: Vec<f64>,
    sneia: Vec<f64>,
    agb: Vec<f64>,
    agb_turnoff: Vec<f64>,
}

impl Kernels {
    /// Kernels that release nothing, used before a run starts.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the kernels for every age a population can reach in the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the IMF fails anywhere it is sampled.
    pub fn build(
        imf: &Imf,
        parameters: &Parameters,
        timeline: &Timeline,
    ) -> Result<Self, EvaluationError> {
        let len = timeline.steps().min(Timeline::MAX_STEPS) + 1;
        let dt = timeline.step;
        let (lower, upper) = (parameters.lower_stellar_mass, parameters.upper_stellar_mass);
        let agb_upper = parameters.agb_upper_mass.min(upper);
        let norm = imf.mass_weighted_integral(lower, upper)?;

        let mut kernels = Self {
            returned: Vec::with_capacity(len),
            sneia: Vec::with_capacity(len),
            agb: Vec::with_capacity(len),
            agb_turnoff: Vec::with_capacity(len),
        };

        for k in 0..len {
            #[allow(clippy::cast_precision_loss)]
            let (young, old) = (k as f64 * dt, (k + 1) as f64 * dt);
            let (m_young, m_old) = (turnoff_mass(young), turnoff_mass(old));

            let returned = match parameters.recycling {
                Recycling::Instantaneous { fraction } => {
                    if k == 0 {
                        fraction
                    } else {
                        0.0
                    }
                }
                Recycling::Continuous => {
                    ejected_integral(imf, m_old.max(lower), m_young.min(upper), BIN_INTERVALS)?
                        / norm
                }
            };
            kernels.returned.push(returned);

            kernels.sneia.push(ia_fraction(
                parameters.delay_time_distribution,
                parameters.ia_minimum_delay,
                young,
                old,
            ));

            let dying = imf.mass_weighted_integral(m_old.max(lower), m_young.min(agb_upper))?;
            kernels.agb.push(dying / norm);
            kernels
                .agb_turnoff
                .push(turnoff_mass(0.5 * (young + old)).clamp(lower, agb_upper));
        }

        debug!(
            "built {len} population kernels: {:.4} of formed mass returned, {:.4} of SN Ia \
             exploded, {:.4} in AGB stars",
            kernels.returned.iter().sum::<f64>(),
            kernels.sneia.iter().sum::<f64>(),
            kernels.agb.iter().sum::<f64>(),
        );

        Ok(kernels)
    }

    /// Fraction of mass returned by a population aged `k` steps.
    #[must_use]
    pub fn returned(&self, k: usize) -> f64 {
        self.returned.get(k).copied().unwrap_or(0.0)
    }

    /// Fraction of Type Ia supernovae exploding in a population aged `k` steps.
    #[must_use]
    pub fn sneia(&self, k: usize) -> f64 {
        self.sneia.get(k).copied().unwrap_or(0.0)
    }

    /// Fraction of mass in stars entering the AGB in a population aged `k` steps.
    #[must_use]
    pub fn agb(&self, k: usize) -> f64 {
        self.agb.get(k).copied().unwrap_or(0.0)
    }

    /// Turnoff mass at which the AGB yield of a population aged `k` steps is
    /// evaluated.
    #[must_use]
    pub fn agb_turnoff(&self, k: usize) -> f64 {
        self.agb_turnoff.get(k).copied().unwrap_or(0.0)
    }

    /// Number of ages covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.returned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returned.is_empty()
    }
}

/// A stellar population, identified by the step that formed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Population {
    /// Step at which the population formed.
    pub formed_at: usize,

    /// Age in steps at the current step.
    pub age: usize,

    /// Stellar mass formed, in Msun.
    pub mass: f64,
}

/// The populations present at a step: every committed one plus the one
/// forming now.
#[derive(Debug, Clone, Copy)]
pub struct Populations<'a> {
    formed: &'a [f64],
    forming: f64,
}

impl<'a> Populations<'a> {
    /// `formed` holds the mass formed at each previous step, oldest first.
    #[must_use]
    pub fn new(formed: &'a [f64], forming: f64) -> Self {
        Self { formed, forming }
    }

    /// Index of the current step.
    #[must_use]
    pub fn step(&self) -> usize {
        self.formed.len()
    }

    /// Iterates youngest first, skipping populations that formed no stars.
    pub fn iter(&self) -> impl Iterator<Item = Population> + 'a {
        let step = self.step();
        std::iter::once((step, self.forming))
            .chain(self.formed.iter().copied().enumerate().rev())
            .filter(|&(_, mass)| mass > 0.0)
            .map(move |(formed_at, mass)| Population {
                formed_at,
                age: step - formed_at,
                mass,
            })
    }

    /// Total mass released as `kernel(age) · mass`, summed over populations.
    pub fn release(&self, kernel: impl Fn(usize) -> f64) -> f64 {
        self.iter().map(|p| kernel(p.age) * p.mass).sum()
    }
}
