use std::sync::Arc;

use log::warn;
use onezone_core::{Args, Callback1, Callback2, EvaluationError};

use crate::{
    Diagnostic, MassBudget, YEARS_PER_GYR,
    population::{Kernels, Populations},
};

/// Rates driving one step, evaluated from the state at its start.
///
/// Produced by [`Ism::evaluate`] without touching the ISM, then committed by
/// [`Ism::apply`]. Elements read the same values when they update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasStep {
    /// Time at the start of the step, in Gyr.
    pub time: f64,

    /// Step size, in Gyr.
    pub dt: f64,

    /// Gas mass at the start of the step, in Msun.
    pub gas_mass: f64,

    pub star_formation_rate: f64,
    pub inflow_rate: f64,
    pub outflow_rate: f64,

    /// Mass returned by dying stars during the step, as a rate.
    pub recycling_rate: f64,

    /// Gas the unlimited sinks would have drawn beyond the gas available, in
    /// Msun. Star formation and outflow were scaled down to remove it.
    pub deficit: f64,
}

impl GasStep {
    /// Mass moved during the step by a rate in Msun/yr.
    #[must_use]
    pub fn mass(&self, rate: f64) -> f64 {
        rate * self.dt * YEARS_PER_GYR
    }

    /// Stellar mass formed during the step.
    #[must_use]
    pub fn stars_formed(&self) -> f64 {
        self.mass(self.star_formation_rate)
    }
}

/// The gas reservoir of a zone and the rate laws acting on it.
#[derive(Clone)]
pub struct Ism {
    gas_mass: f64,
    star_formation_efficiency: Arc<dyn Callback2>,
    inflow: Arc<dyn Callback1>,
    mass_loading: Arc<dyn Callback1>,
    formed: Vec<f64>,
    latest: Option<GasStep>,
    budget: MassBudget,
}

impl Ism {
    pub(crate) fn new(
        gas_mass: f64,
        star_formation_efficiency: Arc<dyn Callback2>,
        inflow: Arc<dyn Callback1>,
        mass_loading: Arc<dyn Callback1>,
    ) -> Self {
        Self {
            gas_mass,
            star_formation_efficiency,
            inflow,
            mass_loading,
            formed: Vec::new(),
            latest: None,
            budget: MassBudget::new(gas_mass),
        }
    }

    #[must_use]
    pub fn gas_mass(&self) -> f64 {
        self.gas_mass
    }

    /// The rates of the last committed step, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&GasStep> {
        self.latest.as_ref()
    }

    /// Stellar mass formed at each committed step, oldest first.
    #[must_use]
    pub fn formed(&self) -> &[f64] {
        &self.formed
    }

    /// Mass currently in stars and remnants.
    #[must_use]
    pub fn stellar_mass(&self) -> f64 {
        self.budget.formed - self.budget.returned
    }

    #[must_use]
    pub fn budget(&self) -> &MassBudget {
        &self.budget
    }

    /// The populations present during a step forming `forming` Msun of stars.
    #[must_use]
    pub fn populations(&self, forming: f64) -> Populations<'_> {
        Populations::new(&self.formed, forming)
    }

    /// Evaluates the rates of the step starting at `time`.
    ///
    /// The order is fixed: star formation from the current gas mass, then
    /// inflow, then outflow as a multiple of star formation, then the mass
    /// returned by every population.
    ///
    /// If star formation and outflow would draw more gas than the step makes
    /// available, both are scaled down by the same factor so the reservoir
    /// ends the step empty. The excess is recorded as [`GasStep::deficit`].
    ///
    /// # Errors
    ///
    /// Returns an error if a rate law fails or returns a negative value.
    pub fn evaluate(&self, time: f64, dt: f64, kernels: &Kernels) -> Result<GasStep, EvaluationError> {
        let gas_mass = self.gas_mass;

        let efficiency = Callback2::evaluate(&self.star_formation_efficiency, time, gas_mass)?;
        non_negative(Args::Two(time, gas_mass), "star formation efficiency", efficiency)?;
        let star_formation_rate = efficiency * gas_mass / YEARS_PER_GYR;

        let inflow_rate = Callback1::evaluate(&self.inflow, time)?;
        non_negative(Args::One(time), "inflow rate", inflow_rate)?;

        let mass_loading = Callback1::evaluate(&self.mass_loading, time)?;
        non_negative(Args::One(time), "mass loading", mass_loading)?;
        let outflow_rate = mass_loading * star_formation_rate;

        let mut step = GasStep {
            time,
            dt,
            gas_mass,
            star_formation_rate,
            inflow_rate,
            outflow_rate,
            recycling_rate: 0.0,
            deficit: 0.0,
        };

        // The forming population's prompt return scales with the sinks.
        let older = self.populations(0.0).release(|age| kernels.returned(age));
        let forming = kernels.returned(0) * step.stars_formed();

        let available = gas_mass + step.mass(inflow_rate) + older;
        let sinks = step.stars_formed() + step.mass(outflow_rate) - forming;
        let scale = if sinks > available {
            step.deficit = sinks - available;
            available / sinks
        } else {
            1.0
        };

        step.star_formation_rate *= scale;
        step.outflow_rate *= scale;
        step.recycling_rate = (older + forming * scale) / (dt * YEARS_PER_GYR);

        Ok(step)
    }

    /// Commits an evaluated step.
    ///
    /// A step whose sinks were limited by the gas available is reported as a
    /// [`Diagnostic::GasClamped`].
    pub fn apply(&mut self, step: &GasStep) -> Option<Diagnostic> {
        let inflow = step.mass(step.inflow_rate);
        let returned = step.mass(step.recycling_rate);
        let formed = step.stars_formed();
        let outflow = step.mass(step.outflow_rate);

        let next = self.gas_mass + inflow + returned - formed - outflow;
        if next < 0.0 {
            // round-off left by the limited sinks
            self.budget.clamped -= next;
            self.gas_mass = 0.0;
        } else {
            self.gas_mass = next;
        }

        self.budget.inflow += inflow;
        self.budget.outflow += outflow;
        self.budget.formed += formed;
        self.budget.returned += returned;
        self.formed.push(formed);
        self.latest = Some(*step);

        (step.deficit > 0.0).then(|| {
            warn!(
                "star formation and outflow limited at t = {:.4} Gyr, deficit {:.6e} Msun",
                step.time, step.deficit
            );
            Diagnostic::GasClamped {
                deficit: step.deficit,
            }
        })
    }

    /// Evaluates and commits one step.
    ///
    /// # Errors
    ///
    /// Returns an error if a rate law fails, in which case nothing changes.
    pub fn advance(
        &mut self,
        time: f64,
        dt: f64,
        kernels: &Kernels,
    ) -> Result<(GasStep, Option<Diagnostic>), EvaluationError> {
        let step = self.evaluate(time, dt, kernels)?;
        let diagnostic = self.apply(&step);
        Ok((step, diagnostic))
    }
}

fn non_negative(args: Args, quantity: &'static str, value: f64) -> Result<(), EvaluationError> {
    if value < 0.0 {
        Err(EvaluationError::domain(args, quantity, value))
    } else {
        Ok(())
    }
}

impl std::fmt::Debug for Ism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ism")
            .field("gas_mass", &self.gas_mass)
            .field("latest", &self.latest)
            .field("populations", &self.formed.len())
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use onezone_core::{Constant, DomainError};

    fn ism(gas: f64, efficiency: f64, inflow: f64, mass_loading: f64) -> Ism {
        Ism::new(
            gas,
            Arc::new(Constant(efficiency)),
            Arc::new(Constant(inflow)),
            Arc::new(Constant(mass_loading)),
        )
    }

    #[test]
    fn rates_follow_the_gas_mass() {
        let ism = ism(6e9, 0.5, 10.0, 2.0);
        let step = ism.evaluate(0.0, 0.01, &Kernels::empty()).unwrap();

        assert_relative_eq!(step.star_formation_rate, 3.0);
        assert_relative_eq!(step.outflow_rate, 6.0);
        assert_relative_eq!(step.inflow_rate, 10.0);
        assert_relative_eq!(step.stars_formed(), 3e7);
        assert_eq!(step.recycling_rate, 0.0);
    }

    #[test]
    fn zero_efficiency_gives_exact_zeros() {
        let mut ism = ism(6e9, 0.0, 5.0, 3.0);
        for n in 0..10 {
            #[allow(clippy::cast_precision_loss)]
            let (step, diagnostic) = ism.advance(n as f64 * 0.01, 0.01, &Kernels::empty()).unwrap();
            assert_eq!(step.star_formation_rate, 0.0);
            assert_eq!(step.outflow_rate, 0.0);
            assert_eq!(step.recycling_rate, 0.0);
            assert_eq!(diagnostic, None);
        }
        assert_relative_eq!(ism.gas_mass(), 6e9 + 10.0 * 5e7);
        assert_eq!(ism.stellar_mass(), 0.0);
    }

    #[test]
    fn instantaneous_return_feeds_back_in_the_same_step() {
        let mut ism = ism(1e9, 1.0, 0.0, 0.0);
        let timeline = crate::Timeline::new(0.0, 1.0, 0.1);
        let parameters = crate::Parameters {
            recycling: crate::Recycling::Instantaneous { fraction: 0.25 },
            ..crate::Parameters::default()
        };
        let kernels = Kernels::build(&onezone_core::Imf::Kroupa, &parameters, &timeline).unwrap();

        let (step, _) = ism.advance(0.0, 0.1, &kernels).unwrap();
        assert_relative_eq!(step.stars_formed(), 1e8);
        assert_relative_eq!(step.mass(step.recycling_rate), 2.5e7);
        assert_relative_eq!(ism.gas_mass(), 1e9 - 1e8 + 2.5e7);
        assert_relative_eq!(ism.stellar_mass(), 7.5e7);
    }

    #[test]
    fn overdrawn_gas_limits_the_sinks() {
        // ε·dt·(1 + η) = 20 · 0.1 · 2 asks for four times the reservoir.
        let mut ism = ism(1e9, 20.0, 0.0, 1.0);
        let (step, diagnostic) = ism.advance(0.0, 0.1, &Kernels::empty()).unwrap();

        assert_relative_eq!(step.star_formation_rate, 5.0);
        assert_relative_eq!(step.outflow_rate, 5.0);
        assert_relative_eq!(step.deficit, 3e9);
        assert_eq!(diagnostic, Some(Diagnostic::GasClamped { deficit: step.deficit }));

        assert_abs_diff_eq!(ism.gas_mass(), 0.0, epsilon = 1e-3);
        assert_relative_eq!(ism.stellar_mass(), 5e8);
        assert_relative_eq!(ism.budget().outflow, 5e8);
        assert_abs_diff_eq!(ism.budget().clamped, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(ism.budget().residual(ism.gas_mass()), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn limited_steps_rescale_prompt_returns() {
        let mut ism = ism(1e9, 50.0, 2.0, 5.0);
        let timeline = crate::Timeline::new(0.0, 1.0, 0.05);
        let parameters = crate::Parameters {
            recycling: crate::Recycling::Instantaneous { fraction: 0.4 },
            ..crate::Parameters::default()
        };
        let kernels = Kernels::build(&onezone_core::Imf::Kroupa, &parameters, &timeline).unwrap();

        let (step, diagnostic) = ism.advance(0.0, 0.05, &kernels).unwrap();
        let formed = step.stars_formed();

        assert!(diagnostic.is_some());
        assert_relative_eq!(step.mass(step.recycling_rate), 0.4 * formed, max_relative = 1e-12);
        assert_relative_eq!(
            formed + step.mass(step.outflow_rate),
            1e9 + step.mass(step.inflow_rate) + 0.4 * formed,
            max_relative = 1e-12
        );
        assert!(ism.stellar_mass() <= 1e9 + ism.budget().inflow);
    }

    #[test]
    fn negative_rates_are_domain_errors() {
        let ism = ism(1e9, 0.5, -1.0, 0.0);
        assert_eq!(
            ism.evaluate(2.0, 0.01, &Kernels::empty()),
            Err(EvaluationError::Domain {
                args: Args::One(2.0),
                source: DomainError::new("inflow rate", -1.0),
            }),
        );
    }

    #[test]
    fn failed_evaluation_changes_nothing() {
        let mut ism = Ism::new(
            1e9,
            Arc::new(Constant(0.5)),
            Arc::new(Constant(1.0)),
            Arc::new(|t: f64| if t > 0.05 { f64::NAN } else { 1.0 }),
        );

        assert!(ism.advance(0.0, 0.1, &Kernels::empty()).is_ok());
        let before = ism.gas_mass();
        let budget = *ism.budget();

        assert!(ism.advance(0.1, 0.1, &Kernels::empty()).is_err());
        assert_eq!(ism.gas_mass(), before);
        assert_eq!(*ism.budget(), budget);
        assert_eq!(ism.formed().len(), 1);
    }
}
