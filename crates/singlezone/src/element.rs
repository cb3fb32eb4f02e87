use std::sync::Arc;

use log::warn;
use onezone_core::{Args, Callback1, Callback2, DomainError, EvaluationError};

use crate::{
    ConfigurationError, Diagnostic, ElementConfig, Entrainment, GasStep, solar,
    population::{Kernels, Populations},
};

/// Mass of one species delivered to the zone by each channel during a step,
/// in Msun.
///
/// Production is recorded before entrainment; see [`Sources::retained`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sources {
    pub ccsne: f64,
    pub sneia: f64,
    pub agb: f64,

    /// Mass of the species returned by dying stars, which carry the
    /// composition of the gas they formed from.
    pub recycled: f64,

    /// Mass of the species carried in by infalling gas.
    pub inflow: f64,
}

impl Sources {
    /// Fresh nucleosynthetic production kept by the ISM.
    #[must_use]
    pub fn retained(&self, entrainment: &Entrainment) -> f64 {
        entrainment.ccsne * self.ccsne + entrainment.sneia * self.sneia + entrainment.agb * self.agb
    }

    /// Fresh nucleosynthetic production ejected directly from the zone.
    #[must_use]
    pub fn unretained(&self, entrainment: &Entrainment) -> f64 {
        (1.0 - entrainment.ccsne) * self.ccsne
            + (1.0 - entrainment.sneia) * self.sneia
            + (1.0 - entrainment.agb) * self.agb
    }
}

/// Result of committing one step to an element.
#[derive(Debug, Clone, PartialEq)]
pub struct MassUpdate {
    pub gained: f64,
    pub lost: f64,
    pub unretained: f64,
    pub diagnostic: Option<Diagnostic>,
}

/// Cumulative mass of one species moved by each channel over a run, in Msun.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub struct Ledger {
    /// Fresh production retained by the ISM.
    pub produced: f64,

    /// Fresh production ejected without mixing into the ISM.
    pub unretained: f64,

    pub recycled: f64,
    pub inflow: f64,

    /// Mass locked into newly formed stars.
    pub locked: f64,

    /// Mass carried out with the outflow.
    pub outflow: f64,
}

/// One tracked species in the ISM.
#[derive(Clone)]
pub struct Element {
    symbol: String,
    mass: f64,
    initial_mass: f64,
    solar_mass_fraction: f64,
    ccsne: Arc<dyn Callback1>,
    sneia: Arc<dyn Callback1>,
    agb: Arc<dyn Callback2>,
    entrainment: Entrainment,
    inflow_abundance: Option<Arc<dyn Callback1>>,
    fractions: Vec<f64>,
    unretained: f64,
    ledger: Ledger,
}

impl Element {
    pub(crate) fn new(config: &ElementConfig) -> Result<Self, ConfigurationError> {
        let field = |name: &str| format!("elements[{}].{name}", config.symbol);
        let solar_mass_fraction = config
            .solar_mass_fraction()
            .ok_or_else(|| ConfigurationError::unbound(field("solar_mass_fraction")))?;

        Ok(Self {
            symbol: config.symbol.clone(),
            mass: config.initial_mass,
            initial_mass: config.initial_mass,
            solar_mass_fraction,
            ccsne: config
                .ccsne
                .clone()
                .ok_or_else(|| ConfigurationError::unbound(field("ccsne")))?,
            sneia: config
                .sneia
                .clone()
                .ok_or_else(|| ConfigurationError::unbound(field("sneia")))?,
            agb: config
                .agb
                .clone()
                .ok_or_else(|| ConfigurationError::unbound(field("agb")))?,
            entrainment: config.entrainment,
            inflow_abundance: config.inflow_abundance.clone(),
            fractions: Vec::new(),
            unretained: 0.0,
            ledger: Ledger::default(),
        })
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Mass of the species in the ISM, in Msun.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[must_use]
    pub fn initial_mass(&self) -> f64 {
        self.initial_mass
    }

    #[must_use]
    pub fn solar_mass_fraction(&self) -> f64 {
        self.solar_mass_fraction
    }

    /// Production ejected without mixing during the last committed step.
    #[must_use]
    pub fn unretained(&self) -> f64 {
        self.unretained
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mass fraction of the species in the ISM at the start of each committed
    /// step, oldest first.
    #[must_use]
    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Mass fraction of the species in `gas_mass` Msun of gas; zero without gas.
    #[must_use]
    pub fn mass_fraction(&self, gas_mass: f64) -> f64 {
        if gas_mass > 0.0 {
            self.mass / gas_mass
        } else {
            0.0
        }
    }

    /// Returns `[X/H]`, the logarithmic abundance relative to hydrogen scaled
    /// to the solar value.
    ///
    /// A species with no mass has `[X/H] = -inf`, even when there is no gas.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if the species has mass but `hydrogen_mass`
    /// is not positive.
    pub fn abundance(&self, hydrogen_mass: f64) -> Result<f64, DomainError> {
        if self.mass == 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        if !(hydrogen_mass > 0.0) {
            return Err(DomainError::new("hydrogen mass", hydrogen_mass));
        }
        Ok((self.mass / hydrogen_mass).log10()
            - (self.solar_mass_fraction / solar::HYDROGEN).log10())
    }

    /// Evaluates the yields delivered to this species during a step.
    ///
    /// `metallicity` holds the ISM metallicity at the start of every step up
    /// to and including the current one. Yield callbacks are only called for
    /// populations that release something.
    ///
    /// # Errors
    ///
    /// Returns an error if a yield or the inflow abundance fails, or if the
    /// inflow abundance is not a mass fraction.
    pub fn sources(
        &self,
        step: &GasStep,
        populations: Populations<'_>,
        kernels: &Kernels,
        metallicity: &[f64],
    ) -> Result<Sources, EvaluationError> {
        let now = populations.step();
        let current_fraction = self.mass_fraction(step.gas_mass);
        let metallicity_at = |n: usize| metallicity.get(n).copied().unwrap_or(0.0);
        let fraction_at = |n: usize| {
            if n == now {
                current_fraction
            } else {
                self.fractions.get(n).copied().unwrap_or(0.0)
            }
        };

        let mut sources = Sources::default();

        let formed = step.stars_formed();
        if formed > 0.0 {
            sources.ccsne = Callback1::evaluate(&self.ccsne, metallicity_at(now))? * formed;
        }

        for population in populations.iter() {
            let (age, mass) = (population.age, population.mass);
            let z = metallicity_at(population.formed_at);

            let ia = kernels.sneia(age);
            if ia > 0.0 {
                sources.sneia += Callback1::evaluate(&self.sneia, z)? * mass * ia;
            }

            let dying = kernels.agb(age);
            if dying > 0.0 {
                let turnoff = kernels.agb_turnoff(age);
                sources.agb += Callback2::evaluate(&self.agb, turnoff, z)? * mass * dying;
            }

            let returned = kernels.returned(age);
            if returned > 0.0 {
                sources.recycled += returned * mass * fraction_at(population.formed_at);
            }
        }

        if step.inflow_rate > 0.0 {
            if let Some(abundance) = &self.inflow_abundance {
                let fraction = Callback1::evaluate(abundance, step.time)?;
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(EvaluationError::domain(
                        Args::One(step.time),
                        "inflow abundance",
                        fraction,
                    ));
                }
                sources.inflow = step.mass(step.inflow_rate) * fraction;
            }
        }

        Ok(sources)
    }

    /// Commits one step: adds the mass gained from `sources` and removes the
    /// mass locked into stars or carried out by the outflow.
    ///
    /// Losses follow the species' mass fraction in the gas at the start of the
    /// step. Losses beyond the mass available are clamped, which is reported
    /// as a [`Diagnostic::ElementClamped`].
    pub fn update_mass(&mut self, step: &GasStep, sources: &Sources) -> MassUpdate {
        let fraction = self.mass_fraction(step.gas_mass);
        let retained = sources.retained(&self.entrainment);
        let unretained = sources.unretained(&self.entrainment);
        let gained = retained + sources.recycled + sources.inflow;

        let locked = step.stars_formed() * fraction;
        let outflow = step.mass(step.outflow_rate) * fraction;
        let demand = locked + outflow;

        let lost = demand.min(self.mass);
        let mut excess = demand - lost;
        let mut next = self.mass - lost + gained;
        if next < 0.0 {
            excess -= next;
            next = 0.0;
        }

        let diagnostic = (excess > 0.0).then(|| {
            warn!(
                "{} mass clamped at t = {:.4} Gyr, excess {:.6e} Msun",
                self.symbol, step.time, excess
            );
            Diagnostic::ElementClamped {
                symbol: self.symbol.clone(),
                excess,
            }
        });

        let share = if demand > 0.0 { lost / demand } else { 0.0 };
        self.ledger.produced += retained;
        self.ledger.unretained += unretained;
        self.ledger.recycled += sources.recycled;
        self.ledger.inflow += sources.inflow;
        self.ledger.locked += locked * share;
        self.ledger.outflow += outflow * share;

        self.fractions.push(fraction);
        self.unretained = unretained;
        self.mass = next;

        MassUpdate {
            gained,
            lost,
            unretained,
            diagnostic,
        }
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("symbol", &self.symbol)
            .field("mass", &self.mass)
            .field("solar_mass_fraction", &self.solar_mass_fraction)
            .field("entrainment", &self.entrainment)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
