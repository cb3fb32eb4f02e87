//! The single-zone time integrator.
//!
//! [`SingleZone`] owns the ISM and the tracked elements and advances them on
//! a fixed timestep. Each step runs in two halves:
//!
//! 1. Evaluate: the ISM rates, then the sources of every element in
//!    configuration order. Only rate laws and yields run here.
//! 2. Commit: the ISM gas update, then every element's mass update in
//!    configuration order, then the clock and the snapshot.
//!
//! A rate law that fails in the first half finalizes the run, leaving the
//! zone exactly as it was after the previous step.

mod action;
mod budget;
mod event;
mod phase;
mod snapshot;
mod status;

pub use action::Action;
pub use budget::MassBudget;
pub use event::Event;
pub use phase::Phase;
pub use snapshot::{ElementState, Snapshot};
pub use status::Status;

use log::{debug, error, info};
use onezone_core::{EvaluationError, Observer};

use crate::{
    Config, ConfigurationError, Diagnostic, Element, Error, GasStep, Ism, Timeline,
    population::Kernels,
};

/// Working state of a validated zone.
#[derive(Debug, Clone)]
struct Zone {
    ism: Ism,
    elements: Vec<Element>,
    kernels: Kernels,
    metallicity: Vec<f64>,
    step: usize,
    time: f64,
    history: Vec<Snapshot>,
}

impl Zone {
    fn new(config: &Config) -> Result<Self, ConfigurationError> {
        let ism = Ism::new(
            config.parameters.initial_gas_mass,
            config
                .star_formation_efficiency
                .clone()
                .ok_or_else(|| ConfigurationError::unbound("star_formation_efficiency"))?,
            config
                .inflow
                .clone()
                .ok_or_else(|| ConfigurationError::unbound("inflow"))?,
            config
                .mass_loading
                .clone()
                .ok_or_else(|| ConfigurationError::unbound("mass_loading"))?,
        );
        let elements = config
            .elements
            .iter()
            .map(Element::new)
            .collect::<Result<Vec<_>, _>>()?;

        let mut zone = Self {
            ism,
            elements,
            kernels: Kernels::empty(),
            metallicity: Vec::new(),
            step: 0,
            time: config.timeline.start,
            history: Vec::new(),
        };

        let metallicity = zone.current_metallicity();
        zone.metallicity.push(metallicity);
        let initial = zone.snapshot(config.parameters.hydrogen_fraction, Vec::new());
        zone.history.push(initial);

        Ok(zone)
    }

    fn current_metallicity(&self) -> f64 {
        let gas_mass = self.ism.gas_mass();
        if gas_mass > 0.0 {
            self.elements.iter().map(Element::mass).sum::<f64>() / gas_mass
        } else {
            0.0
        }
    }

    fn step(&mut self, timeline: &Timeline, hydrogen_fraction: f64) -> Result<(), EvaluationError> {
        let gas_step = self.ism.evaluate(self.time, timeline.step, &self.kernels)?;
        let populations = self.ism.populations(gas_step.stars_formed());
        let sources = self
            .elements
            .iter()
            .map(|element| {
                element.sources(&gas_step, populations, &self.kernels, &self.metallicity)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut diagnostics: Vec<Diagnostic> = self.ism.apply(&gas_step).into_iter().collect();
        for (element, sources) in self.elements.iter_mut().zip(&sources) {
            diagnostics.extend(element.update_mass(&gas_step, sources).diagnostic);
        }

        self.step += 1;
        self.time = timeline.time_at(self.step);

        let metallicity = self.current_metallicity();
        self.metallicity.push(metallicity);
        let snapshot = self.snapshot(hydrogen_fraction, diagnostics);
        self.history.push(snapshot);

        Ok(())
    }

    fn snapshot(&self, hydrogen_fraction: f64, diagnostics: Vec<Diagnostic>) -> Snapshot {
        let gas_mass = self.ism.gas_mass();
        let hydrogen_mass = hydrogen_fraction * gas_mass;
        let rate = |get: fn(&GasStep) -> f64| self.ism.latest().map_or(0.0, get);

        Snapshot {
            step: self.step,
            time: self.time,
            gas_mass,
            star_formation_rate: rate(|step| step.star_formation_rate),
            inflow_rate: rate(|step| step.inflow_rate),
            outflow_rate: rate(|step| step.outflow_rate),
            recycling_rate: rate(|step| step.recycling_rate),
            stellar_mass: self.ism.stellar_mass(),
            metallicity: self.current_metallicity(),
            elements: self
                .elements
                .iter()
                .map(|element| ElementState {
                    symbol: element.symbol().to_owned(),
                    mass: element.mass(),
                    abundance: element.abundance(hydrogen_mass).ok(),
                    unretained: element.unretained(),
                })
                .collect(),
            diagnostics,
        }
    }
}

/// A one-zone chemical evolution model.
///
/// # Example
///
/// ```
/// use onezone_core::{Constant, Imf};
/// use onezone_singlezone::{Action, Config, ElementConfig, Event, SingleZone, Status, Timeline};
///
/// let config = Config::new(Timeline::new(0.0, 2.0, 0.01))
///     .with_imf(Imf::Kroupa)
///     .with_star_formation_efficiency(Constant(0.5))
///     .with_inflow(Constant(0.0))
///     .with_mass_loading(Constant(1.0))
///     .with_element(ElementConfig::new("O").with_constant_yields(0.015, 0.0, 0.0));
///
/// let mut zone = SingleZone::new(config);
/// let status = zone.run(|event: &Event<'_>| {
///     (event.snapshot.time >= 1.0).then_some(Action::StopEarly)
/// })?;
///
/// assert_eq!(status, Status::StoppedByObserver);
/// assert!(zone.abundance("O")? > -2.0);
/// # Ok::<(), onezone_singlezone::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SingleZone {
    config: Config,
    phase: Phase,
    zone: Option<Zone>,
}

impl SingleZone {
    /// Creates an unvalidated model.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Constructed,
            zone: None,
        }
    }

    /// Validates the config and sets up the initial state.
    ///
    /// Does nothing once the model has been validated, so repeated calls
    /// return the same result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first invalid setting. The
    /// model stays `Constructed`.
    pub fn validate(&mut self) -> Result<(), Error> {
        if self.phase != Phase::Constructed {
            return Ok(());
        }

        self.config.validate()?;
        self.zone = Some(Zone::new(&self.config)?);
        self.phase = Phase::Validated;

        debug!(
            "validated zone tracking {} elements over {} steps",
            self.config.elements.len(),
            self.config.timeline.steps(),
        );
        Ok(())
    }

    /// Advances the run by one step.
    ///
    /// The first call builds the stellar population kernels and starts the
    /// run. The run is finalized once its time comes within half a step of
    /// the end of the timeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] without changing anything if the model
    /// is not validated or already finalized. Returns [`Error::Evaluation`]
    /// if a rate law fails, after finalizing the run; the failed step is not
    /// committed.
    pub fn advance(&mut self) -> Result<(), Error> {
        match self.phase {
            Phase::Constructed | Phase::Finalized => return Err(self.invalid_state("advance")),
            Phase::Validated => self.start()?,
            Phase::Running => {}
        }

        let timeline = self.config.timeline;
        let hydrogen_fraction = self.config.parameters.hydrogen_fraction;
        let Some(zone) = self.zone.as_mut() else {
            return Err(self.invalid_state("advance"));
        };

        if let Err(failure) = zone.step(&timeline, hydrogen_fraction) {
            error!("run failed at t = {:.4} Gyr: {failure}", zone.time);
            self.phase = Phase::Finalized;
            return Err(failure.into());
        }

        if zone.time >= timeline.end - 0.5 * timeline.step {
            info!(
                "run finalized at t = {:.4} Gyr after {} steps, gas mass {:.6e} Msun",
                zone.time,
                zone.step,
                zone.ism.gas_mass(),
            );
            self.phase = Phase::Finalized;
        }

        Ok(())
    }

    fn start(&mut self) -> Result<(), Error> {
        let imf = self
            .config
            .imf
            .as_ref()
            .ok_or_else(|| ConfigurationError::unbound("imf"))?;
        let Some(zone) = self.zone.as_mut() else {
            return Err(self.invalid_state("advance"));
        };

        match Kernels::build(imf, &self.config.parameters, &self.config.timeline) {
            Ok(kernels) => {
                zone.kernels = kernels;
                self.phase = Phase::Running;
                debug!("run started at t = {} Gyr", zone.time);
                Ok(())
            }
            Err(failure) => {
                error!("population kernels could not be built: {failure}");
                self.phase = Phase::Finalized;
                Err(failure.into())
            }
        }
    }

    /// Validates the model if needed and advances it until finalized or
    /// stopped by the observer.
    ///
    /// The observer receives an [`Event`] for the initial state when the run
    /// starts and one after every step. Returning [`Action::StopEarly`] pauses
    /// the run; calling `run` or `advance` again resumes it.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, if the run was already
    /// finalized, or if a rate law fails.
    pub fn run<Obs>(&mut self, mut observer: Obs) -> Result<Status, Error>
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        if self.phase == Phase::Finalized {
            return Err(self.invalid_state("run"));
        }
        self.validate()?;

        if self.phase == Phase::Validated
            && let Some(initial) = self.latest()
            && stop_requested(&mut observer, initial)
        {
            return Ok(Status::StoppedByObserver);
        }

        while self.phase != Phase::Finalized {
            self.advance()?;
            if let Some(snapshot) = self.latest()
                && stop_requested(&mut observer, snapshot)
            {
                return Ok(Status::StoppedByObserver);
            }
        }

        Ok(Status::Complete)
    }

    /// Runs to completion without observation.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_unobserved(&mut self) -> Result<Status, Error> {
        self.run(())
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            phase: self.phase,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Simulated time of the latest snapshot, in Gyr.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.zone
            .as_ref()
            .map_or(self.config.timeline.start, |zone| zone.time)
    }

    /// Number of steps committed so far.
    #[must_use]
    pub fn step(&self) -> usize {
        self.zone.as_ref().map_or(0, |zone| zone.step)
    }

    /// The ISM, once the model is validated.
    #[must_use]
    pub fn ism(&self) -> Option<&Ism> {
        self.zone.as_ref().map(|zone| &zone.ism)
    }

    #[must_use]
    pub fn gas_mass(&self) -> Option<f64> {
        self.latest().map(|snapshot| snapshot.gas_mass)
    }

    #[must_use]
    pub fn star_formation_rate(&self) -> Option<f64> {
        self.latest().map(|snapshot| snapshot.star_formation_rate)
    }

    #[must_use]
    pub fn outflow_rate(&self) -> Option<f64> {
        self.latest().map(|snapshot| snapshot.outflow_rate)
    }

    #[must_use]
    pub fn metallicity(&self) -> Option<f64> {
        self.latest().map(|snapshot| snapshot.metallicity)
    }

    /// The tracked elements in configuration order; empty before validation.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        match &self.zone {
            Some(zone) => &zone.elements,
            None => &[],
        }
    }

    #[must_use]
    pub fn element(&self, symbol: &str) -> Option<&Element> {
        self.elements()
            .iter()
            .find(|element| element.symbol() == symbol)
    }

    /// Returns the current `[X/H]` of a tracked species.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] before validation,
    /// [`Error::UnknownSpecies`] if the species is not tracked, and
    /// [`Error::Domain`] if the species has mass but the zone has no
    /// hydrogen.
    pub fn abundance(&self, symbol: &str) -> Result<f64, Error> {
        let Some(zone) = &self.zone else {
            return Err(self.invalid_state("query abundances"));
        };
        let element = self
            .element(symbol)
            .ok_or_else(|| Error::UnknownSpecies(symbol.to_owned()))?;
        let hydrogen_mass = self.config.parameters.hydrogen_fraction * zone.ism.gas_mass();
        Ok(element.abundance(hydrogen_mass)?)
    }

    /// Snapshots of every committed step, starting with the initial state.
    #[must_use]
    pub fn history(&self) -> &[Snapshot] {
        match &self.zone {
            Some(zone) => &zone.history,
            None => &[],
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.history().last()
    }

    #[must_use]
    pub fn mass_budget(&self) -> Option<&MassBudget> {
        self.ism().map(Ism::budget)
    }

    /// Consumes the model, returning its time series.
    #[must_use]
    pub fn into_history(self) -> Vec<Snapshot> {
        self.zone.map(|zone| zone.history).unwrap_or_default()
    }
}

fn stop_requested<Obs>(observer: &mut Obs, snapshot: &Snapshot) -> bool
where
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let event = Event {
        step: snapshot.step,
        snapshot,
    };
    matches!(observer.observe(&event), Some(Action::StopEarly))
}
