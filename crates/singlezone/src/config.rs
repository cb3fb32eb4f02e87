//! Setup of a one-zone model.
//!
//! A [`Config`] is assembled with `with_*` builder methods and checked as a
//! whole when the model is validated. Nothing is checked while building, so
//! the order of the builder calls never matters.

mod element;
mod parameters;

use std::{collections::HashSet, fmt, sync::Arc};

use onezone_core::{Callback1, Callback2, Imf};
use thiserror::Error;

use crate::population::IA_HORIZON;

pub use element::{ElementConfig, Entrainment};
pub use parameters::{DelayTimeDistribution, Parameters, Recycling, Timeline};

/// A missing or invalid setting, found while validating a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{field} is not bound")]
    Unbound { field: String },

    #[error("{field} {reason}")]
    Invalid { field: String, reason: &'static str },

    #[error("species {0} is tracked more than once")]
    DuplicateSpecies(String),
}

impl ConfigurationError {
    pub(crate) fn unbound(field: impl Into<String>) -> Self {
        Self::Unbound {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: &'static str) -> Self {
        Self::Invalid {
            field: field.into(),
            reason,
        }
    }

    /// Returns the path of the offending setting, such as `timeline.step`.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Unbound { field } | Self::Invalid { field, .. } => field,
            Self::DuplicateSpecies(_) => "elements",
        }
    }
}

/// Everything a one-zone model needs before it can run.
///
/// Rate laws are held behind `Arc`, so cloning a config is cheap and the
/// clones share their callbacks.
#[derive(Clone)]
pub struct Config {
    pub(crate) timeline: Timeline,
    pub(crate) parameters: Parameters,
    pub(crate) imf: Option<Imf>,
    pub(crate) star_formation_efficiency: Option<Arc<dyn Callback2>>,
    pub(crate) inflow: Option<Arc<dyn Callback1>>,
    pub(crate) mass_loading: Option<Arc<dyn Callback1>>,
    pub(crate) elements: Vec<ElementConfig>,
}

impl Config {
    /// Starts a config with default parameters and no rate laws bound.
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            parameters: Parameters::default(),
            imf: None,
            star_formation_efficiency: None,
            inflow: None,
            mass_loading: None,
            elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_imf(mut self, imf: Imf) -> Self {
        self.imf = Some(imf);
        self
    }

    /// Sets the star formation efficiency `ε(t, M_gas)`, in 1/Gyr.
    ///
    /// The star formation rate is `ε · M_gas` spread over a Gyr.
    #[must_use]
    pub fn with_star_formation_efficiency(mut self, efficiency: impl Callback2 + 'static) -> Self {
        self.star_formation_efficiency = Some(Arc::new(efficiency));
        self
    }

    /// Sets the gas inflow rate as a function of time, in Msun/yr.
    #[must_use]
    pub fn with_inflow(mut self, inflow: impl Callback1 + 'static) -> Self {
        self.inflow = Some(Arc::new(inflow));
        self
    }

    /// Sets the outflow mass loading `η(t)`: outflow rate per unit star
    /// formation rate.
    #[must_use]
    pub fn with_mass_loading(mut self, mass_loading: impl Callback1 + 'static) -> Self {
        self.mass_loading = Some(Arc::new(mass_loading));
        self
    }

    /// Tracks another species. Elements are reported in the order added.
    #[must_use]
    pub fn with_element(mut self, element: ElementConfig) -> Self {
        self.elements.push(element);
        self
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn elements(&self) -> &[ElementConfig] {
        &self.elements
    }

    /// Checks the whole config, reporting the first problem found.
    ///
    /// Validation reads the config only, so repeated calls return the same
    /// result.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.validate_timeline()?;
        self.validate_parameters()?;

        if self.imf.is_none() {
            return Err(ConfigurationError::unbound("imf"));
        }
        if self.star_formation_efficiency.is_none() {
            return Err(ConfigurationError::unbound("star_formation_efficiency"));
        }
        if self.inflow.is_none() {
            return Err(ConfigurationError::unbound("inflow"));
        }
        if self.mass_loading.is_none() {
            return Err(ConfigurationError::unbound("mass_loading"));
        }

        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.symbol()) {
                return Err(ConfigurationError::DuplicateSpecies(element.symbol.clone()));
            }
            element.validate()?;
        }

        Ok(())
    }

    fn validate_timeline(&self) -> Result<(), ConfigurationError> {
        let Timeline { start, end, step } = self.timeline;

        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigurationError::invalid(
                "timeline.step",
                "must be finite and positive",
            ));
        }
        if !start.is_finite() {
            return Err(ConfigurationError::invalid("timeline.start", "must be finite"));
        }
        if !end.is_finite() || end <= start {
            return Err(ConfigurationError::invalid(
                "timeline.end",
                "must be finite and later than the start",
            ));
        }
        #[allow(clippy::cast_precision_loss)]
        let limit = Timeline::MAX_STEPS as f64;
        if (end - start) / step - 0.5 > limit {
            return Err(ConfigurationError::invalid(
                "timeline.step",
                "must not split the timeline into more than 1,000,000 steps",
            ));
        }

        Ok(())
    }

    fn validate_parameters(&self) -> Result<(), ConfigurationError> {
        let p = &self.parameters;

        if !p.initial_gas_mass.is_finite() || p.initial_gas_mass < 0.0 {
            return Err(ConfigurationError::invalid(
                "parameters.initial_gas_mass",
                "must be finite and non-negative",
            ));
        }
        if !(p.hydrogen_fraction > 0.0 && p.hydrogen_fraction <= 1.0) {
            return Err(ConfigurationError::invalid(
                "parameters.hydrogen_fraction",
                "must lie in (0, 1]",
            ));
        }
        if let Recycling::Instantaneous { fraction } = p.recycling {
            if !(0.0..1.0).contains(&fraction) {
                return Err(ConfigurationError::invalid(
                    "parameters.recycling.fraction",
                    "must lie in [0, 1)",
                ));
            }
        }
        match p.delay_time_distribution {
            DelayTimeDistribution::PowerLaw { slope } if !slope.is_finite() => {
                return Err(ConfigurationError::invalid(
                    "parameters.delay_time_distribution.slope",
                    "must be finite",
                ));
            }
            DelayTimeDistribution::Exponential { timescale }
                if !timescale.is_finite() || timescale <= 0.0 =>
            {
                return Err(ConfigurationError::invalid(
                    "parameters.delay_time_distribution.timescale",
                    "must be finite and positive",
                ));
            }
            _ => {}
        }
        if !(p.ia_minimum_delay > 0.0 && p.ia_minimum_delay < IA_HORIZON) {
            return Err(ConfigurationError::invalid(
                "parameters.ia_minimum_delay",
                "must lie in (0, 15) Gyr",
            ));
        }
        if !p.lower_stellar_mass.is_finite() || p.lower_stellar_mass <= 0.0 {
            return Err(ConfigurationError::invalid(
                "parameters.lower_stellar_mass",
                "must be finite and positive",
            ));
        }
        if !p.upper_stellar_mass.is_finite() || p.upper_stellar_mass <= p.lower_stellar_mass {
            return Err(ConfigurationError::invalid(
                "parameters.upper_stellar_mass",
                "must be finite and above the lower stellar mass",
            ));
        }
        if !p.agb_upper_mass.is_finite() || p.agb_upper_mass <= 0.0 {
            return Err(ConfigurationError::invalid(
                "parameters.agb_upper_mass",
                "must be finite and positive",
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |is_bound: bool| if is_bound { "bound" } else { "unbound" };

        f.debug_struct("Config")
            .field("timeline", &self.timeline)
            .field("parameters", &self.parameters)
            .field("imf", &self.imf)
            .field(
                "star_formation_efficiency",
                &bound(self.star_formation_efficiency.is_some()),
            )
            .field("inflow", &bound(self.inflow.is_some()))
            .field("mass_loading", &bound(self.mass_loading.is_some()))
            .field("elements", &self.elements)
            .finish()
    }
}
