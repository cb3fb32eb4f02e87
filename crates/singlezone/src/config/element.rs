use std::{fmt, sync::Arc};

use onezone_core::{Callback1, Callback2, Constant};

use super::ConfigurationError;
use crate::solar;

/// Fractions of fresh nucleosynthetic production retained by the ISM.
///
/// The remainder is ejected from the zone as soon as it is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct Entrainment {
    pub ccsne: f64,
    pub sneia: f64,
    pub agb: f64,
}

impl Default for Entrainment {
    fn default() -> Self {
        Self {
            ccsne: 1.0,
            sneia: 1.0,
            agb: 1.0,
        }
    }
}

/// Setup of one tracked species.
///
/// Yields are mass fractions of a stellar population returned as the species:
///
/// - core collapse, `y_cc(Z)`, released in the step the population forms
/// - Type Ia, `y_ia(Z)`, released following the delay-time distribution
/// - AGB, `y_agb(m, Z)`, released as stars of mass `m` leave the main sequence
///
/// where `Z` is the metallicity of the ISM when the population formed.
#[derive(Clone)]
pub struct ElementConfig {
    pub(crate) symbol: String,
    pub(crate) initial_mass: f64,
    pub(crate) solar_mass_fraction: Option<f64>,
    pub(crate) ccsne: Option<Arc<dyn Callback1>>,
    pub(crate) sneia: Option<Arc<dyn Callback1>>,
    pub(crate) agb: Option<Arc<dyn Callback2>>,
    pub(crate) entrainment: Entrainment,
    pub(crate) inflow_abundance: Option<Arc<dyn Callback1>>,
}

impl ElementConfig {
    /// Starts the setup of a species with zero initial mass and no yields.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            initial_mass: 0.0,
            solar_mass_fraction: None,
            ccsne: None,
            sneia: None,
            agb: None,
            entrainment: Entrainment::default(),
            inflow_abundance: None,
        }
    }

    /// Sets the mass of the species in the ISM at the start of the run, in Msun.
    #[must_use]
    pub fn with_initial_mass(mut self, mass: f64) -> Self {
        self.initial_mass = mass;
        self
    }

    /// Overrides the solar reference used for `[X/H]`.
    ///
    /// Required for species missing from [`solar::ASPLUND09`].
    #[must_use]
    pub fn with_solar_mass_fraction(mut self, fraction: f64) -> Self {
        self.solar_mass_fraction = Some(fraction);
        self
    }

    #[must_use]
    pub fn with_ccsne_yield(mut self, yield_: impl Callback1 + 'static) -> Self {
        self.ccsne = Some(Arc::new(yield_));
        self
    }

    #[must_use]
    pub fn with_sneia_yield(mut self, yield_: impl Callback1 + 'static) -> Self {
        self.sneia = Some(Arc::new(yield_));
        self
    }

    /// Sets the AGB yield as a function of `(stellar mass, metallicity)`.
    #[must_use]
    pub fn with_agb_yield(mut self, yield_: impl Callback2 + 'static) -> Self {
        self.agb = Some(Arc::new(yield_));
        self
    }

    /// Binds metallicity-independent yields for all three channels.
    #[must_use]
    pub fn with_constant_yields(self, ccsne: f64, sneia: f64, agb: f64) -> Self {
        self.with_ccsne_yield(Constant(ccsne))
            .with_sneia_yield(Constant(sneia))
            .with_agb_yield(Constant(agb))
    }

    #[must_use]
    pub fn with_entrainment(mut self, entrainment: Entrainment) -> Self {
        self.entrainment = entrainment;
        self
    }

    /// Sets the mass fraction of the species in infalling gas as a function
    /// of time. Without it the inflow is pristine.
    #[must_use]
    pub fn with_inflow_abundance(mut self, abundance: impl Callback1 + 'static) -> Self {
        self.inflow_abundance = Some(Arc::new(abundance));
        self
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the solar reference, falling back to the Asplund (2009) table.
    #[must_use]
    pub fn solar_mass_fraction(&self) -> Option<f64> {
        self.solar_mass_fraction
            .or_else(|| solar::mass_fraction(&self.symbol))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        let field = |name: &str| format!("elements[{}].{name}", self.symbol);

        if self.symbol.trim().is_empty() {
            return Err(ConfigurationError::invalid(
                "elements[].symbol",
                "must not be empty",
            ));
        }
        if !self.initial_mass.is_finite() || self.initial_mass < 0.0 {
            return Err(ConfigurationError::invalid(
                field("initial_mass"),
                "must be finite and non-negative",
            ));
        }
        match self.solar_mass_fraction() {
            None => return Err(ConfigurationError::unbound(field("solar_mass_fraction"))),
            Some(fraction) if !(fraction.is_finite() && fraction > 0.0 && fraction < 1.0) => {
                return Err(ConfigurationError::invalid(
                    field("solar_mass_fraction"),
                    "must lie in (0, 1)",
                ));
            }
            Some(_) => {}
        }

        if self.ccsne.is_none() {
            return Err(ConfigurationError::unbound(field("ccsne")));
        }
        if self.sneia.is_none() {
            return Err(ConfigurationError::unbound(field("sneia")));
        }
        if self.agb.is_none() {
            return Err(ConfigurationError::unbound(field("agb")));
        }

        let Entrainment { ccsne, sneia, agb } = self.entrainment;
        for (name, fraction) in [("ccsne", ccsne), ("sneia", sneia), ("agb", agb)] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigurationError::invalid(
                    field(&format!("entrainment.{name}")),
                    "must lie in [0, 1]",
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for ElementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |is_bound: bool| if is_bound { "bound" } else { "unbound" };

        f.debug_struct("ElementConfig")
            .field("symbol", &self.symbol)
            .field("initial_mass", &self.initial_mass)
            .field("solar_mass_fraction", &self.solar_mass_fraction)
            .field("ccsne", &bound(self.ccsne.is_some()))
            .field("sneia", &bound(self.sneia.is_some()))
            .field("agb", &bound(self.agb.is_some()))
            .field("entrainment", &self.entrainment)
            .field("inflow_abundance", &bound(self.inflow_abundance.is_some()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solar_reference_falls_back_to_the_table() {
        let oxygen = ElementConfig::new("O");
        assert_eq!(oxygen.solar_mass_fraction(), solar::mass_fraction("O"));

        let custom = ElementConfig::new("O").with_solar_mass_fraction(0.006);
        assert_eq!(custom.solar_mass_fraction(), Some(0.006));

        assert_eq!(ElementConfig::new("Xe").solar_mass_fraction(), None);
    }

    #[test]
    fn every_yield_must_be_bound() {
        let element = ElementConfig::new("Fe")
            .with_ccsne_yield(Constant(0.0012))
            .with_agb_yield(|_m: f64, _z: f64| 0.0);

        assert_eq!(
            element.validate(),
            Err(ConfigurationError::unbound("elements[Fe].sneia")),
        );
        assert!(element.with_sneia_yield(Constant(0.0017)).validate().is_ok());
    }

    #[test]
    fn entrainment_outside_unit_interval_is_rejected() {
        let element = ElementConfig::new("Mg")
            .with_constant_yields(0.0006, 0.0, 0.0)
            .with_entrainment(Entrainment {
                agb: 1.2,
                ..Entrainment::default()
            });

        let error = element.validate().unwrap_err();
        assert_eq!(error.field(), "elements[Mg].entrainment.agb");
    }

    #[test]
    fn unknown_species_need_an_explicit_solar_reference() {
        let element = ElementConfig::new("Eu").with_constant_yields(1e-10, 0.0, 0.0);
        assert_eq!(
            element.validate(),
            Err(ConfigurationError::unbound("elements[Eu].solar_mass_fraction")),
        );
        assert!(
            element
                .with_solar_mass_fraction(3.7e-10)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn debug_reports_binding_state() {
        let debug = format!("{:?}", ElementConfig::new("N").with_ccsne_yield(Constant(1e-4)));
        assert!(debug.contains(r#"ccsne: "bound""#));
        assert!(debug.contains(r#"sneia: "unbound""#));
    }
}
