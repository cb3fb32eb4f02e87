//! A one-zone galactic chemical evolution integrator.
//!
//! A single well-mixed reservoir of gas forms stars, receives inflow, loses
//! gas to outflow and gets enriched by core-collapse supernovae, Type Ia
//! supernovae and asymptotic giant branch stars. [`SingleZone`] advances the
//! gas mass and the mass of every tracked element on a fixed timestep.
//!
//! Units throughout: time in Gyr, masses in Msun, rates in Msun/yr.
//!
//! # Example
//!
//! ```
//! use onezone_core::{Constant, Imf};
//! use onezone_singlezone::{Config, ElementConfig, Parameters, SingleZone, Timeline};
//!
//! let config = Config::new(Timeline::new(0.0, 1.0, 0.01))
//!     .with_parameters(Parameters {
//!         initial_gas_mass: 0.0,
//!         ..Parameters::default()
//!     })
//!     .with_imf(Imf::Kroupa)
//!     .with_star_formation_efficiency(Constant(0.0))
//!     .with_inflow(Constant(5.0))
//!     .with_mass_loading(Constant(2.0))
//!     .with_element(ElementConfig::new("O").with_constant_yields(0.015, 0.0, 0.0));
//!
//! let mut zone = SingleZone::new(config);
//! zone.run_unobserved()?;
//!
//! let last = zone.latest().expect("a finished run has snapshots");
//! assert!((last.gas_mass - 5e9).abs() < 1.0);
//! assert_eq!(last.elements[0].mass, 0.0);
//! # Ok::<(), onezone_singlezone::Error>(())
//! ```

mod config;
mod diagnostic;
mod element;
mod error;
mod integrator;
mod ism;

pub mod population;
pub mod quiescence;
pub mod solar;

pub use config::{
    Config, ConfigurationError, DelayTimeDistribution, ElementConfig, Entrainment, Parameters,
    Recycling, Timeline,
};
pub use diagnostic::Diagnostic;
pub use element::{Element, Ledger, MassUpdate, Sources};
pub use error::Error;
pub use integrator::{
    Action, ElementState, Event, MassBudget, Phase, SingleZone, Snapshot, Status,
};
pub use ism::{GasStep, Ism};

/// Years per Gyr, converting `rate × dt` into a mass.
pub const YEARS_PER_GYR: f64 = 1e9;
