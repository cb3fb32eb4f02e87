use crate::Diagnostic;

/// State of one tracked species at a snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub struct ElementState {
    pub symbol: String,

    /// Mass in the ISM, in Msun.
    pub mass: f64,

    /// `[X/H]`, or `None` when it is undefined because the zone holds mass of
    /// the species but no hydrogen.
    pub abundance: Option<f64>,

    /// Production ejected without mixing during the step, in Msun.
    pub unretained: f64,
}

/// The state of a zone at the end of a step.
///
/// Rates are those that drove the step ending here, so they are all zero in
/// the initial snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub struct Snapshot {
    pub step: usize,

    /// Simulated time, in Gyr.
    pub time: f64,

    pub gas_mass: f64,
    pub star_formation_rate: f64,
    pub inflow_rate: f64,
    pub outflow_rate: f64,
    pub recycling_rate: f64,

    /// Mass in living stars and remnants.
    pub stellar_mass: f64,

    /// Mass fraction of the gas in tracked elements.
    pub metallicity: f64,

    /// One entry per tracked element, in configuration order.
    pub elements: Vec<ElementState>,

    /// Clamp events raised while computing the step.
    pub diagnostics: Vec<Diagnostic>,
}

impl Snapshot {
    /// Returns the state of the element with the given symbol.
    #[must_use]
    pub fn element(&self, symbol: &str) -> Option<&ElementState> {
        self.elements.iter().find(|element| element.symbol == symbol)
    }
}
