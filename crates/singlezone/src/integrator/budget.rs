/// Cumulative gas mass moved by each channel over a run, in Msun.
///
/// Gas is only created or destroyed through these channels, so
/// [`residual`](Self::residual) stays at round-off level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub struct MassBudget {
    /// Gas mass at the start of the run.
    pub initial: f64,

    pub inflow: f64,
    pub outflow: f64,

    /// Mass turned into stars.
    pub formed: f64,

    /// Mass returned to the gas by dying stars.
    pub returned: f64,

    /// Round-off added back when a limited step left the gas just below
    /// zero.
    pub clamped: f64,
}

impl MassBudget {
    #[must_use]
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    /// Returns the mass unaccounted for by the channels, given the current
    /// gas mass.
    #[must_use]
    pub fn residual(&self, gas_mass: f64) -> f64 {
        let stars = self.formed - self.returned;
        let supplied = self.initial + self.inflow - self.outflow + self.clamped;
        gas_mass + stars - supplied
    }
}
