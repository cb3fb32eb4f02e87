use crate::solar;

/// The discretized timeline of a run, in Gyr.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Deserialize, serde::Serialize))]
pub struct Timeline {
    /// Simulated time of the initial state.
    pub start: f64,

    /// Simulated time at which the run is finalized.
    pub end: f64,

    /// Fixed step size.
    pub step: f64,
}

impl Timeline {
    /// Most steps a validated timeline may take.
    ///
    /// Every step sums over all earlier populations, so the work of a run
    /// grows with the square of its length.
    pub const MAX_STEPS: usize = 1_000_000;

    /// Creates a timeline; the values are checked when the model is validated.
    #[must_use]
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Returns the number of steps a run takes.
    ///
    /// A run is finalized at the first step whose time lies within half a
    /// step of `end` or beyond it, so this is the smallest `n >= 1` with
    /// `start + n·step >= end - step / 2`. Counts beyond what `usize` holds
    /// saturate; validation rejects any count above [`Self::MAX_STEPS`].
    #[must_use]
    pub fn steps(&self) -> usize {
        let exact = (self.end - self.start) / self.step - 0.5;
        if exact.is_finite() && exact > 1.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let steps = exact.ceil() as usize;
            steps
        } else {
            1
        }
    }

    /// Returns the simulated time after `step` steps.
    #[must_use]
    pub fn time_at(&self, step: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let elapsed = step as f64 * self.step;
        self.start + elapsed
    }
}

/// How stars return mass to the ISM when they die.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde-derive", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Recycling {
    /// A fixed fraction of the mass of each stellar population is returned in
    /// the step the population forms.
    Instantaneous { fraction: f64 },

    /// Mass is returned as stars leave the main sequence, following the
    /// cumulative return fraction of the IMF.
    #[default]
    Continuous,
}

/// Delay-time distribution of Type Ia supernovae, in Gyr.
///
/// The rate is zero before the minimum delay and normalized to unit integral
/// over the first 15 Gyr.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde-derive", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DelayTimeDistribution {
    /// `R(t) ∝ t^slope`.
    PowerLaw { slope: f64 },

    /// `R(t) ∝ exp(-t / timescale)`.
    Exponential { timescale: f64 },
}

impl Default for DelayTimeDistribution {
    fn default() -> Self {
        Self::PowerLaw { slope: -1.1 }
    }
}

/// Plain-data parameters of a one-zone model.
///
/// Every field has a default, so a partial description deserializes cleanly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct Parameters {
    /// Gas mass at the start of the run, in Msun.
    pub initial_gas_mass: f64,

    /// Mass fraction of the ISM in hydrogen, used for `[X/H]`. Defaults to
    /// the solar value, so gas of solar composition has `[X/H] = 0`.
    pub hydrogen_fraction: f64,

    /// Return of stellar envelopes to the ISM.
    pub recycling: Recycling,

    /// Type Ia supernova delay-time distribution.
    pub delay_time_distribution: DelayTimeDistribution,

    /// Minimum Type Ia supernova delay, in Gyr.
    pub ia_minimum_delay: f64,

    /// Lowest stellar mass formed, in Msun.
    pub lower_stellar_mass: f64,

    /// Highest stellar mass formed, in Msun.
    pub upper_stellar_mass: f64,

    /// Highest mass of a star that ends its life on the AGB, in Msun.
    pub agb_upper_mass: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            initial_gas_mass: 6e9,
            hydrogen_fraction: solar::HYDROGEN,
            recycling: Recycling::default(),
            delay_time_distribution: DelayTimeDistribution::default(),
            ia_minimum_delay: 0.15,
            lower_stellar_mass: 0.08,
            upper_stellar_mass: 100.0,
            agb_upper_mass: 8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_absorbs_round_off() {
        assert_eq!(Timeline::new(0.0, 1.0, 0.01).steps(), 100);
        assert_eq!(Timeline::new(0.0, 10.0, 0.01).steps(), 1000);
        assert_eq!(Timeline::new(0.0, 0.3, 0.1).steps(), 3);
        assert_eq!(Timeline::new(2.0, 3.0, 0.25).steps(), 4);
    }

    #[test]
    fn short_timelines_take_one_step() {
        assert_eq!(Timeline::new(0.0, 0.004, 0.01).steps(), 1);
        assert_eq!(Timeline::new(0.0, 0.014, 0.01).steps(), 1);
        assert_eq!(Timeline::new(0.0, 0.016, 0.01).steps(), 2);
    }

    #[test]
    fn last_step_lands_within_half_a_step_of_the_end() {
        for timeline in [
            Timeline::new(0.0, 1.0, 0.01),
            Timeline::new(0.0, 0.37, 0.1),
            Timeline::new(1.5, 13.2, 0.05),
        ] {
            let n = timeline.steps();
            let half = 0.5 * timeline.step;
            assert!(timeline.time_at(n) >= timeline.end - half);
            assert!(timeline.time_at(n - 1) < timeline.end - half);
        }
    }

    #[cfg(feature = "serde-derive")]
    #[test]
    fn partial_parameters_deserialize_with_defaults() {
        let parameters: Parameters = serde_json::from_str(
            r#"{
                "initial_gas_mass": 0.0,
                "recycling": { "kind": "instantaneous", "fraction": 0.4 },
                "delay_time_distribution": { "kind": "exponential", "timescale": 1.5 }
            }"#,
        )
        .unwrap();

        assert_eq!(parameters.initial_gas_mass, 0.0);
        assert_eq!(parameters.recycling, Recycling::Instantaneous { fraction: 0.4 });
        assert_eq!(
            parameters.delay_time_distribution,
            DelayTimeDistribution::Exponential { timescale: 1.5 }
        );
        assert_eq!(parameters.hydrogen_fraction, Parameters::default().hydrogen_fraction);
    }

    #[cfg(feature = "serde-derive")]
    #[test]
    fn timeline_deserializes() {
        let timeline: Timeline =
            serde_json::from_str(r#"{ "start": 0.0, "end": 13.2, "step": 0.01 }"#).unwrap();
        assert_eq!(timeline, Timeline::new(0.0, 13.2, 0.01));
    }
}
