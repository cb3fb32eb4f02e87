use log::{Level, log, log_enabled};
use onezone_core::Observer;

use crate::traits::HasSnapshot;

/// Logs the state of a zone every `interval` steps.
///
/// Each record carries the time, the gas mass, the star formation rate and
/// `[X/H]` of every tracked element. Clamp diagnostics, which the zone itself
/// reports at `warn`, are repeated at `debug` with their step number. Never
/// requests an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogObserver {
    interval: usize,
    level: Level,
}

impl LogObserver {
    /// Logs at `info` every `interval` steps; an interval of zero logs every
    /// step.
    #[must_use]
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            level: Level::Info,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn interval(&self) -> usize {
        self.interval
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(100)
    }
}

impl<E: HasSnapshot, A> Observer<E, A> for LogObserver {
    fn observe(&mut self, event: &E) -> Option<A> {
        let snapshot = event.snapshot();

        for diagnostic in &snapshot.diagnostics {
            log::debug!("step {}: {diagnostic:?}", snapshot.step);
        }

        if snapshot.step % self.interval == 0 && log_enabled!(self.level) {
            let abundances = snapshot
                .elements
                .iter()
                .map(|element| match element.abundance {
                    Some(abundance) => format!("[{}/H] = {abundance:.3}", element.symbol),
                    None => format!("[{}/H] undefined", element.symbol),
                })
                .collect::<Vec<_>>()
                .join(", ");

            log!(
                self.level,
                "t = {:.3} Gyr: gas {:.4e} Msun, SFR {:.4} Msun/yr, {abundances}",
                snapshot.time,
                snapshot.gas_mass,
                snapshot.star_formation_rate,
            );
        }

        None
    }
}
