use onezone_core::Observer;

use crate::traits::{CanStopEarly, HasSnapshot};

/// Stops a run once the gas mass falls to or below a threshold, in Msun.
///
/// The initial state is never checked, so a zone that starts without gas
/// still gets to accrete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopOnGasDepletion {
    pub threshold: f64,
}

impl StopOnGasDepletion {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for StopOnGasDepletion {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<E: HasSnapshot, A: CanStopEarly> Observer<E, A> for StopOnGasDepletion {
    fn observe(&mut self, event: &E) -> Option<A> {
        let snapshot = event.snapshot();
        if snapshot.step > 0 && snapshot.gas_mass <= self.threshold {
            log::debug!(
                "gas depleted to {:.4e} Msun at t = {:.3} Gyr",
                snapshot.gas_mass,
                snapshot.time
            );
            Some(A::stop_early())
        } else {
            None
        }
    }
}
