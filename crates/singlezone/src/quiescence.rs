//! Checks of the quiescent limit.
//!
//! When the star formation efficiency is zero everywhere it is evaluated, no
//! stars form, so nothing flows out, nothing is recycled and no element is
//! produced or consumed. The integrator keeps these quantities at exactly
//! zero rather than approximately zero; [`check`] verifies that bit for bit
//! on every recorded snapshot.

use thiserror::Error;

use crate::SingleZone;

/// A snapshot that departs from the quiescent limit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuiescenceViolation {
    #[error("star formation rate is {value} at step {step}")]
    StarFormation { step: usize, value: f64 },

    #[error("outflow rate is {value} at step {step}")]
    Outflow { step: usize, value: f64 },

    #[error("recycling rate is {value} at step {step}")]
    Recycling { step: usize, value: f64 },

    #[error("{symbol} has {value} Msun of unretained production at step {step}")]
    Unretained {
        step: usize,
        symbol: String,
        value: f64,
    },

    #[error("{symbol} mass changed from {initial} to {value} Msun at step {step}")]
    ElementMass {
        step: usize,
        symbol: String,
        initial: f64,
        value: f64,
    },

    #[error("[{symbol}/H] is {value:?} at step {step} instead of -inf")]
    Abundance {
        step: usize,
        symbol: String,
        value: Option<f64>,
    },
}

/// Verifies that every snapshot recorded by `zone` is quiescent.
///
/// # Errors
///
/// Returns the first violation found, scanning snapshots in order.
pub fn check(zone: &SingleZone) -> Result<(), QuiescenceViolation> {
    let initial: Vec<f64> = zone.elements().iter().map(|e| e.initial_mass()).collect();

    for snapshot in zone.history() {
        let step = snapshot.step;

        if snapshot.star_formation_rate != 0.0 {
            return Err(QuiescenceViolation::StarFormation {
                step,
                value: snapshot.star_formation_rate,
            });
        }
        if snapshot.outflow_rate != 0.0 {
            return Err(QuiescenceViolation::Outflow {
                step,
                value: snapshot.outflow_rate,
            });
        }
        if snapshot.recycling_rate != 0.0 {
            return Err(QuiescenceViolation::Recycling {
                step,
                value: snapshot.recycling_rate,
            });
        }

        for (state, &initial) in snapshot.elements.iter().zip(&initial) {
            if state.unretained != 0.0 {
                return Err(QuiescenceViolation::Unretained {
                    step,
                    symbol: state.symbol.clone(),
                    value: state.unretained,
                });
            }
            #[allow(clippy::float_cmp)]
            if state.mass != initial {
                return Err(QuiescenceViolation::ElementMass {
                    step,
                    symbol: state.symbol.clone(),
                    initial,
                    value: state.mass,
                });
            }
            if initial == 0.0 && state.abundance != Some(f64::NEG_INFINITY) {
                return Err(QuiescenceViolation::Abundance {
                    step,
                    symbol: state.symbol.clone(),
                    value: state.abundance,
                });
            }
        }
    }

    Ok(())
}
