//! Reusable observers for one-zone runs.
//!
//! This crate provides [`Observer`] implementations and the capability traits
//! they are written against.
//!
//! # Modules
//!
//! - [`traits`]: capability traits ([`HasSnapshot`], [`CanStopEarly`])
//! - [`LogObserver`]: reports progress through the `log` facade
//! - [`StopOnGasDepletion`]: stops a run once its gas reservoir is spent
//!
//! [`Observer`]: onezone_core::Observer
//! [`HasSnapshot`]: traits::HasSnapshot
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod log_observer;
mod stop;

pub use log_observer::LogObserver;
pub use stop::StopOnGasDepletion;
