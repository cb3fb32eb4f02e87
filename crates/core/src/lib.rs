//! Core traits and types for one-zone chemical evolution models.
//!
//! This crate defines the shared abstractions the integrator and its
//! observers build on:
//!
//! - [`Callback1`], [`Callback2`]: real functions of one or two arguments
//!   that supply every physical rate law (IMF, star formation efficiency,
//!   inflow, outflow mass loading, yields)
//! - [`imf`]: the built-in Salpeter (1955) and Kroupa (2001) initial mass
//!   functions, usable anywhere a one-argument callback is expected
//! - [`DomainError`], [`EvaluationError`]: the failures a callback can report
//! - [`Observer`]: receives integrator events and optionally returns control
//!   actions
//! - [`quadrature`]: log-space Simpson integration over stellar mass

mod callback;
mod error;
mod observer;

pub mod imf;
pub mod quadrature;

pub use callback::{Callback1, Callback2, Constant, Fallible, Foreign1, Foreign2, ForeignFn1, ForeignFn2};
pub use error::{Args, DomainError, EvaluationError};
pub use imf::Imf;
pub use observer::Observer;
