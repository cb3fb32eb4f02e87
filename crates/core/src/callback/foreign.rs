use std::ffi::c_void;

use crate::{
    Args, EvaluationError,
    error::{check_args, check_value},
};

use super::{Callback1, Callback2};

/// A one-argument function defined outside Rust.
///
/// The last parameter receives the opaque context handed to [`Foreign1::new`].
pub type ForeignFn1 = unsafe extern "C" fn(f64, *const c_void) -> f64;

/// A two-argument function defined outside Rust.
///
/// The last parameter receives the opaque context handed to [`Foreign2::new`].
pub type ForeignFn2 = unsafe extern "C" fn(f64, f64, *const c_void) -> f64;

/// Forwards evaluation to a foreign function with a bound context.
///
/// This is the bridge for rate laws owned by a front end, such as a function
/// object of an interpreted language: the front end passes a trampoline and a
/// pointer to its function object, and the integrator calls it like any other
/// [`Callback1`].
#[derive(Debug, Clone, Copy)]
pub struct Foreign1 {
    function: ForeignFn1,
    context: *const c_void,
}

/// Two-argument counterpart of [`Foreign1`].
#[derive(Debug, Clone, Copy)]
pub struct Foreign2 {
    function: ForeignFn2,
    context: *const c_void,
}

impl Foreign1 {
    /// Binds a foreign function to its context.
    ///
    /// # Safety
    ///
    /// - `function` must be safe to call with any finite argument and `context`.
    /// - `context` must stay valid for as long as this value or any copy of
    ///   it exists, and must not be mutated while it may be evaluated.
    /// - `function` must be safe to call from several threads at once.
    pub unsafe fn new(function: ForeignFn1, context: *const c_void) -> Self {
        Self { function, context }
    }
}

impl Foreign2 {
    /// Binds a foreign function to its context.
    ///
    /// # Safety
    ///
    /// Same contract as [`Foreign1::new`].
    pub unsafe fn new(function: ForeignFn2, context: *const c_void) -> Self {
        Self { function, context }
    }
}

// The constructors require the context to be immutable and thread safe.
unsafe impl Send for Foreign1 {}
unsafe impl Sync for Foreign1 {}
unsafe impl Send for Foreign2 {}
unsafe impl Sync for Foreign2 {}

impl Callback1 for Foreign1 {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        let args = Args::One(x);
        check_args(args)?;
        // SAFETY: upheld by the caller of `Foreign1::new`.
        let value = unsafe { (self.function)(x, self.context) };
        check_value(args, value)
    }
}

impl Callback2 for Foreign2 {
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationError> {
        let args = Args::Two(x, y);
        check_args(args)?;
        // SAFETY: upheld by the caller of `Foreign2::new`.
        let value = unsafe { (self.function)(x, y, self.context) };
        check_value(args, value)
    }
}
