/// Watches a run step by step and may steer it.
///
/// An integrator hands every event it emits to its observer. Returning
/// `Some(action)` asks for an integrator-specific action, such as stopping
/// early; `None` lets the run continue. Logging, progress reporting, early
/// stopping and collecting extra time series all live in observers, so the
/// integrator itself stays free of them.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer, and `()` is the
/// observer that never acts.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
