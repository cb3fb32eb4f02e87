/// Control actions an observer can request from a running zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the run after the current step. It can be resumed later.
    StopEarly,
}
