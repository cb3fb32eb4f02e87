/// Indicates how a call to [`SingleZone::run`](super::SingleZone::run) returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The run reached its end time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}
