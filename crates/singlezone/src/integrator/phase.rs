use std::fmt;

/// Lifecycle of a [`SingleZone`](super::SingleZone).
///
/// ```text
/// Constructed --validate--> Validated --advance--> Running --advance--> Finalized
/// ```
///
/// A run is finalized once its time reaches the end of the timeline, or as
/// soon as a rate law fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Constructed,
    Validated,
    Running,
    Finalized,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constructed => "constructed",
            Self::Validated => "validated",
            Self::Running => "running",
            Self::Finalized => "finalized",
        })
    }
}
