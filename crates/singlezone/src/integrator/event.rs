use super::Snapshot;

/// Event emitted by [`SingleZone::run`](super::SingleZone::run) for each
/// snapshot.
///
/// Step 0 is the initial state, emitted once when the run starts.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    pub step: usize,
    pub snapshot: &'a Snapshot,
}
