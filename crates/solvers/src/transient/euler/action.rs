/// Control actions an observer may return to the Euler master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// End the simulation after the observed step.
    ///
    /// The session finishes with [`Status::StoppedByObserver`](super::Status).
    StopEarly,
}
