/// Receives events from a solver and optionally returns a control action.
///
/// The unit type `()` is the no-op observer, and any
/// `FnMut(&E) -> Option<A>` closure is an observer.
pub trait Observer<E, A> {
    /// Observes an event, returning an action to steer the solver.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
