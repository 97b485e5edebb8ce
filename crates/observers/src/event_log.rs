use log::Level;
use strand_core::Observer;
use strand_solvers::transient::euler::Event;

/// Logs each step of the Euler master that handled an event.
///
/// Steps without events are logged at `trace` level only. The observer never
/// returns an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLog {
    level: Level,
    logged: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl EventLog {
    /// Creates a log that reports events at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level, logged: 0 }
    }

    /// Number of steps logged so far.
    #[must_use]
    pub fn logged(&self) -> usize {
        self.logged
    }
}

impl<A> Observer<Event<'_>, A> for EventLog {
    fn observe(&mut self, event: &Event<'_>) -> Option<A> {
        if !event.has_event() {
            log::trace!("step {} at t={}", event.step, event.time);
            return None;
        }
        self.logged += 1;

        let kinds = [
            (event.time_event, "time"),
            (event.state_event, "state"),
            (event.step_event, "step"),
        ]
        .into_iter()
        .filter_map(|(fired, kind)| fired.then_some(kind))
        .collect::<Vec<_>>()
        .join("+");

        log::log!(
            self.level,
            "step {} at t={}: {kinds} event, states {:?}",
            event.step,
            event.time,
            event.states
        );
        for (index, crossing) in event.crossings() {
            log::log!(self.level, "  z[{index}] {crossing}");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use strand_models::{BouncingBall, Ticker};
    use strand_solvers::transient::euler::{self, Action, Config};

    use super::*;

    #[test]
    fn counts_event_steps() {
        let model = BouncingBall::default();
        let description = model.description().unwrap();
        let mut log = EventLog::default();

        let solution = euler::solve(
            &model,
            &description,
            Config::default(),
            |event: &Event<'_>| -> Option<Action> { log.observe(event) },
        )
        .unwrap();

        assert_eq!(log.logged(), solution.counters.state_events);
        assert!(log.logged() > 0);
    }

    #[test]
    fn counts_time_events() {
        let model = Ticker::new(0.5);
        let description = model.description().unwrap();
        let config = Config::new(0.0, 2.0, 0.1).unwrap();
        let mut log = EventLog::new(Level::Debug);

        euler::solve(
            &model,
            &description,
            config,
            |event: &Event<'_>| -> Option<Action> { log.observe(event) },
        )
        .unwrap();

        assert_eq!(log.logged(), 4);
    }
}
