//! Aggregate trait: the decide/fold contract every state owner follows.

use crate::command::CommandContext;

/// A state owner whose mutations are expressed as events.
///
/// The implementing type itself serves as the state. Mutations are split in
/// two: [`handle`](Aggregate::handle) decides which events a command
/// produces, [`apply`](Aggregate::apply) folds one event into the state.
///
/// # Contract
///
/// - `handle` must be a pure decision function: no I/O, no side effects.
///   It validates a command against the current state and returns zero or
///   more events, or rejects the command with `Self::Error`. Rejection
///   leaves the state untouched.
/// - `apply` must be a total function. Events produced by `handle` are
///   always valid against the state they were decided on.
pub trait Aggregate: Default + Clone + Send + 'static {
    /// The set of commands this aggregate can handle.
    type Command: Send + 'static;

    /// The set of events this aggregate can produce and apply.
    type DomainEvent: Clone + Send + 'static;

    /// Command rejection error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Validate a command against the current state and produce events.
    fn handle(
        &self,
        cmd: Self::Command,
        ctx: &CommandContext,
    ) -> Result<Vec<Self::DomainEvent>, Self::Error>;

    /// Apply a single event to produce the next state.
    fn apply(self, event: &Self::DomainEvent) -> Self;

    /// Decide and fold in one step.
    ///
    /// Returns the events that were applied. On rejection the state is
    /// left exactly as it was.
    fn execute(
        &mut self,
        cmd: Self::Command,
        ctx: &CommandContext,
    ) -> Result<Vec<Self::DomainEvent>, Self::Error> {
        let events = self.handle(cmd, ctx)?;
        if !events.is_empty() {
            let state = std::mem::take(self);
            *self = events.iter().fold(state, |s, e| s.apply(e));
        }
        Ok(events)
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::Aggregate;
    use crate::command::CommandContext;

    /// Minimal aggregate for exercising the mailbox without dashboard state.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub(crate) struct Counter {
        pub value: u64,
    }

    pub(crate) enum CounterCommand {
        Increment,
        Decrement,
        Add(u64),
        Nothing,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum CounterEvent {
        Incremented,
        Decremented,
        Added { amount: u64 },
    }

    #[derive(Debug, thiserror::Error)]
    pub(crate) enum CounterError {
        #[error("cannot decrement: counter is already zero")]
        AlreadyZero,
    }

    impl Aggregate for Counter {
        type Command = CounterCommand;
        type DomainEvent = CounterEvent;
        type Error = CounterError;

        fn handle(
            &self,
            cmd: CounterCommand,
            _ctx: &CommandContext,
        ) -> Result<Vec<CounterEvent>, CounterError> {
            match cmd {
                CounterCommand::Increment => Ok(vec![CounterEvent::Incremented]),
                CounterCommand::Decrement => {
                    if self.value == 0 {
                        return Err(CounterError::AlreadyZero);
                    }
                    Ok(vec![CounterEvent::Decremented])
                }
                CounterCommand::Add(n) => Ok(vec![CounterEvent::Added { amount: n }]),
                CounterCommand::Nothing => Ok(vec![]),
            }
        }

        fn apply(mut self, event: &CounterEvent) -> Self {
            match event {
                CounterEvent::Incremented => self.value += 1,
                CounterEvent::Decremented => self.value -= 1,
                CounterEvent::Added { amount } => self.value += amount,
            }
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Aggregate;
    use super::test_fixtures::{Counter, CounterCommand, CounterError, CounterEvent};
    use crate::command::CommandContext;

    #[test]
    fn execute_folds_every_event() {
        let mut counter = Counter::default();
        let ctx = CommandContext::default();
        counter.execute(CounterCommand::Increment, &ctx).unwrap();
        let events = counter.execute(CounterCommand::Add(5), &ctx).unwrap();
        assert_eq!(events, vec![CounterEvent::Added { amount: 5 }]);
        assert_eq!(counter.value, 6);
    }

    #[test]
    fn rejection_leaves_state_alone() {
        let mut counter = Counter::default();
        let err = counter
            .execute(CounterCommand::Decrement, &CommandContext::default())
            .unwrap_err();
        assert!(matches!(err, CounterError::AlreadyZero));
        assert_eq!(counter, Counter::default());
    }

    #[test]
    fn apply_decremented() {
        let counter = Counter { value: 3 }.apply(&CounterEvent::Decremented);
        assert_eq!(counter.value, 2);
    }
}
