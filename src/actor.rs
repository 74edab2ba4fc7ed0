//! Mailbox actor that owns an aggregate and serializes every mutation.
//!
//! The actor runs as a tokio task and processes messages from an `mpsc`
//! channel one at a time. It exclusively owns the aggregate state, stamps
//! each command with the injected [`Clock`], and bumps a `watch` version
//! counter whenever a command produced events.
//!
//! Public API: [`AggregateHandle`] (cloneable async handle) and
//! [`spawn_actor`] (starts the task).

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::aggregate::Aggregate;
use crate::clock::Clock;
use crate::command::CommandContext;
use crate::error::{ExecuteError, StateError};

/// Bound on queued messages before senders wait.
const MAILBOX_CAPACITY: usize = 32;

/// Result type sent back through the `Execute` reply channel.
type ExecuteResult<A> =
    Result<Vec<<A as Aggregate>::DomainEvent>, ExecuteError<<A as Aggregate>::Error>>;

/// A read closure run against the state inside the actor.
type ReadFn<A> = Box<dyn FnOnce(&A) + Send>;

/// Messages sent from `AggregateHandle` to the actor loop.
pub(crate) enum ActorMessage<A: Aggregate> {
    /// Execute a command against the aggregate.
    Execute {
        cmd: A::Command,
        /// Who issued the command; copied into the [`CommandContext`].
        actor: String,
        reply: oneshot::Sender<ExecuteResult<A>>,
    },

    /// Run a read against the current state. The closure owns its reply
    /// channel.
    Read(ReadFn<A>),

    /// Stop the loop after the messages queued ahead of this one.
    Shutdown,
}

/// Runs the aggregate actor loop.
///
/// Exits when the channel closes (all handles dropped) or a `Shutdown`
/// message is received. Dropping `version` on exit closes every change
/// subscription.
async fn run_actor<A: Aggregate>(
    mut state: A,
    mut rx: mpsc::Receiver<ActorMessage<A>>,
    clock: Arc<dyn Clock>,
    version: watch::Sender<u64>,
) {
    while let Some(msg) = rx.recv().await {
        match msg {
            ActorMessage::Execute { cmd, actor, reply } => {
                let ctx = CommandContext::at(clock.now()).with_actor(actor);
                let result = execute_command(&mut state, cmd, &ctx);
                if matches!(&result, Ok(events) if !events.is_empty()) {
                    version.send_modify(|v| *v = v.wrapping_add(1));
                }
                // If the receiver was dropped, the caller no longer cares
                // about the result.
                let _ = reply.send(result);
            }

            ActorMessage::Read(read) => read(&state),

            ActorMessage::Shutdown => break,
        }
    }
    tracing::debug!("actor stopped");
}

/// Decide and fold one command inside an `execute` span.
fn execute_command<A: Aggregate>(
    state: &mut A,
    cmd: A::Command,
    ctx: &CommandContext,
) -> ExecuteResult<A> {
    let _span = tracing::info_span!("execute", actor = ctx.actor.as_deref().unwrap_or("-"))
        .entered();
    let events = state.execute(cmd, ctx).map_err(ExecuteError::Domain)?;
    if !events.is_empty() {
        tracing::debug!(count = events.len(), "events applied");
    }
    Ok(events)
}

/// Async handle to a running aggregate actor.
///
/// Lightweight, cloneable, and `Send + Sync`. Communicates with the actor
/// task over a bounded channel.
pub struct AggregateHandle<A: Aggregate> {
    sender: mpsc::Sender<ActorMessage<A>>,
    changes: watch::Receiver<u64>,
}

// Manual `Clone`: only the channel ends are cloned, never `A`.
impl<A: Aggregate> Clone for AggregateHandle<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<A: Aggregate> std::fmt::Debug for AggregateHandle<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateHandle")
            .field("alive", &self.is_alive())
            .field("version", &*self.changes.borrow())
            .finish()
    }
}

impl<A: Aggregate> AggregateHandle<A> {
    /// Send a command to the aggregate and wait for the result.
    ///
    /// Returns the domain events produced by the command on success.
    ///
    /// # Errors
    ///
    /// * [`ExecuteError::Domain`] -- the aggregate rejected the command.
    /// * [`ExecuteError::ActorGone`] -- the actor task has exited.
    pub async fn execute(
        &self,
        cmd: A::Command,
        actor: impl Into<String>,
    ) -> Result<Vec<A::DomainEvent>, ExecuteError<A::Error>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ActorMessage::Execute {
                cmd,
                actor: actor.into(),
                reply: tx,
            })
            .await
            .map_err(|_| ExecuteError::ActorGone)?;
        rx.await.map_err(|_| ExecuteError::ActorGone)?
    }

    /// Run `f` against the current state and return its result.
    ///
    /// The read is queued behind every command sent before it, so it sees
    /// their effects.
    ///
    /// # Errors
    ///
    /// * [`StateError::ActorGone`] -- the actor task has exited.
    pub async fn read<R, F>(&self, f: F) -> Result<R, StateError>
    where
        R: Send + 'static,
        F: FnOnce(&A) -> R + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let read: ReadFn<A> = Box::new(move |state: &A| {
            let _ = tx.send(f(state));
        });
        self.sender
            .send(ActorMessage::Read(read))
            .await
            .map_err(|_| StateError::ActorGone)?;
        rx.await.map_err(|_| StateError::ActorGone)
    }

    /// A clone of the current aggregate state.
    ///
    /// # Errors
    ///
    /// * [`StateError::ActorGone`] -- the actor task has exited.
    pub async fn state(&self) -> Result<A, StateError> {
        self.read(A::clone).await
    }

    /// A receiver whose value increases after every command that produced
    /// events. It reports closed once the actor exits.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.clone()
    }

    /// Check whether the actor backing this handle is still running.
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Ask the actor to stop once the messages already queued are handled.
    pub(crate) async fn shutdown(&self) {
        let _ = self.sender.send(ActorMessage::Shutdown).await;
    }
}

/// Spawn an actor owning `initial` on the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_actor<A: Aggregate>(initial: A, clock: Arc<dyn Clock>) -> AggregateHandle<A> {
    let (tx, rx) = mpsc::channel::<ActorMessage<A>>(MAILBOX_CAPACITY);
    let (version_tx, version_rx) = watch::channel(0u64);
    tokio::spawn(run_actor(initial, rx, clock, version_tx));
    AggregateHandle {
        sender: tx,
        changes: version_rx,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::aggregate::test_fixtures::{Counter, CounterCommand, CounterError, CounterEvent};
    use crate::clock::{ManualClock, SystemClock};

    fn counter() -> AggregateHandle<Counter> {
        spawn_actor(Counter::default(), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn execute_increment_three_times() {
        let handle = counter();
        for _ in 0..3 {
            handle
                .execute(CounterCommand::Increment, "test")
                .await
                .expect("execute should succeed");
        }
        let state = handle.state().await.expect("state should succeed");
        assert_eq!(state.value, 3);
    }

    #[tokio::test]
    async fn execute_decrement_at_zero_returns_domain_error() {
        let handle = counter();
        let result = handle.execute(CounterCommand::Decrement, "test").await;
        assert!(
            matches!(result, Err(ExecuteError::Domain(CounterError::AlreadyZero))),
            "expected Domain(AlreadyZero), got: {result:?}"
        );
    }

    #[tokio::test]
    async fn execute_returns_produced_events() {
        let handle = counter();
        let events = handle
            .execute(CounterCommand::Add(4), "test")
            .await
            .expect("execute should succeed");
        assert_eq!(events, vec![CounterEvent::Added { amount: 4 }]);
    }

    #[tokio::test]
    async fn version_bumps_only_when_events_are_produced() {
        let handle = counter();
        let changes = handle.changes();
        handle.execute(CounterCommand::Nothing, "test").await.unwrap();
        assert_eq!(*changes.borrow(), 0);
        let _ = handle.execute(CounterCommand::Decrement, "test").await;
        assert_eq!(*changes.borrow(), 0);
        handle.execute(CounterCommand::Increment, "test").await.unwrap();
        assert_eq!(*changes.borrow(), 1);
    }

    #[tokio::test]
    async fn read_sees_queued_commands() {
        let handle = counter();
        handle.execute(CounterCommand::Add(7), "test").await.unwrap();
        let doubled = handle.read(|c| c.value * 2).await.unwrap();
        assert_eq!(doubled, 14);
    }

    #[tokio::test]
    async fn commands_are_stamped_from_the_clock() {
        // A one-off aggregate that records the context it was handed.
        #[derive(Debug, Clone, Default)]
        struct Stamp(Option<CommandContext>);

        impl Aggregate for Stamp {
            type Command = ();
            type DomainEvent = CommandContext;
            type Error = CounterError;

            fn handle(
                &self,
                _: (),
                ctx: &CommandContext,
            ) -> Result<Vec<CommandContext>, CounterError> {
                Ok(vec![ctx.clone()])
            }

            fn apply(self, event: &CommandContext) -> Self {
                Stamp(Some(event.clone()))
            }
        }

        let now = Utc.with_ymd_and_hms(2026, 3, 9, 6, 30, 0).unwrap();
        let handle = spawn_actor(Stamp::default(), Arc::new(ManualClock::new(now)));
        handle.execute((), "operator").await.unwrap();
        let ctx = handle.read(|s| s.0.clone()).await.unwrap().unwrap();
        assert_eq!(ctx.issued_at, now);
        assert_eq!(ctx.actor.as_deref(), Some("operator"));
    }

    #[tokio::test]
    async fn shutdown_stops_the_actor() {
        let handle = counter();
        let mut changes = handle.changes();
        handle.shutdown().await;
        // The version sender is dropped when the loop exits.
        assert!(changes.changed().await.is_err());
        assert!(!handle.is_alive());
        assert!(matches!(
            handle.execute(CounterCommand::Increment, "test").await,
            Err(ExecuteError::ActorGone)
        ));
        assert!(matches!(handle.state().await, Err(StateError::ActorGone)));
    }
}
