//! Change-feed subscriptions.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A live registration of an `on_change` callback.
///
/// The callback runs on a tokio task after every state change. Changes that
/// land while a callback is still running coalesce into one further call.
/// Delivery stops on [`unsubscribe`](Subscription::unsubscribe), on drop, or
/// once the store's actor exits.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn spawn<F>(mut changes: watch::Receiver<u64>, on_change: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        // Only changes after registration are reported.
        changes.mark_unchanged();
        let task = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                on_change();
            }
        });
        Self { task }
    }

    /// Stop delivery. No callback starts after this returns.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    /// Whether the callback task is still waiting for changes.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
