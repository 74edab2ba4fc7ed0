//! Bounded, newest-first notification queue.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of notifications kept on the bell panel.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 5;

/// Queue-unique notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Urgent,
    Success,
    Info,
}

/// A system message shown on the bell panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    /// `HH:MM:SS` label of when it was raised.
    pub timestamp: String,
    pub read: bool,
}

/// Fixed-capacity queue; index 0 is always the newest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
    capacity: usize,
    next_id: u64,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl NotificationQueue {
    /// An empty queue holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier the next pushed notification will carry.
    pub(crate) fn next_id(&self) -> NotificationId {
        NotificationId(self.next_id)
    }

    /// Prepend `notification`, evicting the oldest beyond capacity.
    pub(crate) fn push(&mut self, notification: Notification) {
        self.next_id = self.next_id.max(notification.id.0 + 1);
        self.entries.push_front(notification);
        self.entries.truncate(self.capacity);
    }

    /// Change capacity, dropping the oldest entries if it shrank.
    pub(crate) fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.entries.truncate(self.capacity);
    }

    pub(crate) fn mark_all_read(&mut self) {
        for n in &mut self.entries {
            n.read = true;
        }
    }

    pub fn unread(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> + Clone {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(queue: &NotificationQueue, message: &str) -> Notification {
        Notification {
            id: queue.next_id(),
            kind: NotificationKind::Info,
            message: message.into(),
            timestamp: "10:00:00".into(),
            read: false,
        }
    }

    #[test]
    fn never_exceeds_capacity_and_is_newest_first() {
        let mut q = NotificationQueue::default();
        for i in 0..8 {
            let n = note(&q, &format!("m{i}"));
            q.push(n);
            assert!(q.len() <= DEFAULT_NOTIFICATION_CAPACITY);
        }
        let messages: Vec<_> = q.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["m7", "m6", "m5", "m4", "m3"]);
        let ids: Vec<_> = q.iter().map(|n| n.id.0).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn shrinking_drops_oldest() {
        let mut q = NotificationQueue::with_capacity(4);
        for i in 0..4 {
            let n = note(&q, &format!("m{i}"));
            q.push(n);
        }
        q.resize(2);
        let messages: Vec<_> = q.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["m3", "m2"]);
    }

    #[test]
    fn mark_all_read_clears_unread() {
        let mut q = NotificationQueue::default();
        let n = note(&q, "a");
        q.push(n);
        let n = note(&q, "b");
        q.push(n);
        assert_eq!(q.unread(), 2);
        q.mark_all_read();
        assert_eq!(q.unread(), 0);
    }
}
