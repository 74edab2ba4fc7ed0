//! Rolling activity samples feeding the live line chart.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of samples kept in the window.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// One sample of ledger size taken on a simulator tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    /// `HH:MM:SS` label of the tick.
    pub time: String,
    pub total_requests: usize,
    pub completed_requests: usize,
}

/// Fixed-capacity buffer: newest appended at the back, oldest evicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindow {
    points: VecDeque<ActivityPoint>,
    capacity: usize,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_SIZE)
    }
}

impl RollingWindow {
    /// An empty window of `capacity` samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn push(&mut self, point: ActivityPoint) {
        self.points.push_back(point);
        self.evict();
    }

    pub(crate) fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    fn evict(&mut self) {
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Oldest first, in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &ActivityPoint> + Clone {
        self.points.iter()
    }
}
