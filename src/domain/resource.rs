//! Supply stock rows: available and deployed counters per resource type.

use serde::{Deserialize, Serialize};

/// Inventory of one supply type.
///
/// `available + deployed` only changes when a row is seeded; transfers
/// move units between the two counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStock {
    /// Unique key, e.g. "Medical Kits".
    #[serde(rename = "type")]
    pub resource_type: String,
    pub available: u64,
    pub deployed: u64,
    /// Where the stock is held.
    pub location: String,
    /// Relative label of the last transfer ("just now").
    pub last_updated: String,
}

impl ResourceStock {
    /// All units of this type, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.available.saturating_add(self.deployed)
    }

    /// Share of the stock still on hand, `0.0` for an empty row.
    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.available as f64 / total as f64,
        }
    }
}
