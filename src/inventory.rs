//! Resource inventory: per-type stock with conserved transfers.

use serde::{Deserialize, Serialize};

use crate::domain::request::JUST_NOW;
use crate::domain::resource::ResourceStock;
use crate::error::{DashboardError, Entity};

/// Direction of a stock transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transfer {
    /// available -> deployed
    Deploy,
    /// deployed -> available
    Restock,
}

/// Stock rows in seed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInventory {
    rows: Vec<ResourceStock>,
}

impl ResourceInventory {
    /// Add a seed row. Types are unique.
    ///
    /// The units of every row together must fit in a `u64`, so that row
    /// totals and inventory totals never overflow. Transfers keep the sum.
    pub(crate) fn insert(&mut self, stock: ResourceStock) -> Result<(), DashboardError> {
        if stock.resource_type.trim().is_empty() {
            return Err(DashboardError::validation("type", "must not be empty"));
        }
        if self.get(&stock.resource_type).is_some() {
            return Err(DashboardError::validation(
                "type",
                format!("resource '{}' is already stocked", stock.resource_type),
            ));
        }
        let units = stock
            .available
            .checked_add(stock.deployed)
            .and_then(|row| row.checked_add(self.total_units()));
        if units.is_none() {
            return Err(DashboardError::validation(
                "available",
                format!("stock of '{}' is too large to count", stock.resource_type),
            ));
        }
        self.rows.push(stock);
        Ok(())
    }

    fn total_units(&self) -> u64 {
        self.total_available() + self.total_deployed()
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceStock> {
        self.rows.iter().find(|r| r.resource_type == resource_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceStock> + Clone {
        self.rows.iter()
    }

    /// available / (available + deployed) for `resource_type`.
    pub fn ratio(&self, resource_type: &str) -> Result<f64, DashboardError> {
        self.require(resource_type).map(ResourceStock::ratio)
    }

    pub fn total_available(&self) -> u64 {
        self.rows.iter().map(|r| r.available).sum()
    }

    pub fn total_deployed(&self) -> u64 {
        self.rows.iter().map(|r| r.deployed).sum()
    }

    /// Check that `amount` units can move in `direction` without driving a
    /// counter negative.
    pub fn check_transfer(
        &self,
        resource_type: &str,
        amount: u64,
        direction: Transfer,
    ) -> Result<(), DashboardError> {
        let row = self.require(resource_type)?;
        if amount == 0 {
            return Err(DashboardError::validation("amount", "must be at least 1"));
        }
        let (source, label) = match direction {
            Transfer::Deploy => (row.available, "available"),
            Transfer::Restock => (row.deployed, "deployed"),
        };
        if amount > source {
            return Err(DashboardError::validation(
                "amount",
                format!("only {source} {label} units of '{resource_type}'"),
            ));
        }
        Ok(())
    }

    /// Move stock from available to deployed.
    pub fn deploy(&mut self, resource_type: &str, amount: u64) -> Result<(), DashboardError> {
        self.check_transfer(resource_type, amount, Transfer::Deploy)?;
        self.apply_transfer(resource_type, amount, Transfer::Deploy);
        Ok(())
    }

    /// Move stock from deployed back to available.
    pub fn restock(&mut self, resource_type: &str, amount: u64) -> Result<(), DashboardError> {
        self.check_transfer(resource_type, amount, Transfer::Restock)?;
        self.apply_transfer(resource_type, amount, Transfer::Restock);
        Ok(())
    }

    /// Apply a transfer that already passed [`check_transfer`](Self::check_transfer).
    pub(crate) fn apply_transfer(
        &mut self,
        resource_type: &str,
        amount: u64,
        direction: Transfer,
    ) {
        let Some(row) = self
            .rows
            .iter_mut()
            .find(|r| r.resource_type == resource_type)
        else {
            return;
        };
        match direction {
            Transfer::Deploy => {
                row.available = row.available.saturating_sub(amount);
                row.deployed += amount;
            }
            Transfer::Restock => {
                row.deployed = row.deployed.saturating_sub(amount);
                row.available += amount;
            }
        }
        row.last_updated = JUST_NOW.to_string();
    }

    fn require(&self, resource_type: &str) -> Result<&ResourceStock, DashboardError> {
        self.get(resource_type)
            .ok_or_else(|| DashboardError::not_found(Entity::Resource, resource_type))
    }
}
