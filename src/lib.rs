//! State and event core for a disaster-relief coordination dashboard.
//!
//! [`Dashboard`] holds requests, volunteer teams, stock, notifications, and
//! the activity window as one synchronous aggregate. [`ReliefStore`] runs it
//! behind a mailbox actor with a change feed and a timer-driven simulator.

mod actor;
pub use actor::{AggregateHandle, spawn_actor};
mod aggregate;
pub use aggregate::Aggregate;
mod clock;
mod command;
mod config;
mod dashboard;
mod dispatch;
pub mod domain;
mod error;
pub mod hotspot;
mod inventory;
mod ledger;
mod metrics;
mod registry;
pub mod seed;
mod simulator;
mod store;
mod subscription;

pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{CommandContext, TIME_LABEL_FORMAT};
pub use config::{DashboardConfig, MetricsConfig, SimulationConfig};
pub use dashboard::{Dashboard, DashboardCommand, DashboardEvent, SUBMITTED_MESSAGE};
pub use domain::{
    ActivityPoint, Category, CategoryFilter, EmergencyRequest, Location, Notification,
    NotificationId, NotificationKind, NotificationQueue, Priority, RequestId, RequestInput,
    RequestStatus, ResourceStock, RollingWindow, Skill, VolunteerFilter, VolunteerId,
    VolunteerStatus, VolunteerTeam, estimated_response, suggest_priority,
};
pub use error::{DashboardError, Entity, ErrorKind, ExecuteError, StateError};
pub use hotspot::Hotspot;
pub use inventory::{ResourceInventory, Transfer};
pub use ledger::{DEFAULT_URGENT_LIMIT, RequestLedger};
pub use metrics::MetricsSnapshot;
pub use registry::VolunteerRegistry;
pub use simulator::{
    AUTO_REPORTER, EventSimulator, SIMULATOR_ACTOR, SimulationHandle, TickOutcome, TickPlan,
    URGENT_ALERT,
};
pub use store::{ReliefStore, ReliefStoreBuilder, StoreResult};
pub use subscription::Subscription;
