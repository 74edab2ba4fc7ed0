//! Top-level entry point that wraps the [`Dashboard`] in a mailbox actor
//! and adds the change feed and the simulation lifecycle.
//!
//! The store is opened via [`ReliefStoreBuilder`]. Every method on
//! [`ReliefStore`] only awaits the actor's reply; the actor serializes all
//! mutations, so readers never see a half-applied command.

use std::sync::Arc;

use crate::actor::{AggregateHandle, spawn_actor};
use crate::clock::{Clock, SystemClock};
use crate::config::{DashboardConfig, SimulationConfig};
use crate::dashboard::{Dashboard, DashboardCommand, DashboardEvent};
use crate::domain::activity::ActivityPoint;
use crate::domain::notification::Notification;
use crate::domain::request::{CategoryFilter, EmergencyRequest, RequestId, RequestInput};
use crate::domain::resource::ResourceStock;
use crate::domain::volunteer::{VolunteerFilter, VolunteerId, VolunteerTeam};
use crate::error::{DashboardError, ExecuteError, StateError};
use crate::hotspot::Hotspot;
use crate::inventory::Transfer;
use crate::metrics::MetricsSnapshot;
use crate::seed;
use crate::simulator::{SimulationHandle, TickOutcome};
use crate::subscription::Subscription;

/// Actor name stamped on caller commands.
const OPERATOR: &str = "operator";

/// Result of a store mutation.
pub type StoreResult<T> = Result<T, ExecuteError<DashboardError>>;

/// Shared, cloneable handle to a running dashboard.
///
/// `Clone` is cheap: every clone talks to the same actor. The actor exits
/// once every clone, and any running simulation, has been dropped or
/// stopped.
#[derive(Debug, Clone)]
pub struct ReliefStore {
    dashboard: AggregateHandle<Dashboard>,
    simulation: Arc<tokio::sync::Mutex<Option<SimulationHandle>>>,
}

impl ReliefStore {
    /// Create a builder for configuring and opening a store.
    pub fn builder() -> ReliefStoreBuilder {
        ReliefStoreBuilder::new()
    }

    // --- requests ----------------------------------------------------------

    /// Validate and record a request. Returns the new id.
    ///
    /// # Errors
    ///
    /// * `Validation` -- a required field is missing or malformed.
    /// * [`ExecuteError::ActorGone`] -- the store has shut down.
    pub async fn submit_request(&self, input: RequestInput) -> StoreResult<RequestId> {
        let events = self
            .dashboard
            .execute(DashboardCommand::SubmitRequest(input), OPERATOR)
            .await?;
        events
            .iter()
            .find_map(|e| match e {
                DashboardEvent::RequestSubmitted(request) => Some(request.id),
                _ => None,
            })
            .ok_or_else(|| {
                ExecuteError::Domain(DashboardError::conflict("submission recorded no request"))
            })
    }

    /// Dispatch an available team to a pending request.
    ///
    /// # Errors
    ///
    /// * `NotFound` -- unknown request or volunteer.
    /// * `Conflict` -- the request is not pending or the team is deployed.
    pub async fn assign_volunteer(
        &self,
        request_id: RequestId,
        volunteer_id: VolunteerId,
    ) -> StoreResult<()> {
        self.dashboard
            .execute(
                DashboardCommand::AssignVolunteer {
                    request_id,
                    volunteer_id,
                },
                OPERATOR,
            )
            .await
            .map(drop)
    }

    /// Close an in-progress request and free its team.
    pub async fn complete_request(&self, request_id: RequestId) -> StoreResult<()> {
        self.dashboard
            .execute(DashboardCommand::CompleteRequest { request_id }, OPERATOR)
            .await
            .map(drop)
    }

    /// Requests in ledger order (newest first).
    pub async fn list_requests(
        &self,
        filter: CategoryFilter,
    ) -> Result<Vec<EmergencyRequest>, StateError> {
        self.dashboard
            .read(move |d| d.list_requests(filter).cloned().collect())
            .await
    }

    /// The first `limit` high or critical requests.
    pub async fn urgent_requests(&self, limit: usize) -> Result<Vec<EmergencyRequest>, StateError> {
        self.dashboard
            .read(move |d| d.ledger().urgent(limit).cloned().collect())
            .await
    }

    // --- volunteers --------------------------------------------------------

    /// Teams matching `filter`.
    pub async fn list_volunteers(
        &self,
        filter: VolunteerFilter,
    ) -> Result<Vec<VolunteerTeam>, StateError> {
        self.dashboard
            .read(move |d| d.list_volunteers(filter).cloned().collect())
            .await
    }

    /// Available teams whose skills cover the request, best rated first.
    pub async fn candidates(&self, request_id: RequestId) -> StoreResult<Vec<VolunteerTeam>> {
        self.dashboard
            .read(move |d| {
                d.candidates(request_id)
                    .map(|teams| teams.into_iter().cloned().collect())
            })
            .await?
            .map_err(ExecuteError::Domain)
    }

    // --- resources ---------------------------------------------------------

    /// Every stock row.
    pub async fn list_resources(&self) -> Result<Vec<ResourceStock>, StateError> {
        self.dashboard
            .read(|d| d.inventory().iter().cloned().collect())
            .await
    }

    /// Share of a resource that is still available.
    pub async fn resource_ratio(&self, resource_type: &str) -> StoreResult<f64> {
        let resource_type = resource_type.to_string();
        self.dashboard
            .read(move |d| d.inventory().ratio(&resource_type))
            .await?
            .map_err(ExecuteError::Domain)
    }

    /// Move `amount` units from available to deployed.
    pub async fn deploy_resource(&self, resource_type: &str, amount: u64) -> StoreResult<()> {
        self.transfer(resource_type, amount, Transfer::Deploy).await
    }

    /// Move `amount` units from deployed back to available.
    pub async fn restock_resource(&self, resource_type: &str, amount: u64) -> StoreResult<()> {
        self.transfer(resource_type, amount, Transfer::Restock).await
    }

    async fn transfer(
        &self,
        resource_type: &str,
        amount: u64,
        direction: Transfer,
    ) -> StoreResult<()> {
        self.dashboard
            .execute(
                DashboardCommand::TransferStock {
                    resource_type: resource_type.to_string(),
                    amount,
                    direction,
                },
                OPERATOR,
            )
            .await
            .map(drop)
    }

    // --- notifications, activity, derived views -----------------------------

    /// Queued notifications, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, StateError> {
        self.dashboard
            .read(|d| d.notifications().iter().cloned().collect())
            .await
    }

    /// Mark every queued notification read.
    pub async fn mark_notifications_read(&self) -> StoreResult<()> {
        self.dashboard
            .execute(DashboardCommand::MarkNotificationsRead, OPERATOR)
            .await
            .map(drop)
    }

    /// The rolling activity window, oldest first.
    pub async fn activity(&self) -> Result<Vec<ActivityPoint>, StateError> {
        self.dashboard
            .read(|d| d.activity().iter().cloned().collect())
            .await
    }

    /// Density clusters of request locations.
    pub async fn hotspots(&self, eps: f64, min_samples: usize) -> Result<Vec<Hotspot>, StateError> {
        self.dashboard
            .read(move |d| d.hotspots(eps, min_samples))
            .await
    }

    /// Header metrics derived from the current state.
    pub async fn get_metrics(&self) -> Result<MetricsSnapshot, StateError> {
        self.dashboard.read(Dashboard::metrics).await
    }

    /// A full copy of the current state.
    pub async fn snapshot(&self) -> Result<Dashboard, StateError> {
        self.dashboard.state().await
    }

    // --- change feed -------------------------------------------------------

    /// Call `on_change` after every mutation or tick that changed state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn() + Send + 'static,
    {
        Subscription::spawn(self.dashboard.changes(), on_change)
    }

    // --- simulation --------------------------------------------------------

    /// Start the live feed.
    ///
    /// Resizes the activity window and notification queue to the config's
    /// capacities before the first tick.
    ///
    /// # Errors
    ///
    /// * `Validation` -- `config` is out of range.
    /// * `Conflict` -- a simulation is already running.
    pub async fn start_simulation(
        &self,
        config: SimulationConfig,
    ) -> StoreResult<SimulationHandle> {
        config.validate().map_err(ExecuteError::Domain)?;
        let mut slot = self.simulation.lock().await;
        if slot.as_ref().is_some_and(SimulationHandle::is_running) {
            return Err(ExecuteError::Domain(DashboardError::conflict(
                "simulation is already running",
            )));
        }
        self.dashboard
            .execute(
                DashboardCommand::ResizeBuffers {
                    rolling_window_size: config.rolling_window_size,
                    notification_capacity: config.notification_capacity,
                },
                OPERATOR,
            )
            .await?;
        let handle = SimulationHandle::start(&config, self.dashboard.clone())
            .map_err(ExecuteError::Domain)?;
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Stop the live feed and wait for its loop to exit. A no-op when no
    /// simulation is running.
    pub async fn stop_simulation(&self) {
        let handle = self.simulation.lock().await.take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    /// Whether the live feed is ticking.
    pub async fn is_simulating(&self) -> bool {
        self.simulation
            .lock()
            .await
            .as_ref()
            .is_some_and(SimulationHandle::is_running)
    }

    /// Drive one simulator tick immediately.
    ///
    /// # Errors
    ///
    /// * `Conflict` -- no simulation has been started.
    pub async fn tick_simulation_now(&self) -> StoreResult<TickOutcome> {
        let handle = self.simulation.lock().await.clone();
        match handle {
            Some(handle) => handle.tick_now().await,
            None => Err(ExecuteError::Domain(DashboardError::conflict(
                "simulation is not running",
            ))),
        }
    }

    /// Stop any simulation, then stop the actor once queued commands drain.
    pub async fn shutdown(&self) {
        self.stop_simulation().await;
        self.dashboard.shutdown().await;
        tracing::info!("relief store shut down");
    }
}

/// Builder for configuring and opening a [`ReliefStore`].
pub struct ReliefStoreBuilder {
    config: DashboardConfig,
    clock: Arc<dyn Clock>,
    volunteers: Vec<VolunteerTeam>,
    resources: Vec<ResourceStock>,
}

impl ReliefStoreBuilder {
    /// Default config, system clock, no data.
    pub fn new() -> Self {
        Self {
            config: DashboardConfig::default(),
            clock: Arc::new(SystemClock),
            volunteers: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Replace the whole dashboard config.
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the wall clock, e.g. with a [`ManualClock`](crate::ManualClock).
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Load the demo requests, teams, and stock.
    pub fn seed_demo_data(mut self, seed: bool) -> Self {
        self.config.seed_demo_data = seed;
        self
    }

    /// Register a team.
    pub fn volunteer(mut self, team: VolunteerTeam) -> Self {
        self.volunteers.push(team);
        self
    }

    /// Register a stock row.
    pub fn resource(mut self, stock: ResourceStock) -> Self {
        self.resources.push(stock);
        self
    }

    /// Build the initial state and spawn the actor.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the config is out of range or a seeded row
    /// is invalid or duplicated.
    pub fn open(self) -> Result<ReliefStore, DashboardError> {
        self.config.simulation.validate()?;
        let mut dashboard = Dashboard::new(&self.config);
        if self.config.seed_demo_data {
            seed::load_demo_data(&mut dashboard, self.clock.now())?;
        }
        for team in self.volunteers {
            dashboard.add_volunteer(team)?;
        }
        for stock in self.resources {
            dashboard.add_resource(stock)?;
        }
        tracing::info!(
            requests = dashboard.ledger().len(),
            volunteers = dashboard.registry().len(),
            resources = dashboard.inventory().iter().count(),
            "relief store opened"
        );
        Ok(ReliefStore {
            dashboard: spawn_actor(dashboard, self.clock),
            simulation: Arc::new(tokio::sync::Mutex::new(None)),
        })
    }
}

impl Default for ReliefStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
