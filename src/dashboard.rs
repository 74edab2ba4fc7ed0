//! The dashboard state object.
//!
//! [`Dashboard`] owns every mutable collection: the request ledger, the
//! volunteer registry, the resource inventory, the notification queue, and
//! the rolling activity window. It is an [`Aggregate`]: each operation is a
//! [`DashboardCommand`] decided into [`DashboardEvent`]s and folded back in,
//! so a rejected command never leaves a partial change behind.
//!
//! The type is synchronous and single-owner. [`ReliefStore`](crate::ReliefStore)
//! wraps it in an actor for shared, concurrent use.

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::command::CommandContext;
use crate::config::{DashboardConfig, MetricsConfig};
use crate::dispatch;
use crate::domain::activity::{ActivityPoint, RollingWindow};
use crate::domain::notification::{Notification, NotificationKind, NotificationQueue};
use crate::domain::request::{
    CategoryFilter, EmergencyRequest, RequestId, RequestInput, RequestStatus,
};
use crate::domain::resource::ResourceStock;
use crate::domain::volunteer::{VolunteerFilter, VolunteerId, VolunteerStatus, VolunteerTeam};
use crate::error::DashboardError;
use crate::hotspot::{self, Hotspot};
use crate::inventory::{ResourceInventory, Transfer};
use crate::ledger::RequestLedger;
use crate::metrics::MetricsSnapshot;
use crate::registry::VolunteerRegistry;
use crate::simulator::TickPlan;

/// Message raised for every accepted caller submission.
pub const SUBMITTED_MESSAGE: &str =
    "Your request has been submitted successfully. Help is on the way!";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`Dashboard`].
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    /// Validate and record a new request.
    SubmitRequest(RequestInput),
    /// Dispatch an available team to a pending request.
    AssignVolunteer {
        request_id: RequestId,
        volunteer_id: VolunteerId,
    },
    /// Close an in-progress request and free its team.
    CompleteRequest { request_id: RequestId },
    /// Move stock between the available and deployed counters.
    TransferStock {
        resource_type: String,
        amount: u64,
        direction: Transfer,
    },
    /// Mark every queued notification read.
    MarkNotificationsRead,
    /// Change the capacity of the activity window and notification queue.
    ResizeBuffers {
        rolling_window_size: usize,
        notification_capacity: usize,
    },
    /// Apply one simulator tick.
    SimulatorTick(TickPlan),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events produced by the [`Dashboard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DashboardEvent {
    RequestSubmitted(EmergencyRequest),
    /// Request goes in-progress and the team deploys, in one step.
    VolunteerAssigned {
        request_id: RequestId,
        volunteer_id: VolunteerId,
    },
    /// Request completes and the team becomes available, in one step.
    RequestCompleted {
        request_id: RequestId,
        volunteer_id: VolunteerId,
    },
    StockTransferred {
        resource_type: String,
        amount: u64,
        direction: Transfer,
    },
    NotificationRaised(Notification),
    NotificationsRead,
    ActivitySampled(ActivityPoint),
    BuffersResized {
        rolling_window_size: usize,
        notification_capacity: usize,
    },
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// All mutable dashboard state behind one owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    ledger: RequestLedger,
    registry: VolunteerRegistry,
    inventory: ResourceInventory,
    notifications: NotificationQueue,
    activity: RollingWindow,
    metrics_config: MetricsConfig,
}

impl Dashboard {
    /// An empty dashboard sized and labelled according to `config`.
    ///
    /// Demo data is not loaded here; see [`seed`](crate::seed).
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            notifications: NotificationQueue::with_capacity(
                config.simulation.notification_capacity,
            ),
            activity: RollingWindow::with_capacity(config.simulation.rolling_window_size),
            metrics_config: config.metrics.clone(),
            ..Self::default()
        }
    }

    // --- seeding -----------------------------------------------------------

    /// Register a team. Teams are only added before the dashboard goes live.
    pub fn add_volunteer(&mut self, team: VolunteerTeam) -> Result<(), DashboardError> {
        self.registry.insert(team)
    }

    /// Register a stock row. Types are unique.
    pub fn add_resource(&mut self, stock: ResourceStock) -> Result<(), DashboardError> {
        self.inventory.insert(stock)
    }

    /// Load a historical request behind the existing ones.
    ///
    /// The request must satisfy the assignment invariant: in-progress or
    /// completed requests name a registered team, pending ones name none,
    /// and an in-progress request's team must be deployed.
    pub(crate) fn add_historical_request(
        &mut self,
        request: EmergencyRequest,
    ) -> Result<(), DashboardError> {
        if self.ledger.get(request.id).is_some() {
            return Err(DashboardError::validation(
                "id",
                format!("request #{} already exists", request.id),
            ));
        }
        match (request.status, request.assigned_volunteer_id) {
            (RequestStatus::Pending, None) => {}
            (RequestStatus::Pending, Some(_)) => {
                return Err(DashboardError::validation(
                    "assignedVolunteerId",
                    "a pending request cannot have a team",
                ));
            }
            (_, None) => {
                return Err(DashboardError::validation(
                    "assignedVolunteerId",
                    "an assigned request must name its team",
                ));
            }
            (status, Some(volunteer_id)) => {
                let team = self.registry.require(volunteer_id)?;
                if status == RequestStatus::InProgress && team.is_available() {
                    return Err(DashboardError::validation(
                        "assignedVolunteerId",
                        format!("{} is in-progress but its team is available", request.id),
                    ));
                }
            }
        }
        self.ledger.insert_oldest(request);
        Ok(())
    }

    // --- operations --------------------------------------------------------

    /// Validate and record a caller-supplied request.
    ///
    /// Raises the success notification on acceptance.
    pub fn submit_request(
        &mut self,
        input: RequestInput,
        ctx: &CommandContext,
    ) -> Result<RequestId, DashboardError> {
        let id = self.ledger.next_id();
        self.execute(DashboardCommand::SubmitRequest(input), ctx)?;
        Ok(id)
    }

    /// Dispatch an available team to a pending request.
    pub fn assign_volunteer(
        &mut self,
        request_id: RequestId,
        volunteer_id: VolunteerId,
        ctx: &CommandContext,
    ) -> Result<(), DashboardError> {
        self.execute(
            DashboardCommand::AssignVolunteer {
                request_id,
                volunteer_id,
            },
            ctx,
        )
        .map(drop)
    }

    /// Close an in-progress request and free its team.
    pub fn complete_request(
        &mut self,
        request_id: RequestId,
        ctx: &CommandContext,
    ) -> Result<(), DashboardError> {
        self.execute(DashboardCommand::CompleteRequest { request_id }, ctx)
            .map(drop)
    }

    /// Move `amount` units of a resource from available to deployed.
    pub fn deploy_resource(
        &mut self,
        resource_type: &str,
        amount: u64,
        ctx: &CommandContext,
    ) -> Result<(), DashboardError> {
        self.transfer(resource_type, amount, Transfer::Deploy, ctx)
    }

    /// Move `amount` units of a resource from deployed back to available.
    pub fn restock_resource(
        &mut self,
        resource_type: &str,
        amount: u64,
        ctx: &CommandContext,
    ) -> Result<(), DashboardError> {
        self.transfer(resource_type, amount, Transfer::Restock, ctx)
    }

    fn transfer(
        &mut self,
        resource_type: &str,
        amount: u64,
        direction: Transfer,
        ctx: &CommandContext,
    ) -> Result<(), DashboardError> {
        self.execute(
            DashboardCommand::TransferStock {
                resource_type: resource_type.to_string(),
                amount,
                direction,
            },
            ctx,
        )
        .map(drop)
    }

    /// Mark every queued notification read.
    pub fn mark_notifications_read(&mut self, ctx: &CommandContext) {
        // Never rejected.
        let _ = self.execute(DashboardCommand::MarkNotificationsRead, ctx);
    }

    // --- reads -------------------------------------------------------------

    /// Every request, newest first.
    pub fn ledger(&self) -> &RequestLedger {
        &self.ledger
    }

    /// The volunteer team catalog.
    pub fn registry(&self) -> &VolunteerRegistry {
        &self.registry
    }

    /// Resource stock rows.
    pub fn inventory(&self) -> &ResourceInventory {
        &self.inventory
    }

    /// The bounded notification queue.
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// The rolling activity window.
    pub fn activity(&self) -> &RollingWindow {
        &self.activity
    }

    /// Display strings used by the metrics header.
    pub fn metrics_config(&self) -> &MetricsConfig {
        &self.metrics_config
    }

    /// Requests in ledger order, filtered by category.
    pub fn list_requests(
        &self,
        filter: CategoryFilter,
    ) -> impl Iterator<Item = &EmergencyRequest> + Clone + '_ {
        self.ledger.list(filter)
    }

    /// Teams matching `filter`.
    pub fn list_volunteers(
        &self,
        filter: VolunteerFilter,
    ) -> impl Iterator<Item = &VolunteerTeam> + Clone + '_ {
        self.registry.list(filter)
    }

    /// Available teams suited to the request's category, best rated first.
    pub fn candidates(&self, request_id: RequestId) -> Result<Vec<&VolunteerTeam>, DashboardError> {
        let request = self.ledger.require(request_id)?;
        Ok(self.registry.candidates(request.category))
    }

    /// Header metrics derived from the current state.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::collect(self)
    }

    /// Density clusters of request locations.
    pub fn hotspots(&self, eps: f64, min_samples: usize) -> Vec<Hotspot> {
        let requests: Vec<_> = self.ledger.list(CategoryFilter::All).collect();
        hotspot::cluster(&requests, eps, min_samples)
    }

    // --- deciders ----------------------------------------------------------

    fn decide_submission(
        &self,
        input: RequestInput,
        ctx: &CommandContext,
    ) -> Result<Vec<DashboardEvent>, DashboardError> {
        let request = self.ledger.prepare(input, ctx)?;
        let notice = Notification {
            id: self.notifications.next_id(),
            kind: NotificationKind::Success,
            message: SUBMITTED_MESSAGE.to_string(),
            timestamp: ctx.time_label(),
            read: false,
        };
        Ok(vec![
            DashboardEvent::RequestSubmitted(request),
            DashboardEvent::NotificationRaised(notice),
        ])
    }

    /// One tick, in order: sample, alert, synthesized request.
    ///
    /// Synthesized requests go through the same validation and labelling as
    /// caller submissions but do not raise the reporter-facing success
    /// message.
    fn decide_tick(
        &self,
        plan: TickPlan,
        ctx: &CommandContext,
    ) -> Result<Vec<DashboardEvent>, DashboardError> {
        let mut events = vec![DashboardEvent::ActivitySampled(ActivityPoint {
            time: ctx.time_label(),
            total_requests: self.ledger.len(),
            completed_requests: self.ledger.count_status(RequestStatus::Completed),
        })];
        if let Some(message) = plan.alert {
            events.push(DashboardEvent::NotificationRaised(Notification {
                id: self.notifications.next_id(),
                kind: NotificationKind::Urgent,
                message,
                timestamp: ctx.time_label(),
                read: false,
            }));
        }
        if let Some(input) = plan.request {
            events.push(DashboardEvent::RequestSubmitted(
                self.ledger.prepare(input, ctx)?,
            ));
        }
        Ok(events)
    }

    fn decide_resize(
        rolling_window_size: usize,
        notification_capacity: usize,
    ) -> Result<Vec<DashboardEvent>, DashboardError> {
        if rolling_window_size == 0 {
            return Err(DashboardError::validation(
                "rollingWindowSize",
                "must be at least 1",
            ));
        }
        if notification_capacity == 0 {
            return Err(DashboardError::validation(
                "notificationCapacity",
                "must be at least 1",
            ));
        }
        Ok(vec![DashboardEvent::BuffersResized {
            rolling_window_size,
            notification_capacity,
        }])
    }
}

// ---------------------------------------------------------------------------
// Aggregate impl
// ---------------------------------------------------------------------------

impl Aggregate for Dashboard {
    type Command = DashboardCommand;
    type DomainEvent = DashboardEvent;
    type Error = DashboardError;

    fn handle(
        &self,
        cmd: DashboardCommand,
        ctx: &CommandContext,
    ) -> Result<Vec<DashboardEvent>, DashboardError> {
        match cmd {
            DashboardCommand::SubmitRequest(input) => self.decide_submission(input, ctx),
            DashboardCommand::AssignVolunteer {
                request_id,
                volunteer_id,
            } => dispatch::decide_assignment(self, request_id, volunteer_id, ctx),
            DashboardCommand::CompleteRequest { request_id } => {
                dispatch::decide_completion(self, request_id)
            }
            DashboardCommand::TransferStock {
                resource_type,
                amount,
                direction,
            } => {
                self.inventory
                    .check_transfer(&resource_type, amount, direction)?;
                Ok(vec![DashboardEvent::StockTransferred {
                    resource_type,
                    amount,
                    direction,
                }])
            }
            DashboardCommand::MarkNotificationsRead => {
                if self.notifications.unread() == 0 {
                    return Ok(vec![]);
                }
                Ok(vec![DashboardEvent::NotificationsRead])
            }
            DashboardCommand::ResizeBuffers {
                rolling_window_size,
                notification_capacity,
            } => Self::decide_resize(rolling_window_size, notification_capacity),
            DashboardCommand::SimulatorTick(plan) => self.decide_tick(plan, ctx),
        }
    }

    fn apply(mut self, event: &DashboardEvent) -> Self {
        let applied = match event {
            DashboardEvent::RequestSubmitted(request) => {
                self.ledger.insert(request.clone());
                Ok(())
            }
            DashboardEvent::VolunteerAssigned {
                request_id,
                volunteer_id,
            } => self
                .ledger
                .assign(*request_id, *volunteer_id)
                .and_then(|()| {
                    self.registry
                        .set_status(*volunteer_id, VolunteerStatus::Deployed)
                }),
            DashboardEvent::RequestCompleted {
                request_id,
                volunteer_id,
            } => self
                .ledger
                .set_status(*request_id, RequestStatus::Completed)
                .and_then(|()| {
                    self.registry
                        .set_status(*volunteer_id, VolunteerStatus::Available)
                }),
            DashboardEvent::StockTransferred {
                resource_type,
                amount,
                direction,
            } => {
                self.inventory
                    .apply_transfer(resource_type, *amount, *direction);
                Ok(())
            }
            DashboardEvent::NotificationRaised(notification) => {
                self.notifications.push(notification.clone());
                Ok(())
            }
            DashboardEvent::NotificationsRead => {
                self.notifications.mark_all_read();
                Ok(())
            }
            DashboardEvent::ActivitySampled(point) => {
                self.activity.push(point.clone());
                Ok(())
            }
            DashboardEvent::BuffersResized {
                rolling_window_size,
                notification_capacity,
            } => {
                self.activity.resize(*rolling_window_size);
                self.notifications.resize(*notification_capacity);
                Ok(())
            }
        };
        if let Err(err) = applied {
            tracing::warn!(error = %err, "event referenced a missing entity");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::Category;
    use crate::domain::request::fixtures::input;
    use crate::error::ErrorKind;

    fn ctx() -> CommandContext {
        CommandContext::default().with_actor("test")
    }

    #[test]
    fn submit_prepends_and_notifies() {
        let mut d = Dashboard::default();
        let first = d.submit_request(input("food", "low"), &ctx()).unwrap();
        let second = d.submit_request(input("water", "high"), &ctx()).unwrap();

        let ids: Vec<_> = d.list_requests(CategoryFilter::All).map(|r| r.id).collect();
        assert_eq!(ids, [second, first]);

        let newest = d.notifications().iter().next().unwrap();
        assert_eq!(newest.kind, NotificationKind::Success);
        assert_eq!(newest.message, SUBMITTED_MESSAGE);
        assert_eq!(d.notifications().len(), 2);
    }

    #[test]
    fn rejected_submit_leaves_state_untouched() {
        let mut d = Dashboard::default();
        let mut bad = input("food", "low");
        bad.area.clear();
        let before = d.clone();
        let err = d.submit_request(bad, &ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(d, before);
    }

    #[test]
    fn every_priority_gets_its_label() {
        let mut d = Dashboard::default();
        for (priority, label) in [
            ("critical", "5-10 mins"),
            ("high", "10-20 mins"),
            ("medium", "20-45 mins"),
            ("low", "45-90 mins"),
        ] {
            let id = d.submit_request(input("medical", priority), &ctx()).unwrap();
            assert_eq!(d.ledger().get(id).unwrap().estimated_response, label);
        }
    }

    #[test]
    fn tick_samples_before_spawning() {
        let mut d = Dashboard::default();
        d.submit_request(input("food", "low"), &ctx()).unwrap();
        let plan = TickPlan {
            alert: Some("New critical medical emergency reported in South Delhi".into()),
            request: Some(input("shelter", "critical")),
        };
        d.execute(DashboardCommand::SimulatorTick(plan), &ctx())
            .unwrap();

        let point = d.activity().iter().last().unwrap();
        assert_eq!(point.total_requests, 1, "sample is taken before the spawn");
        assert_eq!(d.ledger().len(), 2);
        let newest = d.list_requests(CategoryFilter::All).next().unwrap();
        assert_eq!(newest.category, Category::Shelter);
        assert_eq!(newest.estimated_response, "5-10 mins");

        let kinds: Vec<_> = d.notifications().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, [NotificationKind::Urgent, NotificationKind::Success]);
    }

    #[test]
    fn transfer_through_dashboard() {
        let mut d = Dashboard::default();
        d.add_resource(ResourceStock {
            resource_type: "Water Bottles".into(),
            available: 5000,
            deployed: 2800,
            location: "Warehouse B".into(),
            last_updated: "3 mins ago".into(),
        })
        .unwrap();
        d.deploy_resource("Water Bottles", 1000, &ctx()).unwrap();
        d.restock_resource("Water Bottles", 300, &ctx()).unwrap();
        let row = d.inventory().get("Water Bottles").unwrap();
        assert_eq!((row.available, row.deployed), (4300, 3500));
        assert_eq!(
            d.deploy_resource("Water Bottles", 9000, &ctx())
                .unwrap_err()
                .kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn mark_read_is_noop_when_nothing_unread() {
        let mut d = Dashboard::default();
        let events = d
            .execute(DashboardCommand::MarkNotificationsRead, &ctx())
            .unwrap();
        assert!(events.is_empty());

        d.submit_request(input("food", "low"), &ctx()).unwrap();
        d.mark_notifications_read(&ctx());
        assert_eq!(d.notifications().unread(), 0);
    }

    #[test]
    fn resize_rejects_zero() {
        let mut d = Dashboard::default();
        let err = d
            .execute(
                DashboardCommand::ResizeBuffers {
                    rolling_window_size: 0,
                    notification_capacity: 5,
                },
                &ctx(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn historical_request_must_respect_assignment_invariant() {
        let mut d = Dashboard::default();
        let mut r = d
            .ledger()
            .prepare(input("food", "low"), &ctx())
            .unwrap();
        r.assigned_volunteer_id = Some(VolunteerId(1));
        let err = d.add_historical_request(r).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn events_serialize_adjacently_tagged() {
        let event = DashboardEvent::VolunteerAssigned {
            request_id: RequestId(3),
            volunteer_id: VolunteerId(1),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "VolunteerAssigned");
        assert_eq!(json["data"]["request_id"], 3);
    }
}
