//! Dispatch engine: linking requests to volunteer teams.
//!
//! Assignment and completion each touch a request and a team. Both are
//! decided here against a consistent view of the dashboard and emitted as a
//! single event, so the two sides are always applied together.

use crate::command::CommandContext;
use crate::dashboard::{Dashboard, DashboardEvent};
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::request::{RequestId, RequestStatus};
use crate::domain::volunteer::VolunteerId;
use crate::error::DashboardError;

/// Decide `assignVolunteer(request_id, volunteer_id)`.
///
/// # Errors
///
/// * `NotFound` -- unknown request or volunteer.
/// * `Conflict` -- the request is not pending, or the team is deployed.
pub(crate) fn decide_assignment(
    dashboard: &Dashboard,
    request_id: RequestId,
    volunteer_id: VolunteerId,
    ctx: &CommandContext,
) -> Result<Vec<DashboardEvent>, DashboardError> {
    let request = dashboard.ledger().require(request_id)?;
    let team = dashboard.registry().require(volunteer_id)?;

    if request.status != RequestStatus::Pending {
        return Err(DashboardError::conflict(format!(
            "request #{request_id} is already {}",
            request.status
        )));
    }
    if !team.is_available() {
        return Err(DashboardError::conflict(format!(
            "{} is {} and cannot take request #{request_id}",
            team.name, team.status
        )));
    }

    let notice = Notification {
        id: dashboard.notifications().next_id(),
        kind: NotificationKind::Info,
        message: format!("Volunteer assigned to request #{request_id}"),
        timestamp: ctx.time_label(),
        read: false,
    };

    Ok(vec![
        DashboardEvent::VolunteerAssigned {
            request_id,
            volunteer_id,
        },
        DashboardEvent::NotificationRaised(notice),
    ])
}

/// Decide `completeRequest(request_id)`.
///
/// # Errors
///
/// * `NotFound` -- unknown request.
/// * `Conflict` -- the request is pending or already completed.
pub(crate) fn decide_completion(
    dashboard: &Dashboard,
    request_id: RequestId,
) -> Result<Vec<DashboardEvent>, DashboardError> {
    let request = dashboard.ledger().require(request_id)?;
    match (request.status, request.assigned_volunteer_id) {
        (RequestStatus::InProgress, Some(volunteer_id)) => {
            Ok(vec![DashboardEvent::RequestCompleted {
                request_id,
                volunteer_id,
            }])
        }
        (status, _) => Err(DashboardError::conflict(format!(
            "request #{request_id} is {status}, only in-progress requests can be completed"
        ))),
    }
}
