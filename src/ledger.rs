//! Request ledger: the ordered, most-recent-first store of requests.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::command::CommandContext;
use crate::domain::request::{
    CategoryFilter, EmergencyRequest, JUST_NOW, RequestId, RequestInput, RequestStatus,
};
use crate::domain::volunteer::VolunteerId;
use crate::error::{DashboardError, Entity};

/// Number of requests shown on the urgent panel by default.
pub const DEFAULT_URGENT_LIMIT: usize = 5;

/// Ordered collection of every request ever accepted.
///
/// Index 0 is the most recently submitted request. Requests are never
/// removed; ids are handed out monotonically and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLedger {
    requests: VecDeque<EmergencyRequest>,
    next_id: u64,
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self {
            requests: VecDeque::new(),
            next_id: 1,
        }
    }
}

impl RequestLedger {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// The id the next accepted request will receive.
    pub fn next_id(&self) -> RequestId {
        RequestId(self.next_id)
    }

    pub fn get(&self, id: RequestId) -> Option<&EmergencyRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Look up `id`, failing with `NotFound`.
    pub fn require(&self, id: RequestId) -> Result<&EmergencyRequest, DashboardError> {
        self.get(id)
            .ok_or_else(|| DashboardError::not_found(Entity::Request, id))
    }

    /// Validate `input` and build the request `submit` would insert.
    ///
    /// Does not touch the ledger; the caller inserts the returned request
    /// once the whole command has been decided.
    pub(crate) fn prepare(
        &self,
        input: RequestInput,
        ctx: &CommandContext,
    ) -> Result<EmergencyRequest, DashboardError> {
        let classified = input.validate()?;
        Ok(EmergencyRequest {
            id: self.next_id(),
            location: input.location,
            category: classified.category,
            priority: classified.priority,
            victim_count: input.victim_count,
            status: RequestStatus::Pending,
            area: input.area.trim().to_string(),
            description: input.description.trim().to_string(),
            contact: input.contact.trim().to_string(),
            reported_by: input.reported_by.trim().to_string(),
            created_at: JUST_NOW.to_string(),
            reported_at: ctx.issued_at,
            estimated_response: classified.priority.estimated_response().to_string(),
            assigned_volunteer_id: None,
        })
    }

    /// Prepend an accepted request.
    pub(crate) fn insert(&mut self, request: EmergencyRequest) {
        self.next_id = self.next_id.max(request.id.0 + 1);
        self.requests.push_front(request);
    }

    /// Append a request behind the existing ones. Used for seeding, where
    /// rows arrive newest first.
    pub(crate) fn insert_oldest(&mut self, request: EmergencyRequest) {
        self.next_id = self.next_id.max(request.id.0 + 1);
        self.requests.push_back(request);
    }

    /// Lazy view of the ledger in order, filtered by category.
    ///
    /// The returned iterator is `Clone`, so a consumer can restart it
    /// without re-querying.
    pub fn list(
        &self,
        filter: CategoryFilter,
    ) -> impl Iterator<Item = &EmergencyRequest> + Clone + '_ {
        self.requests
            .iter()
            .filter(move |r| filter.matches(r.category))
    }

    /// The first `limit` high or critical requests, in ledger order.
    pub fn urgent(&self, limit: usize) -> impl Iterator<Item = &EmergencyRequest> + Clone + '_ {
        self.requests
            .iter()
            .filter(|r| r.priority.is_urgent())
            .take(limit)
    }

    pub fn count_status(&self, status: RequestStatus) -> usize {
        self.requests.iter().filter(|r| r.status == status).count()
    }

    pub(crate) fn set_status(
        &mut self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), DashboardError> {
        let request = self.get_mut(id)?;
        request.status = status;
        Ok(())
    }

    /// Link `volunteer` and move the request to in-progress together.
    pub(crate) fn assign(
        &mut self,
        id: RequestId,
        volunteer: VolunteerId,
    ) -> Result<(), DashboardError> {
        let request = self.get_mut(id)?;
        request.assigned_volunteer_id = Some(volunteer);
        request.status = RequestStatus::InProgress;
        Ok(())
    }

    fn get_mut(&mut self, id: RequestId) -> Result<&mut EmergencyRequest, DashboardError> {
        self.requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DashboardError::not_found(Entity::Request, id))
    }
}
