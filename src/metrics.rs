//! Summary statistics for the dashboard header cards and charts.
//!
//! Always recomputed from current state; nothing is cached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dashboard::Dashboard;
use crate::domain::request::{Category, Priority, RequestStatus};
use crate::domain::volunteer::VolunteerStatus;

/// Point-in-time metrics derived from a [`Dashboard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Requests still pending.
    pub active_emergencies: usize,
    pub people_affected: u64,
    /// Teams currently available.
    pub active_volunteers: usize,
    pub deployed_volunteers: usize,
    pub resources_ready: u64,
    pub total_deployed: u64,
    /// Every category present, zero-filled.
    pub category_distribution: BTreeMap<Category, usize>,
    /// Every priority present, zero-filled.
    pub priority_distribution: BTreeMap<Priority, usize>,
    pub unread_notifications: usize,
    /// Display constant from [`MetricsConfig`](crate::MetricsConfig).
    pub average_response_time: String,
    /// Display constant from [`MetricsConfig`](crate::MetricsConfig).
    pub completion_rate: String,
}

impl MetricsSnapshot {
    pub fn collect(dashboard: &Dashboard) -> Self {
        let ledger = dashboard.ledger();
        let registry = dashboard.registry();
        let inventory = dashboard.inventory();

        let mut category_distribution: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        let mut priority_distribution: BTreeMap<Priority, usize> =
            Priority::ALL.iter().map(|p| (*p, 0)).collect();
        let mut people_affected = 0u64;

        for request in ledger.list(Default::default()) {
            *category_distribution.entry(request.category).or_default() += 1;
            *priority_distribution.entry(request.priority).or_default() += 1;
            people_affected += u64::from(request.victim_count);
        }

        Self {
            active_emergencies: ledger.count_status(RequestStatus::Pending),
            people_affected,
            active_volunteers: registry.count_status(VolunteerStatus::Available),
            deployed_volunteers: registry.count_status(VolunteerStatus::Deployed),
            resources_ready: inventory.total_available(),
            total_deployed: inventory.total_deployed(),
            category_distribution,
            priority_distribution,
            unread_notifications: dashboard.notifications().unread(),
            average_response_time: dashboard.metrics_config().average_response_time.clone(),
            completion_rate: dashboard.metrics_config().completion_rate.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandContext;
    use crate::domain::location::Location;
    use crate::domain::request::fixtures::input;
    use crate::domain::resource::ResourceStock;
    use crate::domain::volunteer::{Skill, VolunteerId, VolunteerTeam};

    #[test]
    fn empty_dashboard_is_zero_filled() {
        let m = Dashboard::default().metrics();
        assert_eq!(m.active_emergencies, 0);
        assert_eq!(m.category_distribution.len(), 4);
        assert!(m.category_distribution.values().all(|v| *v == 0));
        assert_eq!(m.priority_distribution.len(), 4);
        assert_eq!(m.average_response_time, "12 mins");
        assert_eq!(m.completion_rate, "87%");
    }

    #[test]
    fn three_submitted_one_assigned_leaves_two_active() {
        let ctx = CommandContext::default();
        let mut d = Dashboard::default();
        d.add_volunteer(VolunteerTeam {
            id: VolunteerId(1),
            name: "Team Beta".into(),
            location: Location::new(28.55, 77.26),
            skills: [Skill::Food, Skill::Water].into_iter().collect(),
            status: VolunteerStatus::Available,
            rating: 4.6,
            completed_missions: 18,
            contact: "+91-9000000002".into(),
        })
        .unwrap();
        d.add_resource(ResourceStock {
            resource_type: "Food Packets".into(),
            available: 2450,
            deployed: 1200,
            location: "Warehouse A".into(),
            last_updated: "5 mins ago".into(),
        })
        .unwrap();

        let first = d.submit_request(input("food", "high"), &ctx).unwrap();
        d.submit_request(input("water", "high"), &ctx).unwrap();
        d.submit_request(input("food", "critical"), &ctx).unwrap();
        d.assign_volunteer(first, VolunteerId(1), &ctx).unwrap();

        let m = d.metrics();
        assert_eq!(m.active_emergencies, 2);
        assert_eq!(m.people_affected, 12);
        assert_eq!(m.active_volunteers, 0);
        assert_eq!(m.deployed_volunteers, 1);
        assert_eq!(m.resources_ready, 2450);
        assert_eq!(m.total_deployed, 1200);
        assert_eq!(m.category_distribution[&Category::Food], 2);
        assert_eq!(m.category_distribution[&Category::Shelter], 0);
        assert_eq!(m.priority_distribution[&Priority::High], 2);
        assert_eq!(m.unread_notifications, 4);
    }
}
