//! Demo data: the requests, teams, and stock the dashboard opens with.
//!
//! The rows describe a flood response around Delhi. Team Alpha is on the
//! Noida medical call and Team Beta is out on an earlier supply run, so
//! only Team Gamma starts available.

use chrono::{DateTime, Utc};

use crate::dashboard::Dashboard;
use crate::domain::location::Location;
use crate::domain::request::{Category, EmergencyRequest, Priority, RequestId, RequestStatus};
use crate::domain::resource::ResourceStock;
use crate::domain::volunteer::{Skill, VolunteerId, VolunteerStatus, VolunteerTeam};
use crate::error::DashboardError;

/// Load the demo rows into `dashboard`.
///
/// `now` stamps `reported_at` on the seeded requests.
///
/// # Errors
///
/// Fails with `Validation` if any row collides with data already loaded.
pub fn load_demo_data(dashboard: &mut Dashboard, now: DateTime<Utc>) -> Result<(), DashboardError> {
    for team in teams() {
        dashboard.add_volunteer(team)?;
    }
    for stock in stock() {
        dashboard.add_resource(stock)?;
    }
    for request in requests(now) {
        dashboard.add_historical_request(request)?;
    }
    Ok(())
}

fn teams() -> Vec<VolunteerTeam> {
    vec![
        VolunteerTeam {
            id: VolunteerId(1),
            name: "Team Alpha".into(),
            location: Location::new(28.6129, 77.2295),
            skills: [Skill::Medical, Skill::Rescue].into_iter().collect(),
            status: VolunteerStatus::Deployed,
            rating: 4.8,
            completed_missions: 23,
            contact: "+91-9000000001".into(),
        },
        VolunteerTeam {
            id: VolunteerId(2),
            name: "Team Beta".into(),
            location: Location::new(28.5505, 77.2679),
            skills: [Skill::Food, Skill::Water].into_iter().collect(),
            status: VolunteerStatus::Deployed,
            rating: 4.6,
            completed_missions: 18,
            contact: "+91-9000000002".into(),
        },
        VolunteerTeam {
            id: VolunteerId(3),
            name: "Team Gamma".into(),
            location: Location::new(28.4817, 77.0818),
            skills: [Skill::Shelter, Skill::Transport].into_iter().collect(),
            status: VolunteerStatus::Available,
            rating: 4.9,
            completed_missions: 31,
            contact: "+91-9000000003".into(),
        },
    ]
}

fn stock() -> Vec<ResourceStock> {
    [
        ("Food Packets", 2450, 1200, "Warehouse A", "5 mins ago"),
        ("Water Bottles", 5000, 2800, "Warehouse B", "3 mins ago"),
        ("Medical Kits", 180, 120, "Medical Center", "1 min ago"),
        ("Blankets", 800, 450, "Relief Center", "7 mins ago"),
        ("Emergency Shelters", 25, 12, "Command Center", "10 mins ago"),
    ]
    .into_iter()
    .map(
        |(resource_type, available, deployed, location, last_updated)| ResourceStock {
            resource_type: resource_type.into(),
            available,
            deployed,
            location: location.into(),
            last_updated: last_updated.into(),
        },
    )
    .collect()
}

/// Newest first, matching ledger order.
fn requests(now: DateTime<Utc>) -> Vec<EmergencyRequest> {
    vec![
        EmergencyRequest {
            id: RequestId(1),
            location: Location::new(28.6139, 77.2090),
            category: Category::Food,
            priority: Priority::High,
            victim_count: 45,
            status: RequestStatus::Pending,
            area: "Central Delhi".into(),
            description: "Urgent need for food supplies for flood-affected families".into(),
            contact: "+91-9876543210".into(),
            reported_by: "Local Volunteer".into(),
            created_at: "2 mins ago".into(),
            reported_at: now - chrono::Duration::minutes(2),
            estimated_response: Priority::High.estimated_response().into(),
            assigned_volunteer_id: None,
        },
        EmergencyRequest {
            id: RequestId(2),
            location: Location::new(28.5355, 77.3910),
            category: Category::Medical,
            priority: Priority::Critical,
            victim_count: 12,
            status: RequestStatus::InProgress,
            area: "Noida".into(),
            description: "Medical emergency - injured people need immediate attention".into(),
            contact: "+91-9876543211".into(),
            reported_by: "Emergency Responder".into(),
            created_at: "5 mins ago".into(),
            reported_at: now - chrono::Duration::minutes(5),
            estimated_response: Priority::Critical.estimated_response().into(),
            assigned_volunteer_id: Some(VolunteerId(1)),
        },
        EmergencyRequest {
            id: RequestId(3),
            location: Location::new(28.4595, 77.0266),
            category: Category::Water,
            priority: Priority::Medium,
            victim_count: 30,
            status: RequestStatus::Pending,
            area: "Gurgaon".into(),
            description: "Clean drinking water shortage in residential area".into(),
            contact: "+91-9876543212".into(),
            reported_by: "Resident".into(),
            created_at: "8 mins ago".into(),
            reported_at: now - chrono::Duration::minutes(8),
            estimated_response: Priority::Medium.estimated_response().into(),
            assigned_volunteer_id: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::CategoryFilter;

    fn seeded() -> Dashboard {
        let mut d = Dashboard::default();
        load_demo_data(&mut d, Utc::now()).expect("demo data loads");
        d
    }

    #[test]
    fn loads_every_row() {
        let d = seeded();
        assert_eq!(d.ledger().len(), 3);
        assert_eq!(d.registry().len(), 3);
        assert_eq!(d.inventory().iter().count(), 5);
    }

    #[test]
    fn ledger_order_and_next_id() {
        let d = seeded();
        let ids: Vec<_> = d.list_requests(CategoryFilter::All).map(|r| r.id.0).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(d.ledger().next_id(), RequestId(4));
    }

    #[test]
    fn opening_metrics() {
        let m = seeded().metrics();
        assert_eq!(m.active_emergencies, 2);
        assert_eq!(m.people_affected, 87);
        assert_eq!(m.active_volunteers, 1);
        assert_eq!(m.resources_ready, 8455);
        assert_eq!(m.total_deployed, 4582);
    }

    #[test]
    fn loading_twice_collides() {
        let mut d = seeded();
        assert!(load_demo_data(&mut d, Utc::now()).is_err());
    }
}
