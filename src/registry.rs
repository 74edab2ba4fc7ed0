//! Volunteer registry: the seeded catalog of responder teams.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::request::Category;
use crate::domain::volunteer::{VolunteerFilter, VolunteerId, VolunteerStatus, VolunteerTeam};
use crate::error::{DashboardError, Entity};

/// Teams keyed by id. Listing order is ascending id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolunteerRegistry {
    teams: BTreeMap<VolunteerId, VolunteerTeam>,
}

impl VolunteerRegistry {
    /// Add a seed team, rejecting malformed rows and duplicate ids.
    pub(crate) fn insert(&mut self, team: VolunteerTeam) -> Result<(), DashboardError> {
        team.validate()?;
        if self.teams.contains_key(&team.id) {
            return Err(DashboardError::validation(
                "id",
                format!("volunteer id {} is already registered", team.id),
            ));
        }
        self.teams.insert(team.id, team);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, id: VolunteerId) -> Option<&VolunteerTeam> {
        self.teams.get(&id)
    }

    pub fn require(&self, id: VolunteerId) -> Result<&VolunteerTeam, DashboardError> {
        self.get(id)
            .ok_or_else(|| DashboardError::not_found(Entity::Volunteer, id))
    }

    pub fn list(
        &self,
        filter: VolunteerFilter,
    ) -> impl Iterator<Item = &VolunteerTeam> + Clone + '_ {
        self.teams.values().filter(move |t| filter.matches(t))
    }

    pub fn count_status(&self, status: VolunteerStatus) -> usize {
        self.teams.values().filter(|t| t.status == status).count()
    }

    /// Available teams able to handle `category`, best rated first.
    ///
    /// Ties keep ascending id order.
    pub fn candidates(&self, category: Category) -> Vec<&VolunteerTeam> {
        let mut teams: Vec<_> = self
            .teams
            .values()
            .filter(|t| t.is_available() && t.can_handle(category))
            .collect();
        teams.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
        });
        teams
    }

    pub(crate) fn set_status(
        &mut self,
        id: VolunteerId,
        status: VolunteerStatus,
    ) -> Result<(), DashboardError> {
        let team = self
            .teams
            .get_mut(&id)
            .ok_or_else(|| DashboardError::not_found(Entity::Volunteer, id))?;
        team.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::Location;
    use crate::domain::volunteer::Skill;

    fn team(id: u32, rating: f32, skills: &[Skill], status: VolunteerStatus) -> VolunteerTeam {
        VolunteerTeam {
            id: VolunteerId(id),
            name: format!("Team {id}"),
            location: Location::new(28.5, 77.2),
            skills: skills.iter().copied().collect(),
            status,
            rating,
            completed_missions: 0,
            contact: format!("+91-900000000{id}"),
        }
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut reg = VolunteerRegistry::default();
        reg.insert(team(1, 4.0, &[Skill::Food], VolunteerStatus::Available))
            .unwrap();
        let err = reg
            .insert(team(1, 3.0, &[Skill::Water], VolunteerStatus::Available))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn candidates_sorted_by_rating_and_skill_aware() {
        let mut reg = VolunteerRegistry::default();
        reg.insert(team(1, 4.2, &[Skill::Medical], VolunteerStatus::Available))
            .unwrap();
        reg.insert(team(2, 4.9, &[Skill::Medical], VolunteerStatus::Available))
            .unwrap();
        reg.insert(team(3, 5.0, &[Skill::Medical], VolunteerStatus::Deployed))
            .unwrap();
        reg.insert(team(4, 5.0, &[Skill::Food], VolunteerStatus::Available))
            .unwrap();

        let ids: Vec<_> = reg
            .candidates(Category::Medical)
            .into_iter()
            .map(|t| t.id.0)
            .collect();
        assert_eq!(ids, [2, 1]);
    }

    #[test]
    fn list_filters_by_status() {
        let mut reg = VolunteerRegistry::default();
        reg.insert(team(1, 4.0, &[Skill::Food], VolunteerStatus::Available))
            .unwrap();
        reg.insert(team(2, 4.0, &[Skill::Food], VolunteerStatus::Deployed))
            .unwrap();
        assert_eq!(reg.list(VolunteerFilter::Available).count(), 1);
        assert_eq!(reg.list(VolunteerFilter::All).count(), 2);
        assert_eq!(reg.count_status(VolunteerStatus::Deployed), 1);
    }

    #[test]
    fn set_status_unknown_is_not_found() {
        let mut reg = VolunteerRegistry::default();
        let err = reg
            .set_status(VolunteerId(9), VolunteerStatus::Deployed)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }
}
