//! Volunteer teams and their availability.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::location::Location;
use crate::domain::request::Category;
use crate::error::DashboardError;

/// Registry-unique team identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolunteerId(pub u32);

impl fmt::Display for VolunteerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something a team is trained and equipped for.
///
/// A superset of [`Category`]: teams also list rescue and transport work,
/// which no request category asks for directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Skill {
    Food,
    Medical,
    Water,
    Shelter,
    Rescue,
    Transport,
}

impl Skill {
    /// Whether this skill answers requests of `category`.
    pub fn covers(&self, category: Category) -> bool {
        matches!(
            (self, category),
            (Skill::Food, Category::Food)
                | (Skill::Medical, Category::Medical)
                | (Skill::Water, Category::Water)
                | (Skill::Shelter, Category::Shelter)
        )
    }
}

/// Whether a team can take a new dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolunteerStatus {
    Available,
    Deployed,
}

impl fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolunteerStatus::Available => "available",
            VolunteerStatus::Deployed => "deployed",
        })
    }
}

/// A responder team. Only `status` changes after seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerTeam {
    pub id: VolunteerId,
    pub name: String,
    pub location: Location,
    pub skills: BTreeSet<Skill>,
    pub status: VolunteerStatus,
    /// Average field rating, `0.0..=5.0`.
    pub rating: f32,
    pub completed_missions: u32,
    pub contact: String,
}

impl VolunteerTeam {
    pub fn is_available(&self) -> bool {
        self.status == VolunteerStatus::Available
    }

    /// Whether any of the team's skills covers `category`.
    pub fn can_handle(&self, category: Category) -> bool {
        self.skills.iter().any(|s| s.covers(category))
    }

    /// Reject a malformed seed row.
    pub(crate) fn validate(&self) -> Result<(), DashboardError> {
        if self.name.trim().is_empty() {
            return Err(DashboardError::validation("name", "must not be empty"));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(DashboardError::validation(
                "rating",
                format!("{} is outside 0-5", self.rating),
            ));
        }
        self.location.validate()
    }
}

/// Status filter for volunteer listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolunteerFilter {
    #[default]
    All,
    Available,
    Deployed,
}

impl VolunteerFilter {
    pub fn matches(&self, team: &VolunteerTeam) -> bool {
        match self {
            VolunteerFilter::All => true,
            VolunteerFilter::Available => team.status == VolunteerStatus::Available,
            VolunteerFilter::Deployed => team.status == VolunteerStatus::Deployed,
        }
    }
}

impl FromStr for VolunteerFilter {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(VolunteerFilter::All),
            "available" => Ok(VolunteerFilter::Available),
            "deployed" => Ok(VolunteerFilter::Deployed),
            other => Err(DashboardError::validation(
                "filter",
                format!("unknown volunteer filter '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(skills: &[Skill]) -> VolunteerTeam {
        VolunteerTeam {
            id: VolunteerId(1),
            name: "Team Alpha".into(),
            location: Location::new(28.6129, 77.2295),
            skills: skills.iter().copied().collect(),
            status: VolunteerStatus::Available,
            rating: 4.8,
            completed_missions: 23,
            contact: "+91-9000000001".into(),
        }
    }

    #[test]
    fn rescue_covers_no_category() {
        let t = team(&[Skill::Rescue, Skill::Transport]);
        assert!(Category::ALL.iter().all(|c| !t.can_handle(*c)));
    }

    #[test]
    fn medical_skill_covers_medical() {
        let t = team(&[Skill::Medical, Skill::Rescue]);
        assert!(t.can_handle(Category::Medical));
        assert!(!t.can_handle(Category::Food));
    }

    #[test]
    fn filter_matches_status() {
        let mut t = team(&[Skill::Food]);
        assert!(VolunteerFilter::Available.matches(&t));
        t.status = VolunteerStatus::Deployed;
        assert!(!VolunteerFilter::Available.matches(&t));
        assert!(VolunteerFilter::Deployed.matches(&t));
        assert!(VolunteerFilter::All.matches(&t));
    }

    #[test]
    fn filter_parse_rejects_unknown() {
        assert_eq!(
            "Available".parse::<VolunteerFilter>().unwrap(),
            VolunteerFilter::Available
        );
        assert!("resting".parse::<VolunteerFilter>().is_err());
    }

    #[test]
    fn rating_out_of_range_is_invalid() {
        let mut t = team(&[Skill::Water]);
        t.rating = 5.5;
        assert!(t.validate().is_err());
    }
}
