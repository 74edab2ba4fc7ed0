//! Emergency requests -- the central entity of the dashboard.
//!
//! A request is created pending, moves to in-progress when a volunteer team
//! is dispatched, and ends completed. It is never deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::location::Location;
use crate::domain::volunteer::VolunteerId;
use crate::error::DashboardError;

/// Label given to `created_at` when a request is accepted.
pub const JUST_NOW: &str = "just now";

/// Label used when the priority text is not one of the known levels.
const FALLBACK_RESPONSE: &str = "30 mins";

// ---------------------------------------------------------------------------
// Closed variant sets
// ---------------------------------------------------------------------------

/// Unique, never reused request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of help a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Food,
    Medical,
    Water,
    Shelter,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Medical,
        Category::Water,
        Category::Shelter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Medical => "medical",
            Category::Water => "water",
            Category::Shelter => "shelter",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DashboardError::validation("category", format!("unknown category '{s}'"))
            })
    }
}

/// Urgency of a request. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Every priority, least urgent first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Expected time until a team arrives, as shown on the request card.
    pub fn estimated_response(&self) -> &'static str {
        match self {
            Priority::Critical => "5-10 mins",
            Priority::High => "10-20 mins",
            Priority::Medium => "20-45 mins",
            Priority::Low => "45-90 mins",
        }
    }

    /// Whether the request belongs on the urgent panel.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DashboardError::validation("priority", format!("unknown priority '{s}'"))
            })
    }
}

/// Estimated-response label for raw priority text.
///
/// Total over all inputs: unrecognized text maps to `"30 mins"`.
pub fn estimated_response(priority: &str) -> &'static str {
    priority
        .parse::<Priority>()
        .map(|p| p.estimated_response())
        .unwrap_or(FALLBACK_RESPONSE)
}

/// Priority suggested by the words of a free-text needs description.
///
/// Medical needs rank high, food or water medium, anything else low. The
/// match is a case-insensitive substring test, checked in that order.
pub fn suggest_priority(needs: &str) -> Priority {
    let needs = needs.to_lowercase();
    if needs.contains("medical") {
        Priority::High
    } else if needs.contains("food") || needs.contains("water") {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter for request listings. `"all"` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

impl FromStr for CategoryFilter {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A single emergency request as held by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequest {
    pub id: RequestId,
    pub location: Location,
    pub category: Category,
    pub priority: Priority,
    pub victim_count: u32,
    pub status: RequestStatus,
    pub area: String,
    pub description: String,
    pub contact: String,
    pub reported_by: String,
    /// Relative label shown on the card ("just now", "5 mins ago").
    pub created_at: String,
    /// When the ledger accepted the request.
    pub reported_at: DateTime<Utc>,
    pub estimated_response: String,
    /// Set exactly when the request is in-progress or completed.
    pub assigned_volunteer_id: Option<VolunteerId>,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Caller-supplied fields for a new request.
///
/// Category and priority arrive as text (the form's select values) and are
/// parsed into their closed variant sets by [`validate`](RequestInput::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInput {
    pub category: String,
    pub priority: String,
    pub victim_count: u32,
    pub area: String,
    pub description: String,
    pub contact: String,
    pub reported_by: String,
    pub location: Location,
}

/// Parsed category and priority of a [`RequestInput`] that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Classified {
    pub category: Category,
    pub priority: Priority,
}

impl RequestInput {
    /// Check every required field and parse the closed variants.
    pub(crate) fn validate(&self) -> Result<Classified, DashboardError> {
        require_text("category", &self.category)?;
        require_text("priority", &self.priority)?;
        let category = self.category.parse::<Category>()?;
        let priority = self.priority.parse::<Priority>()?;
        if self.victim_count < 1 {
            return Err(DashboardError::validation(
                "victimCount",
                "at least one person must be affected",
            ));
        }
        require_text("area", &self.area)?;
        require_text("description", &self.description)?;
        require_text("contact", &self.contact)?;
        require_text("reportedBy", &self.reported_by)?;
        self.location.validate()?;
        Ok(Classified { category, priority })
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if value.trim().is_empty() {
        return Err(DashboardError::validation(field, "must not be empty"));
    }
    Ok(())
}
