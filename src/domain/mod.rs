//! Dashboard domain types.
//!
//! Each module defines one entity (state, closed variant sets, validation).

pub mod activity;
pub mod location;
pub mod notification;
pub mod request;
pub mod resource;
pub mod volunteer;

pub use activity::{ActivityPoint, RollingWindow};
pub use location::Location;
pub use notification::{Notification, NotificationId, NotificationKind, NotificationQueue};
pub use request::{
    Category, CategoryFilter, EmergencyRequest, Priority, RequestId, RequestInput, RequestStatus,
    estimated_response, suggest_priority,
};
pub use resource::ResourceStock;
pub use volunteer::{Skill, VolunteerFilter, VolunteerId, VolunteerStatus, VolunteerTeam};
