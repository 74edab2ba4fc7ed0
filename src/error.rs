//! Crate-level error types for dashboard operations and mailbox access.

use std::fmt;

/// The three outcome categories a rejected operation can fall into.
///
/// Presentation code usually branches on this rather than on the full
/// [`DashboardError`] so it can pick a message style per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input at a creation or mutation boundary.
    Validation,
    /// Reference to an unknown request, volunteer, or resource type.
    NotFound,
    /// Operation not legal in the entity's current state.
    Conflict,
}

/// Which kind of entity a [`DashboardError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// An emergency request in the ledger.
    Request,
    /// A volunteer team in the registry.
    Volunteer,
    /// A resource stock row in the inventory.
    Resource,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Request => "request",
            Entity::Volunteer => "volunteer",
            Entity::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Error returned when the dashboard rejects an operation.
///
/// Every public operation returns one of these instead of panicking. None
/// of them are retried by the core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending input field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// The referenced entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Which collection was searched.
        entity: Entity,
        /// The identifier that was looked up.
        id: String,
    },

    /// The entity exists but is in the wrong state for this operation.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DashboardError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    /// Returns the outcome category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
        }
    }
}

/// Error returned when executing a command through the state actor fails.
///
/// Generic over `E`, the domain-specific error type that the aggregate's
/// command handler may produce.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError<E: std::error::Error + Send + Sync + 'static> {
    /// Command rejected by aggregate logic.
    #[error(transparent)]
    Domain(E),

    /// Actor thread exited unexpectedly.
    ///
    /// The background actor that owns the state has shut down, so no
    /// further commands can be processed.
    #[error("state actor is no longer running")]
    ActorGone,
}

impl<E: std::error::Error + Send + Sync + 'static> ExecuteError<E> {
    /// Returns the domain error, if this is one.
    pub fn domain(&self) -> Option<&E> {
        match self {
            Self::Domain(e) => Some(e),
            Self::ActorGone => None,
        }
    }
}

impl ExecuteError<DashboardError> {
    /// Returns the outcome category, or `None` when the actor is gone.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.domain().map(DashboardError::kind)
    }
}

impl From<StateError> for ExecuteError<DashboardError> {
    fn from(err: StateError) -> Self {
        match err {
            StateError::ActorGone => Self::ActorGone,
        }
    }
}

/// Error returned when reading the current state through the actor fails.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Actor thread exited unexpectedly.
    #[error("state actor is no longer running")]
    ActorGone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_field() {
        let err = DashboardError::validation("area", "must not be empty");
        assert_eq!(err.to_string(), "invalid area: must not be empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = DashboardError::not_found(Entity::Volunteer, 7);
        assert_eq!(err.to_string(), "volunteer '7' not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn conflict_kind() {
        let err = DashboardError::conflict("volunteer is deployed");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "conflict: volunteer is deployed");
    }

    #[test]
    fn execute_error_domain_displays_inner() {
        let err: ExecuteError<DashboardError> =
            ExecuteError::Domain(DashboardError::conflict("busy"));
        assert_eq!(err.to_string(), "conflict: busy");
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    }

    #[test]
    fn execute_error_actor_gone_has_no_kind() {
        let err: ExecuteError<DashboardError> = StateError::ActorGone.into();
        assert_eq!(err.to_string(), "state actor is no longer running");
        assert_eq!(err.kind(), None);
    }

    // Errors cross the mailbox boundary, so they must be `Send + Sync`.
    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<ExecuteError<DashboardError>>();
            assert_send_sync::<StateError>();
        }
    };
}
