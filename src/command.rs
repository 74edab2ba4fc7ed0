//! Cross-cutting metadata passed alongside a command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used for every wall-clock label shown on the dashboard.
pub const TIME_LABEL_FORMAT: &str = "%H:%M:%S";

/// Cross-cutting metadata passed alongside a command.
///
/// Carries the moment the command was accepted and who issued it, without
/// polluting the command types themselves. The actor stamps `issued_at`
/// from its injected [`Clock`](crate::Clock) so command handlers stay free
/// of I/O and replay deterministically.
///
/// # Examples
///
/// ```
/// use relief_core::CommandContext;
///
/// let ctx = CommandContext::default().with_actor("simulator");
/// assert_eq!(ctx.actor.as_deref(), Some("simulator"));
/// assert_eq!(ctx.time_label(), "00:00:00");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    /// When the command was accepted.
    pub issued_at: DateTime<Utc>,
    /// Identity of whoever issued the command (e.g. "operator", "simulator").
    pub actor: Option<String>,
}

impl CommandContext {
    /// Build a context stamped with `issued_at`.
    pub fn at(issued_at: DateTime<Utc>) -> Self {
        Self {
            issued_at,
            actor: None,
        }
    }

    /// Set the actor identity.
    ///
    /// # Arguments
    ///
    /// * `actor` - Any value convertible to `String` identifying who issued
    ///   the command.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// The `HH:MM:SS` label for `issued_at`.
    pub fn time_label(&self) -> String {
        self.issued_at.format(TIME_LABEL_FORMAT).to_string()
    }
}
