//! Access control for event types.

use std::collections::BTreeSet;

use thiserror::Error;

/// Authenticated caller on whose behalf an event is queued.
///
/// # Example
///
/// ```
/// use eventgate_dispatch::Principal;
///
/// let clerk = Principal::new("alice").with_role("sales");
/// assert!(clerk.has_role("sales"));
/// assert!(!clerk.has_role("admin"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    name: String,
    roles: BTreeSet<String>,
}

impl Principal {
    /// Creates a principal with no roles.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::new(),
        }
    }

    /// Grants a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Returns the principal name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns `true` when the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Iterates over the granted roles in sorted order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

/// Decides whether a principal may act on a named resource.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionManager: Send + Sync {
    /// Returns `true` when `principal` may access `resource`.
    fn can_access(&self, resource: &str, principal: &Principal) -> bool;
}

/// Security violation raised by a collaborator.
///
/// Dispatch never converts this into a [`crate::CommandResult`]; it reaches
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("security violation: {message}")]
pub struct SecurityFault {
    message: String,
}

impl SecurityFault {
    /// Creates a fault with a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the description.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}
