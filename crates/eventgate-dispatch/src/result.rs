//! Outcome of a dispatch call.
//!
//! Every recoverable failure becomes a [`CommandResult`] rather than an
//! error, so callers receive a status, a message, and, where it helps them
//! fix their request, an example payload.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status attached to a [`CommandResult`], modelled on HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// The event was queued.
    Accepted,
    /// The request could not be honoured as sent.
    BadRequest,
    /// The principal may not access the named type.
    Forbidden,
    /// The dispatcher could not reach a collaborator it depends on.
    InternalError,
}

impl StatusCode {
    /// Returns the numeric HTTP equivalent.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Accepted => 202,
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::InternalError => 500,
        }
    }

    /// Returns `true` for statuses that signal success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Result of [`crate::CommandDispatcher::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult<O> {
    /// Outcome status.
    pub status: StatusCode,
    /// Encoded payload, currently only the example argument on failures.
    pub payload: Option<O>,
    /// Human-readable outcome.
    pub message: Option<String>,
    /// Extended explanation for failures.
    pub details: Option<String>,
}

impl<O> CommandResult<O> {
    /// Creates an accepted result carrying `message`.
    #[must_use]
    pub fn accepted(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::Accepted, message)
    }

    /// Creates a forbidden result. Forbidden results never carry a payload.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::Forbidden, message)
    }

    /// Creates a failed result with no payload.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BadRequest, message)
    }

    /// Creates an internal-error result.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::InternalError, message)
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: None,
            message: Some(message.into()),
            details: None,
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: O) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches an extended explanation.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns `true` when the event was accepted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the message, or an empty string when none was set.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}
