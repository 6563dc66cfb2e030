use std::fmt;

use thiserror::Error;

/// Failure of a validator: which field, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalid {
    pub field: &'static str,
    pub reason: String,
}

impl Invalid {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors surfaced by the coordinators.
///
/// Every variant except `Remote` and `NotFound` is raised before any
/// network call is made.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("instance '{instance}' is already a member of group {group_id}")]
    DuplicateMember { group_id: String, instance: String },

    #[error("session status cannot change from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// The gateway rejected the call or could not be reached. `source` holds
    /// the transport or decode failure when there was one.
    #[error("{message}")]
    Remote {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// True for the kinds that are resolved locally, without a round trip.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvariantViolation(_)
                | Self::DuplicateMember { .. }
                | Self::InvalidTransition { .. }
        )
    }
}

impl From<Invalid> for Error {
    fn from(invalid: Invalid) -> Self {
        Self::Validation {
            field: invalid.field,
            reason: invalid.reason,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
