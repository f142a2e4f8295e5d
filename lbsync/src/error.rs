//! Error types for lifecycle reconciliation.

use std::time::Duration;

use thiserror::Error;

use crate::clients::ClientError;

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum Error {
    /// The identifier slot is empty or malformed when a read is attempted.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The control plane broke its own contract (e.g. a succeeded work
    /// request without a resource handle).
    #[error("inconsistent response: {0}")]
    InconsistentResponse(String),

    /// The resource (or work request) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A polled state was neither pending nor a target.
    #[error("unexpected state {state:?}, wanted one of {target:?} (pending {pending:?})")]
    UnexpectedState {
        state: String,
        pending: Vec<String>,
        target: Vec<String>,
    },

    /// Polling ran out of time before reaching a target state.
    #[error("timeout after {timeout:?} waiting for {target:?} (last state {last_state:?})")]
    Timeout {
        timeout: Duration,
        last_state: String,
        target: Vec<String>,
    },

    /// A required input field is absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Transport or authentication failure from the control-plane client.
    #[error(transparent)]
    Client(ClientError),
}

impl Error {
    /// Whether this error means the resource is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<ClientError> for Error {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotFound(what) => Error::NotFound(what),
            other => Error::Client(other),
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
