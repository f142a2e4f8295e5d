//! Identity held in the external identifier slot.
//!
//! The control plane hands out opaque OCIDs. While a create is in flight the
//! slot holds the work request's OCID so a later read can pick up tracking;
//! once the work request succeeds it is replaced by the load balancer's OCID.

use std::fmt;

use crate::error::{Error, Result};

/// Prefix of work request OCIDs.
pub const WORK_REQUEST_PREFIX: &str = "ocid1.loadbalancerworkrequest.";

/// Prefix of load balancer OCIDs.
pub const LOAD_BALANCER_PREFIX: &str = "ocid1.loadbalancer.";

/// Which kind of handle the identifier slot currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Nothing has been issued yet, or the resource was voided.
    Absent,
    /// An in-flight work request.
    Operation(String),
    /// A provisioned load balancer.
    Resource(String),
}

impl Identity {
    /// Classify an identifier string.
    ///
    /// The work request prefix is checked first; anything carrying neither
    /// prefix is rejected.
    pub fn parse(id: &str) -> Result<Self> {
        if id.is_empty() {
            return Ok(Identity::Absent);
        }
        if id.starts_with(WORK_REQUEST_PREFIX) {
            return Ok(Identity::Operation(id.to_string()));
        }
        if id.starts_with(LOAD_BALANCER_PREFIX) {
            return Ok(Identity::Resource(id.to_string()));
        }
        Err(Error::InvalidState(format!(
            "identifier {id:?} is neither a work request ({WORK_REQUEST_PREFIX}*) \
             nor a load balancer ({LOAD_BALANCER_PREFIX}*)"
        )))
    }

    /// The raw identifier, empty when absent.
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Absent => "",
            Identity::Operation(id) | Identity::Resource(id) => id,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Identity::Absent)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
