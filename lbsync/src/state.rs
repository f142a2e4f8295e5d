//! Lifecycle states reported by the control plane.
//!
//! A work request and a load balancer each have their own state machine.
//! While a mutation is in flight only the work request is known; once the
//! handoff happens the load balancer's own state takes over. The
//! [`CompositeState`] is whichever of the two is authoritative.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of an asynchronous work request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkRequestState {
    Accepted,
    InProgress,
    Succeeded,
    Failed,
}

impl WorkRequestState {
    /// Whether the work request is still waiting to finish.
    pub fn is_waiting(self) -> bool {
        matches!(self, WorkRequestState::Accepted | WorkRequestState::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkRequestState::Accepted => "Accepted",
            WorkRequestState::InProgress => "InProgress",
            WorkRequestState::Succeeded => "Succeeded",
            WorkRequestState::Failed => "Failed",
        }
    }
}

/// Lifecycle state of a provisioned load balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Provisioning,
    Active,
    Updating,
    Deleting,
    Deleted,
    Failed,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Provisioning => "Provisioning",
            LifecycleState::Active => "Active",
            LifecycleState::Updating => "Updating",
            LifecycleState::Deleting => "Deleting",
            LifecycleState::Deleted => "Deleted",
            LifecycleState::Failed => "Failed",
        }
    }
}

/// The single state derived from whichever of {work request, resource} is
/// currently authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeState {
    /// Neither a work request nor a resource is known yet.
    Unknown,
    Operation(WorkRequestState),
    Resource(LifecycleState),
}

impl CompositeState {
    /// Both non-terminal work request states, i.e. "waiting for the work
    /// request".
    pub const WAITING: [CompositeState; 2] = [
        CompositeState::Operation(WorkRequestState::Accepted),
        CompositeState::Operation(WorkRequestState::InProgress),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CompositeState::Unknown => "",
            CompositeState::Operation(s) => s.as_str(),
            CompositeState::Resource(s) => s.as_str(),
        }
    }
}

impl fmt::Display for CompositeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WorkRequestState> for CompositeState {
    fn from(s: WorkRequestState) -> Self {
        CompositeState::Operation(s)
    }
}

impl From<LifecycleState> for CompositeState {
    fn from(s: LifecycleState) -> Self {
        CompositeState::Resource(s)
    }
}
