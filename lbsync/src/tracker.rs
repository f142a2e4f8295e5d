//! Operation tracking for one lifecycle call.
//!
//! [`OperationTracker`] remembers the last work request and the last load
//! balancer seen. Once a load balancer with a handle has been observed it
//! stays authoritative; until then the work request is.

use async_trait::async_trait;

use crate::clients::{ControlPlane, LoadBalancer, WorkRequest};
use crate::data::ResourceData;
use crate::error::Result;
use crate::identity::Identity;
use crate::materialize;
use crate::poller::Refresh;
use crate::resolver;
use crate::schema;
use crate::state::{CompositeState, WorkRequestState};

/// Last known work request and resource.
#[derive(Debug, Clone, Default)]
pub struct OperationTracker {
    work_request: Option<WorkRequest>,
    resource: Option<LoadBalancer>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn work_request(&self) -> Option<&WorkRequest> {
        self.work_request.as_ref()
    }

    pub fn resource(&self) -> Option<&LoadBalancer> {
        self.resource.as_ref()
    }

    /// Remember the latest status of a work request.
    pub fn track(&mut self, work_request: WorkRequest) {
        self.work_request = Some(work_request);
    }

    /// Remember the latest observation of the load balancer.
    pub fn observe(&mut self, resource: LoadBalancer) {
        self.resource = Some(resource);
    }

    /// Drop the work request once its result has been adopted.
    pub fn hand_off(&mut self) -> Option<WorkRequest> {
        self.work_request.take()
    }

    /// Composite state: the resource if known, else the work request.
    pub fn state(&self) -> CompositeState {
        if let Some(lb) = &self.resource {
            return lb.state.into();
        }
        if let Some(wr) = &self.work_request {
            return wr.state.into();
        }
        CompositeState::Unknown
    }

    /// The identity that should be persisted right now.
    pub fn identity(&self) -> Identity {
        if let Some(lb) = self.resource.as_ref().filter(|lb| !lb.id.is_empty()) {
            return Identity::Resource(lb.id.clone());
        }
        match &self.work_request {
            Some(wr)
                if wr.state == WorkRequestState::Succeeded && !wr.load_balancer_id.is_empty() =>
            {
                Identity::Resource(wr.load_balancer_id.clone())
            }
            Some(wr) => Identity::Operation(wr.id.clone()),
            None => Identity::Absent,
        }
    }
}

/// Working set of a single Create/Read/Update/Delete invocation.
///
/// Created at the start of the call and dropped when it returns; never
/// shared between invocations.
pub struct ReconciliationContext<'a> {
    pub client: &'a dyn ControlPlane,
    pub data: &'a mut ResourceData,
    pub tracker: OperationTracker,
}

impl<'a> ReconciliationContext<'a> {
    pub fn new(client: &'a dyn ControlPlane, data: &'a mut ResourceData) -> Self {
        Self {
            client,
            data,
            tracker: OperationTracker::new(),
        }
    }

    /// Identifier currently held in the persisted slot.
    pub fn id(&self) -> &str {
        self.data.id()
    }

    pub fn state(&self) -> CompositeState {
        self.tracker.state()
    }

    /// Write the tracker's current identity into the identifier slot.
    pub fn sync_id(&mut self) {
        let identity = self.tracker.identity();
        self.data.set_id(identity.as_str());
    }

    /// Persist the composite state field.
    pub fn sync_state(&mut self) {
        let state = self.tracker.state();
        self.data.set_str(schema::STATE, state.as_str());
    }

    /// Project the observed resource into the field map.
    pub fn materialize(&mut self) -> bool {
        materialize::materialize(self.tracker.resource(), self.data)
    }

    /// Mark the resource as gone.
    pub fn void_state(&mut self) {
        self.data.set_id("");
    }
}

#[async_trait]
impl<'a> Refresh for ReconciliationContext<'a> {
    async fn refresh(&mut self) -> Result<CompositeState> {
        resolver::resolve(self).await?;
        self.sync_state();
        Ok(self.state())
    }
}
