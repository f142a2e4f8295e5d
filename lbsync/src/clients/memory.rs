//! In-memory control plane.
//!
//! Behaves like the real service from the caller's point of view: mutations
//! return work requests which only settle after being polled a few times.
//! The inventory can be snapshotted and restored so a CLI session survives
//! between process runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{
    ClientError, ClientResult, ControlPlane, CreateLoadBalancerRequest, IpAddress, LoadBalancer,
    UpdateLoadBalancerRequest, WorkRequest,
};
use crate::identity::{LOAD_BALANCER_PREFIX, WORK_REQUEST_PREFIX};
use crate::state::{LifecycleState, WorkRequestState};

/// What a work request does once it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkKind {
    Create,
    Update,
    Delete,
}

/// A work request together with the bookkeeping needed to settle it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedWorkRequest {
    pub request: WorkRequest,
    pub kind: WorkKind,
    pub target: String,
    pub polls: u32,
    pub display_name: Option<String>,
}

/// Everything the control plane knows about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub load_balancers: BTreeMap<String, LoadBalancer>,
    pub work_requests: BTreeMap<String, TrackedWorkRequest>,
    pub addresses_issued: u32,
}

/// Control plane backed by process memory.
#[derive(Debug)]
pub struct MemoryControlPlane {
    inventory: Mutex<Inventory>,
    settle_after: u32,
}

impl MemoryControlPlane {
    /// Create an empty control plane whose work requests succeed on the
    /// `settle_after`-th poll.
    pub fn new(settle_after: u32) -> Self {
        Self::with_inventory(Inventory::default(), settle_after)
    }

    pub fn with_inventory(inventory: Inventory, settle_after: u32) -> Self {
        Self {
            inventory: Mutex::new(inventory),
            settle_after,
        }
    }

    /// Copy of the current inventory.
    pub fn snapshot(&self) -> ClientResult<Inventory> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> ClientResult<MutexGuard<'_, Inventory>> {
        self.inventory
            .lock()
            .map_err(|_| ClientError::Transport("control plane lock poisoned".to_string()))
    }

    fn submit(
        inv: &mut Inventory,
        kind: WorkKind,
        target: &str,
        display_name: Option<String>,
    ) -> String {
        let id = format!("{}{}", WORK_REQUEST_PREFIX, Uuid::new_v4());
        let load_balancer_id = match kind {
            // Creates only reveal the new balancer once they succeed.
            WorkKind::Create => String::new(),
            WorkKind::Update | WorkKind::Delete => target.to_string(),
        };
        inv.work_requests.insert(
            id.clone(),
            TrackedWorkRequest {
                request: WorkRequest {
                    id: id.clone(),
                    state: WorkRequestState::Accepted,
                    load_balancer_id,
                    message: None,
                },
                kind,
                target: target.to_string(),
                polls: 0,
                display_name,
            },
        );
        id
    }

    /// Move a work request one poll further and apply its effect when it
    /// succeeds.
    fn advance(inv: &mut Inventory, wr_id: &str, settle_after: u32) -> ClientResult<WorkRequest> {
        let tracked = inv
            .work_requests
            .get_mut(wr_id)
            .ok_or_else(|| ClientError::NotFound(wr_id.to_string()))?;

        if !tracked.request.state.is_waiting() {
            return Ok(tracked.request.clone());
        }

        tracked.polls += 1;
        if tracked.polls < settle_after {
            tracked.request.state = if tracked.polls <= 1 {
                WorkRequestState::Accepted
            } else {
                WorkRequestState::InProgress
            };
            return Ok(tracked.request.clone());
        }

        let kind = tracked.kind;
        let target = tracked.target.clone();
        let display_name = tracked.display_name.clone();

        let Some(lb) = inv.load_balancers.get_mut(&target) else {
            tracked.request.state = WorkRequestState::Failed;
            tracked.request.message = Some(format!("load balancer {target} vanished"));
            return Ok(tracked.request.clone());
        };

        match kind {
            WorkKind::Create => lb.state = LifecycleState::Active,
            WorkKind::Update => {
                if let Some(name) = display_name {
                    lb.display_name = name;
                }
                lb.state = LifecycleState::Active;
            }
            WorkKind::Delete => lb.state = LifecycleState::Deleted,
        }

        tracked.request.state = WorkRequestState::Succeeded;
        tracked.request.load_balancer_id = target;
        debug!(work_request = %wr_id, kind = ?kind, "Work request succeeded");
        Ok(tracked.request.clone())
    }

    fn pending_work_for(inv: &Inventory, lb_id: &str) -> Option<String> {
        inv.work_requests
            .values()
            .find(|t| t.target == lb_id && t.request.state.is_waiting())
            .map(|t| t.request.id.clone())
    }
}

#[async_trait]
impl ControlPlane for MemoryControlPlane {
    async fn create_load_balancer(&self, req: CreateLoadBalancerRequest) -> ClientResult<String> {
        let mut inv = self.lock()?;

        let id = format!("{}{}", LOAD_BALANCER_PREFIX, Uuid::new_v4());
        let mut ip_addresses = Vec::with_capacity(req.subnet_ids.len());
        for subnet in 0..req.subnet_ids.len() {
            inv.addresses_issued += 1;
            ip_addresses.push(IpAddress {
                ip_address: format!("10.0.{}.{}", subnet, inv.addresses_issued % 250 + 2),
                is_public: false,
            });
        }

        inv.load_balancers.insert(
            id.clone(),
            LoadBalancer {
                id: id.clone(),
                compartment_id: req.compartment_id,
                display_name: req.display_name,
                shape: req.shape,
                subnet_ids: req.subnet_ids,
                ip_addresses,
                state: LifecycleState::Provisioning,
                time_created: Utc::now(),
            },
        );

        let wr = Self::submit(&mut inv, WorkKind::Create, &id, None);
        debug!(load_balancer = %id, work_request = %wr, "Accepted create");
        Ok(wr)
    }

    async fn update_load_balancer(
        &self,
        id: &str,
        req: UpdateLoadBalancerRequest,
    ) -> ClientResult<String> {
        let mut inv = self.lock()?;
        let lb = inv
            .load_balancers
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
        if lb.state != LifecycleState::Active {
            return Err(ClientError::Conflict(format!(
                "load balancer {id} is {}, not Active",
                lb.state.as_str()
            )));
        }
        lb.state = LifecycleState::Updating;

        let wr = Self::submit(&mut inv, WorkKind::Update, id, req.display_name);
        debug!(load_balancer = %id, work_request = %wr, "Accepted update");
        Ok(wr)
    }

    async fn delete_load_balancer(&self, id: &str) -> ClientResult<String> {
        let mut inv = self.lock()?;
        let lb = inv
            .load_balancers
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
        match lb.state {
            LifecycleState::Deleting | LifecycleState::Deleted => {
                return Err(ClientError::Conflict(format!(
                    "load balancer {id} is already {}",
                    lb.state.as_str()
                )));
            }
            _ => lb.state = LifecycleState::Deleting,
        }

        let wr = Self::submit(&mut inv, WorkKind::Delete, id, None);
        debug!(load_balancer = %id, work_request = %wr, "Accepted delete");
        Ok(wr)
    }

    async fn get_load_balancer(&self, id: &str) -> ClientResult<LoadBalancer> {
        let mut inv = self.lock()?;

        if let Some(wr_id) = Self::pending_work_for(&inv, id) {
            let wr = Self::advance(&mut inv, &wr_id, self.settle_after)?;
            // The effect is visible through the balancer itself.
            if !wr.state.is_waiting() {
                inv.work_requests.remove(&wr_id);
            }
        }

        let lb = inv
            .load_balancers
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;

        // A deleted balancer is observable exactly once.
        if lb.state == LifecycleState::Deleted {
            inv.load_balancers.remove(id);
        }
        Ok(lb)
    }

    /// Finished work requests are reported once and then forgotten.
    async fn get_work_request(&self, id: &str) -> ClientResult<WorkRequest> {
        let mut inv = self.lock()?;
        let wr = Self::advance(&mut inv, id, self.settle_after)?;
        if !wr.state.is_waiting() {
            inv.work_requests.remove(id);
        }
        Ok(wr)
    }
}
