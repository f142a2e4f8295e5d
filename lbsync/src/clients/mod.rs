//! Control-plane client contract.
//!
//! Mutations never complete synchronously: each returns the OCID of a work
//! request that has to be polled. The transport behind this trait is not our
//! concern; `memory` provides an in-process implementation.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{LifecycleState, WorkRequestState};

pub use memory::MemoryControlPlane;

/// Errors returned by a control-plane client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The requested load balancer or work request does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request conflicts with an operation already in flight.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network or protocol failure.
    #[error("transport: {0}")]
    Transport(String),
}

/// Result type for client calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// A tracked asynchronous operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRequest {
    pub id: String,
    pub state: WorkRequestState,
    /// Load balancer the work request acts on. Only guaranteed to be set
    /// once the work request has succeeded.
    pub load_balancer_id: String,
    /// Error detail reported by the control plane, if any.
    pub message: Option<String>,
}

/// An address assigned to a load balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAddress {
    pub ip_address: String,
    pub is_public: bool,
}

/// Observed state of a load balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    pub compartment_id: String,
    pub display_name: String,
    pub shape: String,
    pub subnet_ids: Vec<String>,
    pub ip_addresses: Vec<IpAddress>,
    pub state: LifecycleState,
    pub time_created: DateTime<Utc>,
}

/// Request to create a load balancer.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLoadBalancerRequest {
    pub compartment_id: String,
    pub shape: String,
    pub subnet_ids: Vec<String>,
    pub display_name: String,
}

/// Request to update a load balancer. Only the display name is mutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateLoadBalancerRequest {
    pub display_name: Option<String>,
}

/// Client for the load balancer control plane.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Request creation. Returns the work request OCID.
    async fn create_load_balancer(&self, req: CreateLoadBalancerRequest) -> ClientResult<String>;

    /// Request an update. Returns the work request OCID.
    async fn update_load_balancer(
        &self,
        id: &str,
        req: UpdateLoadBalancerRequest,
    ) -> ClientResult<String>;

    /// Request deletion. Returns the work request OCID.
    async fn delete_load_balancer(&self, id: &str) -> ClientResult<String>;

    /// Fetch a load balancer. Missing balancers yield [`ClientError::NotFound`].
    async fn get_load_balancer(&self, id: &str) -> ClientResult<LoadBalancer>;

    /// Fetch the status of a work request.
    async fn get_work_request(&self, id: &str) -> ClientResult<WorkRequest>;
}
