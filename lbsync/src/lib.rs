//! Load balancer lifecycle reconciliation.
//!
//! Drives load balancers on a control plane whose mutations complete
//! asynchronously through work requests. A [`LoadBalancerReconciler`]
//! implements Create, Read, Update and Delete against a [`ControlPlane`],
//! persisting progress into a [`ResourceData`] field map so an interrupted
//! call can be resumed by a later Read.

pub mod clients;
pub mod config;
pub mod data;
pub mod error;
pub mod identity;
pub mod materialize;
pub mod poller;
pub mod reconciler;
pub mod resolver;
pub mod schema;
pub mod state;
pub mod tracker;

pub use clients::{ClientError, ControlPlane, MemoryControlPlane};
pub use config::ReconcilerConfig;
pub use data::{FieldValue, ResourceData, Timeouts};
pub use error::{Error, Result};
pub use identity::Identity;
pub use poller::{Refresh, StateWait, WaitOutcome};
pub use reconciler::{LoadBalancerReconciler, ResourceReconciler};
pub use state::{CompositeState, LifecycleState, WorkRequestState};
