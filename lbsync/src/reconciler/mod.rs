//! Reconcilers for asynchronously provisioned resources.
//!
//! Each reconciler drives one resource type through its lifecycle: it issues
//! a mutation, follows the resulting work request until the resource settles
//! and writes the observed state back into the host's field map.

pub mod load_balancer;

use async_trait::async_trait;

use crate::data::ResourceData;
use crate::error::Result;

pub use load_balancer::LoadBalancerReconciler;

/// Lifecycle entry points invoked by the host framework.
///
/// The host calls these one at a time per resource instance. Each call owns
/// its field map for the duration of the call.
#[async_trait]
pub trait ResourceReconciler: Send + Sync {
    /// Create the resource described by `data` and wait until it is usable.
    async fn create(&self, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the remote side. Clears the identifier if the
    /// resource no longer exists.
    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    /// Push mutable fields to the remote side.
    async fn update(&self, data: &mut ResourceData) -> Result<()>;

    /// Delete the resource and wait until it is gone.
    async fn delete(&self, data: &mut ResourceData) -> Result<()>;
}
