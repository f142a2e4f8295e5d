//! Load balancer reconciler.
//!
//! Lifecycle: absent → work request accepted → provisioning → active, then
//! updating → active, or deleting → deleted. Create and Delete block until a
//! terminal state (bounded by the per-call timeouts); Update only captures
//! the work request it started.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ResourceReconciler;
use crate::clients::{ControlPlane, CreateLoadBalancerRequest, UpdateLoadBalancerRequest};
use crate::config::ReconcilerConfig;
use crate::data::ResourceData;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::poller::{StateWait, WaitOutcome};
use crate::resolver::{self, Resolution};
use crate::schema;
use crate::state::{CompositeState, LifecycleState};
use crate::tracker::{OperationTracker, ReconciliationContext};

/// Reconciles load balancers against the control plane.
pub struct LoadBalancerReconciler {
    client: Arc<dyn ControlPlane>,
    config: ReconcilerConfig,
}

impl LoadBalancerReconciler {
    pub fn new(client: Arc<dyn ControlPlane>, config: ReconcilerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    fn context<'a>(&'a self, data: &'a mut ResourceData) -> ReconciliationContext<'a> {
        ReconciliationContext::new(self.client.as_ref(), data)
    }

    fn create_wait(&self, data: &ResourceData) -> StateWait {
        let pending = CompositeState::WAITING
            .into_iter()
            .chain([CompositeState::Resource(LifecycleState::Provisioning)]);
        let target = [CompositeState::Resource(LifecycleState::Active)];
        StateWait::new(pending, target, data.timeouts.create)
            .interval(self.config.poll_interval)
    }

    fn delete_wait(&self, data: &ResourceData) -> StateWait {
        let pending = CompositeState::WAITING
            .into_iter()
            .chain([CompositeState::Resource(LifecycleState::Deleting)]);
        let target = [CompositeState::Resource(LifecycleState::Deleted)];
        StateWait::new(pending, target, data.timeouts.delete)
            .interval(self.config.poll_interval)
            .not_found_is_target()
    }
}

/// Build the create request from user input.
fn create_request(data: &ResourceData) -> Result<CreateLoadBalancerRequest> {
    schema::validate_required(data)?;
    let string = |key: &'static str| {
        data.get_str(key)
            .map(str::to_string)
            .ok_or(Error::MissingField(key))
    };
    Ok(CreateLoadBalancerRequest {
        compartment_id: string(schema::COMPARTMENT_ID)?,
        shape: string(schema::SHAPE)?,
        subnet_ids: data
            .get_list(schema::SUBNET_IDS)
            .map(<[String]>::to_vec)
            .ok_or(Error::MissingField(schema::SUBNET_IDS))?,
        display_name: string(schema::DISPLAY_NAME)?,
    })
}

/// Build the update request from the fields that may change in place.
/// Empty values are left out.
fn update_request(data: &ResourceData) -> UpdateLoadBalancerRequest {
    let mut req = UpdateLoadBalancerRequest::default();
    for field in schema::mutable_fields() {
        let Some(value) = data.get_str(field.name).filter(|v| !v.is_empty()) else {
            continue;
        };
        if field.name == schema::DISPLAY_NAME {
            req.display_name = Some(value.to_string());
        }
    }
    req
}

/// Resolve the identifier slot to a load balancer OCID.
///
/// A slot still naming the create work request is resolved first; if that
/// work request has not finished there is no load balancer to act on yet.
async fn require_load_balancer(ctx: &mut ReconciliationContext<'_>) -> Result<String> {
    match Identity::parse(ctx.id())? {
        Identity::Resource(id) => Ok(id),
        Identity::Operation(wr_id) => match resolver::resolve(ctx).await? {
            Resolution::Resolved => Ok(ctx.id().to_string()),
            Resolution::Pending => Err(Error::InvalidState(format!(
                "work request {wr_id} is still {}, no load balancer to act on",
                ctx.state()
            ))),
        },
        Identity::Absent => Err(Error::InvalidState(
            "load balancer has no identifier".to_string(),
        )),
    }
}

fn log_work_request_failure(ctx: &ReconciliationContext<'_>, err: &Error) {
    if let Some(message) = ctx.tracker.work_request().and_then(|wr| wr.message.as_deref()) {
        warn!(id = %ctx.id(), error = %err, detail = message, "Work request reported a failure");
    }
}

#[async_trait]
impl ResourceReconciler for LoadBalancerReconciler {
    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let req = create_request(data)?;
        let wait = self.create_wait(data);
        let mut ctx = self.context(data);

        info!(
            display_name = %req.display_name,
            compartment = %req.compartment_id,
            shape = %req.shape,
            "Creating load balancer"
        );
        let wr_id = ctx.client.create_load_balancer(req).await?;

        // Record the work request before anything else can fail so a later
        // read resumes tracking it instead of a retry creating a duplicate.
        ctx.data.set_id(wr_id.as_str());

        let wr = ctx.client.get_work_request(&wr_id).await?;
        ctx.tracker.track(wr);
        ctx.sync_state();
        ctx.sync_id();
        info!(id = %ctx.id(), state = %ctx.state(), "Create accepted, waiting for load balancer");

        if let Err(e) = wait.wait_for(&mut ctx).await {
            log_work_request_failure(&ctx, &e);
            return Err(e);
        }

        ctx.sync_id();
        ctx.materialize();
        info!(id = %ctx.id(), state = %ctx.state(), "Load balancer created");
        Ok(())
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let mut ctx = self.context(data);

        match resolver::resolve(&mut ctx).await {
            Ok(Resolution::Pending) => {
                ctx.sync_state();
                info!(id = %ctx.id(), state = %ctx.state(), "Work request still in flight");
                Ok(())
            }
            Ok(Resolution::Resolved) => {
                if ctx.state() == CompositeState::Resource(LifecycleState::Deleted) {
                    warn!(id = %ctx.id(), "Load balancer is deleted, removing from state");
                    ctx.void_state();
                    return Ok(());
                }
                ctx.materialize();
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!(id = %ctx.id(), "Load balancer not found, removing from state");
                ctx.void_state();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let mut ctx = self.context(data);
        let id = require_load_balancer(&mut ctx).await?;
        ctx.tracker = OperationTracker::new();

        let req = update_request(ctx.data);

        info!(id = %id, display_name = ?req.display_name, "Updating load balancer");
        let wr_id = ctx.client.update_load_balancer(&id, req).await?;
        let wr = ctx.client.get_work_request(&wr_id).await?;
        ctx.tracker.track(wr);

        // No wait here: the state is left at the work request's status.
        ctx.sync_state();
        ctx.materialize();
        info!(id = %id, work_request = %wr_id, state = %ctx.state(), "Update submitted");
        Ok(())
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let wait = self.delete_wait(data);
        let mut ctx = self.context(data);
        let id = require_load_balancer(&mut ctx).await?;
        ctx.tracker = OperationTracker::new();

        info!(id = %id, "Deleting load balancer");
        let wr_id = ctx.client.delete_load_balancer(&id).await?;
        let wr = ctx.client.get_work_request(&wr_id).await?;
        ctx.tracker.track(wr);

        match wait.wait_for(&mut ctx).await {
            Ok(WaitOutcome::Reached(_)) => {
                info!(id = %id, "Load balancer deleted");
            }
            Ok(WaitOutcome::Missing) => {
                info!(id = %id, "Load balancer no longer exists, treating as deleted");
            }
            Err(e) => {
                log_work_request_failure(&ctx, &e);
                return Err(e);
            }
        }

        ctx.void_state();
        Ok(())
    }
}
