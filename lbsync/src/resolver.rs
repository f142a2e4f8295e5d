//! Identity resolution.
//!
//! The identifier slot holds either a work request OCID or a load balancer
//! OCID. Resolving it refreshes whichever one it names; when a work request
//! has succeeded the slot is switched over to the load balancer it produced
//! and the work request is forgotten. The switch happens at most once per
//! context because the slot no longer names the work request afterwards.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::state::WorkRequestState;
use crate::tracker::ReconciliationContext;

/// Outcome of a resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The work request has not succeeded yet; no resource was fetched.
    Pending,
    /// The load balancer was fetched into the tracker.
    Resolved,
}

/// Refresh the tracker from the identity in the slot.
///
/// A missing load balancer surfaces as [`Error::NotFound`] so callers can
/// decide whether that means "gone".
pub async fn resolve(ctx: &mut ReconciliationContext<'_>) -> Result<Resolution> {
    let mut identity = Identity::parse(ctx.id())?;

    if let Identity::Operation(wr_id) = identity.clone() {
        let wr = ctx.client.get_work_request(&wr_id).await?;
        debug!(work_request = %wr_id, state = wr.state.as_str(), "Refreshed work request");

        if wr.state != WorkRequestState::Succeeded {
            ctx.tracker.track(wr);
            return Ok(Resolution::Pending);
        }
        if wr.load_balancer_id.is_empty() {
            return Err(Error::InconsistentResponse(format!(
                "work request {wr_id} succeeded without a load balancer id"
            )));
        }

        info!(
            work_request = %wr_id,
            load_balancer = %wr.load_balancer_id,
            "Work request succeeded, tracking load balancer"
        );
        ctx.data.set_id(wr.load_balancer_id.as_str());
        // Forget any earlier status; the load balancer is authoritative now.
        ctx.tracker.hand_off();
        identity = Identity::parse(ctx.id())?;
    }

    match identity {
        Identity::Resource(lb_id) => {
            let lb = ctx.client.get_load_balancer(&lb_id).await?;
            debug!(load_balancer = %lb_id, state = lb.state.as_str(), "Refreshed load balancer");
            ctx.tracker.observe(lb);
            Ok(Resolution::Resolved)
        }
        Identity::Absent => Err(Error::InvalidState(
            "load balancer has no identifier".to_string(),
        )),
        Identity::Operation(id) => Err(Error::InvalidState(format!(
            "expected a load balancer identifier after hand-off, got {id:?}"
        ))),
    }
}
