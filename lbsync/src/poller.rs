//! Bounded polling until a target state is reached.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{Error, Result};
use crate::state::CompositeState;

/// Source of fresh states for a [`StateWait`].
#[async_trait]
pub trait Refresh: Send {
    /// Query the remote side and return the current composite state.
    async fn refresh(&mut self) -> Result<CompositeState>;
}

/// How a wait ended successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A target state was observed.
    Reached(CompositeState),
    /// The refresh reported the resource missing and that counts as done.
    Missing,
}

/// Description of a state transition to wait for.
#[derive(Debug, Clone)]
pub struct StateWait {
    pending: Vec<CompositeState>,
    target: Vec<CompositeState>,
    timeout: Duration,
    interval: Duration,
    not_found_is_target: bool,
}

impl StateWait {
    pub fn new(
        pending: impl IntoIterator<Item = CompositeState>,
        target: impl IntoIterator<Item = CompositeState>,
        timeout: Duration,
    ) -> Self {
        Self {
            pending: pending.into_iter().collect(),
            target: target.into_iter().collect(),
            timeout,
            interval: crate::config::DEFAULT_POLL_INTERVAL,
            not_found_is_target: false,
        }
    }

    /// Fixed delay between two refreshes.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Treat a `NotFound` refresh error as having reached the target.
    pub fn not_found_is_target(mut self) -> Self {
        self.not_found_is_target = true;
        self
    }

    /// Refresh until a target state shows up.
    ///
    /// Refresh errors are returned as-is, except `NotFound` when
    /// [`not_found_is_target`](Self::not_found_is_target) is set. A state
    /// outside both sets stops the wait with [`Error::UnexpectedState`].
    pub async fn wait_for<R>(&self, refresher: &mut R) -> Result<WaitOutcome>
    where
        R: Refresh + ?Sized,
    {
        // A timeout too large to represent means no deadline at all.
        let deadline = Instant::now().checked_add(self.timeout);
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let state = match refresher.refresh().await {
                Ok(state) => state,
                Err(e) if e.is_not_found() && self.not_found_is_target => {
                    debug!(attempt, "Resource missing, treating as target");
                    return Ok(WaitOutcome::Missing);
                }
                Err(e) => return Err(e),
            };
            debug!(attempt, state = state.as_str(), "Polled state");

            if self.target.contains(&state) {
                return Ok(WaitOutcome::Reached(state));
            }
            if !self.pending.contains(&state) {
                return Err(Error::UnexpectedState {
                    state: state.to_string(),
                    pending: names(&self.pending),
                    target: names(&self.target),
                });
            }

            let delay = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::Timeout {
                            timeout: self.timeout,
                            last_state: state.to_string(),
                            target: names(&self.target),
                        });
                    }
                    self.interval.min(deadline - now)
                }
                None => self.interval,
            };
            sleep(delay).await;
        }
    }
}

fn names(states: &[CompositeState]) -> Vec<String> {
    states.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::state::{LifecycleState, WorkRequestState};

    const P1: CompositeState = CompositeState::Operation(WorkRequestState::Accepted);
    const P2: CompositeState = CompositeState::Resource(LifecycleState::Provisioning);
    const T: CompositeState = CompositeState::Resource(LifecycleState::Active);
    const X: CompositeState = CompositeState::Resource(LifecycleState::Failed);

    /// Replays a fixed sequence, repeating the last entry forever.
    struct Script {
        replies: VecDeque<Result<CompositeState>>,
        last: CompositeState,
        calls: u32,
    }

    impl Script {
        fn new(replies: Vec<Result<CompositeState>>) -> Self {
            Self {
                replies: replies.into(),
                last: CompositeState::Unknown,
                calls: 0,
            }
        }
    }

    #[async_trait]
    impl Refresh for Script {
        async fn refresh(&mut self) -> Result<CompositeState> {
            self.calls += 1;
            match self.replies.pop_front() {
                Some(Ok(state)) => {
                    self.last = state;
                    Ok(state)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last),
            }
        }
    }

    fn wait() -> StateWait {
        StateWait::new([P1, P2], [T], Duration::from_secs(5)).interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_reaches_target_after_pending() {
        let mut script = Script::new(vec![Ok(P1), Ok(P1), Ok(T)]);
        let outcome = wait().wait_for(&mut script).await.unwrap();
        assert_eq!(outcome, WaitOutcome::Reached(T));
        assert_eq!(script.calls, 3);
    }

    #[tokio::test]
    async fn test_unexpected_state_stops_polling() {
        let mut script = Script::new(vec![Ok(P1), Ok(X)]);
        let err = wait().wait_for(&mut script).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedState { ref state, .. } if state == "Failed"));
        assert_eq!(script.calls, 2);
    }

    #[tokio::test]
    async fn test_times_out_when_stuck_pending() {
        let mut script = Script::new(vec![Ok(P1)]);
        let err = StateWait::new([P1, P2], [T], Duration::from_millis(30))
            .interval(Duration::from_millis(5))
            .wait_for(&mut script)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { ref last_state, .. } if last_state == "Accepted"));
        assert!(script.calls >= 2);
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_waits_without_deadline() {
        let mut script = Script::new(vec![Ok(P2), Ok(P2), Ok(T)]);
        let outcome = StateWait::new([P1, P2], [T], Duration::MAX)
            .interval(Duration::from_millis(1))
            .wait_for(&mut script)
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Reached(T));
        assert_eq!(script.calls, 3);
    }

    #[tokio::test]
    async fn test_refresh_error_propagates() {
        let mut script = Script::new(vec![Ok(P1), Err(Error::NotFound("lb".to_string()))]);
        let err = wait().wait_for(&mut script).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(script.calls, 2);
    }

    #[tokio::test]
    async fn test_not_found_can_count_as_target() {
        let mut script = Script::new(vec![Ok(P1), Err(Error::NotFound("lb".to_string()))]);
        let outcome = wait()
            .not_found_is_target()
            .wait_for(&mut script)
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Missing);
    }

    #[tokio::test]
    async fn test_other_errors_still_propagate_with_not_found_target() {
        let mut script = Script::new(vec![Err(Error::InvalidState("empty".to_string()))]);
        let err = wait()
            .not_found_is_target()
            .wait_for(&mut script)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(script.calls, 1);
    }
}
