//! Live broadcaster — fire-and-forget telemetry toward a viewer.
//!
//! Broadcast failures must never interrupt the loop: implementations
//! swallow errors, mark themselves unavailable, and skip subsequent
//! sends until something external restores the connection.

use crate::action::{Action, ActionResult};
use crate::domain::Domain;
use async_trait::async_trait;

/// Best-effort event feed for a live viewer.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// The composed screen the decision source is about to see.
    async fn broadcast_screen(&mut self, content: &str, domain: Domain, actions_remaining: u32);

    /// An action is about to be dispatched.
    async fn broadcast_action_start(&mut self, action: &Action, domain: Domain);

    /// An action finished dispatching.
    async fn broadcast_result(&mut self, action_type: &str, result: &ActionResult);

    /// The session ended.
    async fn broadcast_session_end(&mut self, session_id: &str, summary: &str);
}

/// A broadcaster that does nothing. Used when no viewer is configured.
#[derive(Debug, Default)]
pub struct NoopBroadcaster;

#[async_trait]
impl Broadcaster for NoopBroadcaster {
    async fn broadcast_screen(&mut self, _content: &str, _domain: Domain, _actions_remaining: u32) {}

    async fn broadcast_action_start(&mut self, _action: &Action, _domain: Domain) {}

    async fn broadcast_result(&mut self, _action_type: &str, _result: &ActionResult) {}

    async fn broadcast_session_end(&mut self, _session_id: &str, _summary: &str) {}
}
