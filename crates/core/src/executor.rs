//! Executor trait — the seam between the session engine and the
//! simulated world.
//!
//! `execute` never fails at the call boundary: every dispatch
//! failure, including unknown actions and invalid parameters, is
//! encoded into a failed [`ActionResult`] so the session stays
//! continuable.

use crate::action::{Action, ActionResult};
use crate::decision::CapabilitySet;
use crate::domain::Domain;
use crate::session::PendingAction;
use async_trait::async_trait;

/// Executes agent actions against the backing modules.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Dispatch one action and report its outcome.
    async fn execute(&mut self, action: &Action) -> ActionResult;

    /// The capability set the given domain currently offers.
    fn capabilities(&self, domain: Domain) -> CapabilitySet;

    /// The destructive action currently staged behind the confirm
    /// protocol, if any. The controller mirrors this into the session
    /// record; while set, `capabilities` shrinks to `confirm_action`.
    fn pending_confirmation(&self) -> Option<PendingAction> {
        None
    }
}

/// Read access to the agent's purchased tools. Consumed by views and
/// the shop, never by the session state machine itself.
pub trait Inventory: Send + Sync {
    /// Names of all owned tools.
    fn owned_tools(&self) -> Vec<String>;
}

/// Whether a master plan is active. The loop controller forces the
/// session into the plan domain until this reports true.
pub trait PlanGate: Send + Sync {
    fn has_active_plan(&self) -> bool;
}
