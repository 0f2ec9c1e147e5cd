//! The mutable session record for one run.
//!
//! Owned exclusively by the loop controller; the ledger and detector
//! are invoked as request/response collaborators and never reach into
//! this struct.

use crate::action::Params;
use crate::domain::Domain;
use crate::event::Event;
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A destructive action staged behind the confirmation protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub action_type: String,
    pub params: Params,
}

/// Mutable, single-owner state for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique id, assigned at creation.
    pub id: SessionId,

    /// Actions left in the budget. Decremented by exactly one per
    /// dispatched action; never negative.
    pub actions_remaining: u32,

    /// The budget the session started with.
    pub budget: u32,

    /// The domain the agent is currently operating in.
    pub current_domain: Domain,

    /// Labeled pins visible in every context until removed.
    pub workspace: Workspace,

    /// Destructive action awaiting confirmation, if any.
    pub pending_action: Option<PendingAction>,

    /// Append-only event log for the whole session.
    pub history: Vec<Event>,
}

impl Session {
    /// Create a fresh session with the given action budget.
    pub fn new(budget: u32) -> Self {
        Self {
            id: SessionId::new(),
            actions_remaining: budget,
            budget,
            current_domain: Domain::Home,
            workspace: Workspace::new(),
            pending_action: None,
            history: Vec::new(),
        }
    }

    /// Actions consumed so far.
    pub fn actions_used(&self) -> u32 {
        self.budget - self.actions_remaining
    }

    /// Consume one budget unit. Saturating: the budget never goes
    /// below zero even if called on an exhausted session.
    pub fn consume_action(&mut self) {
        self.actions_remaining = self.actions_remaining.saturating_sub(1);
    }

    /// Whether the budget is exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.actions_remaining == 0
    }

    /// The trailing `n` events, most recent first.
    pub fn recent_events(&self, n: usize) -> Vec<&Event> {
        self.history.iter().rev().take(n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionResult};

    #[test]
    fn new_session_starts_at_home_with_full_budget() {
        let session = Session::new(30);
        assert_eq!(session.actions_remaining, 30);
        assert_eq!(session.current_domain, Domain::Home);
        assert!(session.history.is_empty());
        assert!(session.pending_action.is_none());
    }

    #[test]
    fn consume_never_goes_negative() {
        let mut session = Session::new(1);
        session.consume_action();
        session.consume_action();
        assert_eq!(session.actions_remaining, 0);
        assert!(session.is_exhausted());
    }

    #[test]
    fn recent_events_most_recent_first() {
        let mut session = Session::new(5);
        for verb in ["first", "second", "third", "fourth"] {
            session.history.push(Event::record(
                Domain::Home,
                &Action::new(verb),
                &ActionResult::ok("ok"),
            ));
        }

        let recent = session.recent_events(3);
        let verbs: Vec<_> = recent.iter().map(|e| e.action_type.as_str()).collect();
        assert_eq!(verbs, ["fourth", "third", "second"]);
    }
}
