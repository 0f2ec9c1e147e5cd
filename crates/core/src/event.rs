//! The append-only event log of a session.
//!
//! Every dispatched action leaves exactly one immutable `Event`. The
//! repetition detector walks the tail of this log; reporting reads
//! all of it.

use crate::action::{Action, ActionResult, Params};
use crate::domain::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One dispatched action and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Domain the session was in when the action was issued.
    pub domain: Domain,

    /// The action verb.
    pub action_type: String,

    /// Parameters as issued.
    pub params: Params,

    /// Whether dispatch succeeded.
    pub success: bool,

    /// Outcome message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Error message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the action was dispatched.
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Record an action and its result.
    pub fn record(domain: Domain, action: &Action, result: &ActionResult) -> Self {
        Self {
            domain,
            action_type: action.action_type.clone(),
            params: action.params.clone(),
            success: result.success,
            data: result.data.clone(),
            error: result.error.clone(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_captures_action_and_result() {
        let action = Action::new("wiki_search").with_param("query", "rust");
        let result = ActionResult::ok("3 results");
        let event = Event::record(Domain::Research, &action, &result);

        assert_eq!(event.domain, Domain::Research);
        assert_eq!(event.action_type, "wiki_search");
        assert!(event.success);
        assert_eq!(event.data.as_deref(), Some("3 results"));
        assert!(event.error.is_none());
    }

    #[test]
    fn event_serializes() {
        let action = Action::new("email_read");
        let result = ActionResult::fail("no such message");
        let event = Event::record(Domain::Email, &action, &result);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("email_read"));
        assert!(json.contains("no such message"));
    }
}
