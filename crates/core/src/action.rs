//! Action and ActionResult — the value objects that flow through
//! every loop iteration.
//!
//! The decision source emits an `Action`, the executor turns it into
//! an `ActionResult`, and the session engine reacts to both. Advisory
//! text fields (`reasoning`, `self_criticism`, ...) are carried for
//! observability only and never affect control flow.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dynamic action parameters as emitted by the decision source.
pub type Params = serde_json::Map<String, Value>;

/// The generic "navigate to mode" action type.
pub const ACTION_NAVIGATE: &str = "navigate_to_mode";
/// The dedicated "visit shop" action type.
pub const ACTION_VISIT_SHOP: &str = "visit_shop";
/// The explicit session end action type.
pub const ACTION_FINISH: &str = "session_finish";
/// Workspace pin action type.
pub const ACTION_PIN: &str = "pin_to_workspace";
/// Workspace unpin action type.
pub const ACTION_UNPIN: &str = "unpin_from_workspace";
/// Confirmation of a previously staged destructive action.
pub const ACTION_CONFIRM: &str = "confirm_action";

/// One agent decision for one loop iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// The action verb, e.g. `comment_post`, `email_send`.
    pub action_type: String,

    /// Free-form parameters. Validated into [`ControlAction`] for the
    /// built-in verbs; module handlers validate their own subset.
    #[serde(default)]
    pub params: Params,

    /// Why the agent chose this action. Observability only.
    #[serde(default)]
    pub reasoning: String,

    /// The agent's critique of its own plan. Observability only.
    #[serde(default)]
    pub self_criticism: String,

    /// Declared emotional state. Observability only.
    #[serde(default)]
    pub emotions: String,

    /// What the agent expects to do next. Observability only.
    #[serde(default)]
    pub next_move_preview: String,
}

impl Action {
    /// Create a bare action with no parameters.
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            params: Params::new(),
            reasoning: String::new(),
            self_criticism: String::new(),
            emotions: String::new(),
            next_move_preview: String::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Whether this action explicitly ends the session.
    pub fn is_terminal(&self) -> bool {
        self.action_type == ACTION_FINISH
    }

    /// A parameter as a trimmed string, if present and non-empty.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(Value::String(s)) => {
                let s = s.trim();
                (!s.is_empty()).then_some(s)
            }
            _ => None,
        }
    }
}

/// The built-in control actions, parsed and validated out of the
/// dynamic parameter map before the session engine touches them.
/// Module-specific verbs stay as raw `Action`s; the engine only needs
/// this enumerated subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    /// `navigate_to_mode` — target defaults to `home` when unspecified.
    NavigateToMode { mode: Domain },
    /// `visit_shop`.
    VisitShop,
    /// `pin_to_workspace` — both fields required.
    PinWorkspace { label: String, content: String },
    /// `unpin_from_workspace`.
    UnpinWorkspace { label: String },
    /// `confirm_action` — `approved` is the yes/no decision.
    ConfirmAction { approved: bool },
    /// `session_finish`.
    FinishSession,
}

impl ControlAction {
    /// Parse an action into a control action.
    ///
    /// Returns `Ok(None)` for module-level verbs, `Err` when the verb
    /// is a control verb but its parameters do not validate.
    pub fn parse(action: &Action) -> std::result::Result<Option<Self>, String> {
        match action.action_type.as_str() {
            ACTION_NAVIGATE => {
                let raw = action
                    .str_param("chosen_mode")
                    .or_else(|| action.str_param("mode"))
                    .unwrap_or("home");
                let mode = raw
                    .parse::<Domain>()
                    .map_err(|e| format!("navigate_to_mode: {e}"))?;
                Ok(Some(ControlAction::NavigateToMode { mode }))
            }
            ACTION_VISIT_SHOP => Ok(Some(ControlAction::VisitShop)),
            ACTION_PIN => {
                let label = action
                    .str_param("label")
                    .ok_or("pin_to_workspace: missing 'label'")?
                    .to_string();
                let content = action
                    .str_param("content")
                    .ok_or("pin_to_workspace: cannot pin empty content")?
                    .to_string();
                Ok(Some(ControlAction::PinWorkspace { label, content }))
            }
            ACTION_UNPIN => {
                let label = action
                    .str_param("label")
                    .ok_or("unpin_from_workspace: missing 'label'")?
                    .to_string();
                Ok(Some(ControlAction::UnpinWorkspace { label }))
            }
            ACTION_CONFIRM => {
                let decision = action.str_param("decision").unwrap_or("no");
                Ok(Some(ControlAction::ConfirmAction {
                    approved: decision.eq_ignore_ascii_case("yes"),
                }))
            }
            ACTION_FINISH => Ok(Some(ControlAction::FinishSession)),
            _ => Ok(None),
        }
    }
}

/// The outcome of dispatching one action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action took effect.
    pub success: bool,

    /// Human-readable outcome for the next context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Explicit navigation target. Only honored when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,

    /// Workspace pins to add, label → content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_data: Option<Params>,

    /// Workspace pin to remove.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpin_label: Option<String>,
}

impl ActionResult {
    /// A successful result with a message.
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// A failed result with an error message.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Attach a navigation target.
    pub fn with_navigate(mut self, domain: Domain) -> Self {
        self.navigate_to = Some(domain.to_string());
        self
    }

    /// Attach a workspace pin.
    pub fn with_pin(mut self, label: impl Into<String>, content: impl Into<Value>) -> Self {
        self.pin_data
            .get_or_insert_with(Params::new)
            .insert(label.into(), content.into());
        self
    }

    /// Attach an unpin instruction.
    pub fn with_unpin(mut self, label: impl Into<String>) -> Self {
        self.unpin_label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_action_detection() {
        assert!(Action::new("session_finish").is_terminal());
        assert!(!Action::new("email_send").is_terminal());
    }

    #[test]
    fn navigate_parses_mode() {
        let action = Action::new("navigate_to_mode").with_param("chosen_mode", "SOCIAL");
        let parsed = ControlAction::parse(&action).unwrap().unwrap();
        assert_eq!(
            parsed,
            ControlAction::NavigateToMode {
                mode: Domain::Social
            }
        );
    }

    #[test]
    fn navigate_defaults_to_home() {
        let action = Action::new("navigate_to_mode");
        let parsed = ControlAction::parse(&action).unwrap().unwrap();
        assert_eq!(parsed, ControlAction::NavigateToMode { mode: Domain::Home });
    }

    #[test]
    fn navigate_rejects_unknown_mode() {
        let action = Action::new("navigate_to_mode").with_param("chosen_mode", "narnia");
        assert!(ControlAction::parse(&action).is_err());
    }

    #[test]
    fn pin_requires_content() {
        let action = Action::new("pin_to_workspace").with_param("label", "note");
        assert!(ControlAction::parse(&action).is_err());

        let action = action.with_param("content", "remember this");
        let parsed = ControlAction::parse(&action).unwrap().unwrap();
        assert_eq!(
            parsed,
            ControlAction::PinWorkspace {
                label: "note".into(),
                content: "remember this".into()
            }
        );
    }

    #[test]
    fn confirm_decision_is_case_insensitive() {
        let action = Action::new("confirm_action").with_param("decision", "YES");
        let parsed = ControlAction::parse(&action).unwrap().unwrap();
        assert_eq!(parsed, ControlAction::ConfirmAction { approved: true });
    }

    #[test]
    fn module_verbs_are_not_control_actions() {
        let action = Action::new("comment_post").with_param("post_id", "p1");
        assert!(ControlAction::parse(&action).unwrap().is_none());
    }

    #[test]
    fn result_builders() {
        let result = ActionResult::ok("done")
            .with_navigate(Domain::Shop)
            .with_pin("draft", "text")
            .with_unpin("old");
        assert!(result.success);
        assert_eq!(result.navigate_to.as_deref(), Some("shop"));
        assert!(result.pin_data.unwrap().contains_key("draft"));
        assert_eq!(result.unpin_label.as_deref(), Some("old"));
    }
}
