//! The repetition detector — catches the agent re-issuing the same
//! action and escalates a penalty before the budget drains.
//!
//! An action's signature is built from its verb plus the subset of
//! parameters that identify *what* it targets. Advisory parameters
//! (content text, reasoning) are deliberately excluded: commenting
//! twice on the same post is a repeat even with different words.

use hatchling_core::action::{ACTION_NAVIGATE, Action, Params};
use hatchling_core::event::Event;
use serde_json::Value;

/// Parameter keys that identify an action's target.
pub const SIGNATURE_KEYS: [&str; 11] = [
    "query",
    "page_title",
    "post_id",
    "comment_id",
    "message_id",
    "recipient",
    "category",
    "key",
    "tool_name",
    "label",
    "uid",
];

/// How many trailing events the detector inspects.
pub const DETECTION_WINDOW: usize = 3;

/// Normalized fingerprint of an action.
pub fn signature(action_type: &str, params: &Params) -> String {
    if action_type == ACTION_NAVIGATE {
        let mode = params
            .get("chosen_mode")
            .or_else(|| params.get("mode"))
            .map(normalize)
            .unwrap_or_else(|| "home".into());
        return format!("{ACTION_NAVIGATE}:{mode}");
    }

    let mut pairs: Vec<String> = SIGNATURE_KEYS
        .iter()
        .filter_map(|key| {
            params
                .get(*key)
                .map(|value| format!("{key}={}", normalize(value)))
        })
        .collect();

    if pairs.is_empty() {
        return action_type.to_string();
    }
    pairs.sort();
    format!("{action_type}:{}", pairs.join(":"))
}

fn normalize(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_lowercase(),
        other => other.to_string().trim().to_lowercase(),
    }
}

/// The detector's verdict when an action repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopHit {
    /// Consecutive prior occurrences of the same signature (2 or 3:
    /// below 2 the detector stays silent).
    pub count: u32,

    /// Whether the repeated action is navigation; the warning text
    /// differs.
    pub is_navigation: bool,

    /// The warning surfaced in the next context. Never dropped: it is
    /// the system's only defense against budget-wasting loops.
    pub warning: String,
}

/// Stateless repetition detector over the session's event tail.
#[derive(Debug, Default)]
pub struct RepetitionDetector;

impl RepetitionDetector {
    pub fn new() -> Self {
        Self
    }

    /// Check an action against the trailing events (most recent
    /// first). Returns a hit when this would be at least the third
    /// consecutive occurrence.
    pub fn check(&self, action: &Action, recent: &[&Event]) -> Option<LoopHit> {
        let count = self.consecutive_repeats(action, recent);
        if count < 2 {
            return None;
        }

        let is_navigation = action.action_type == ACTION_NAVIGATE;
        let warning = if is_navigation {
            let target = action
                .str_param("chosen_mode")
                .or_else(|| action.str_param("mode"))
                .unwrap_or("home")
                .to_uppercase();
            format!(
                "🔁 **LOOP WARNING**: You navigated to {target} {times} times in a row. \
                 You are ALREADY in that mode — stop navigating and execute an action from \
                 the list instead. Each repeat costs XP.",
                times = count + 1,
            )
        } else {
            format!(
                "🔁 **LOOP WARNING**: You issued `{verb}` with the same target {times} times \
                 in a row. Change the parameters or pick a DIFFERENT action. Each repeat \
                 costs XP.",
                verb = action.action_type,
                times = count + 1,
            )
        };

        Some(LoopHit {
            count,
            is_navigation,
            warning,
        })
    }

    /// Walk backward through at most [`DETECTION_WINDOW`] events while
    /// their signatures match the action's; stop at the first
    /// mismatch.
    fn consecutive_repeats(&self, action: &Action, recent: &[&Event]) -> u32 {
        let needle = signature(&action.action_type, &action.params);
        let mut count = 0;
        for event in recent.iter().take(DETECTION_WINDOW) {
            if signature(&event.action_type, &event.params) == needle {
                count += 1;
            } else {
                break;
            }
        }
        count
    }
}
