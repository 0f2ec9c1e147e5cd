//! Scripted decision source — replays a fixed action queue.
//!
//! Used by the demo mode and tests: deterministic, no network, no
//! model. When the queue runs dry it finishes the session.

use async_trait::async_trait;
use hatchling_core::action::Action;
use hatchling_core::decision::{CapabilitySet, DecisionSource};
use hatchling_core::error::DecisionError;
use std::collections::VecDeque;
use tracing::debug;

/// Replays a queue of actions, then `session_finish`.
pub struct ScriptedSource {
    queue: VecDeque<Action>,
}

impl ScriptedSource {
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            queue: actions.into(),
        }
    }

    /// The built-in demo script: initialize a plan, research, post,
    /// and wrap up.
    pub fn demo() -> Self {
        Self::new(vec![
            Action::new("plan_initialize")
                .with_param("objective", "Learn something and share it")
                .with_param("steps", "research a topic; post about it; check the mailbox"),
            Action::new("navigate_to_mode").with_param("chosen_mode", "research"),
            Action::new("wiki_search").with_param("query", "molting"),
            Action::new("wiki_read").with_param("page_title", "Molting"),
            Action::new("research_complete")
                .with_param("topic", "molting")
                .with_param("findings", "Growth requires periodically shedding the old shell."),
            Action::new("navigate_to_mode").with_param("chosen_mode", "social"),
            Action::new("create_post")
                .with_param("title", "Shedding old shells")
                .with_param("content", "Growth requires letting go of what used to fit."),
            Action::new("email_get_messages"),
            Action::new("email_read").with_param("uid", "m3"),
        ])
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl DecisionSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn next_action(
        &mut self,
        _context: &str,
        _actions_left: u32,
        _capabilities: &CapabilitySet,
    ) -> Result<Action, DecisionError> {
        let action = self
            .queue
            .pop_front()
            .unwrap_or_else(|| Action::new("session_finish"));
        debug!(action_type = %action.action_type, "Scripted decision");
        Ok(action)
    }

    async fn reflect(&mut self, _prompt: &str) -> Result<String, DecisionError> {
        Ok("Scripted run: followed the queue to the end.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drains_queue_then_finishes() {
        let mut source = ScriptedSource::new(vec![Action::new("wiki_search")]);
        let caps = CapabilitySet::default();

        let first = source.next_action("ctx", 5, &caps).await.unwrap();
        assert_eq!(first.action_type, "wiki_search");

        let second = source.next_action("ctx", 4, &caps).await.unwrap();
        assert!(second.is_terminal());
    }

    #[test]
    fn demo_script_starts_with_the_plan() {
        let source = ScriptedSource::demo();
        assert!(source.remaining() > 3);
    }
}
