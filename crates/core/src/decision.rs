//! DecisionSource trait — the abstraction over whatever picks the
//! next action.
//!
//! Implementations wrap an LLM endpoint (or a scripted queue for
//! tests). A source must retry malformed output internally; the
//! session engine treats a returned `DecisionError` as final and
//! terminates the run.

use crate::action::Action;
use crate::error::DecisionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One capability the active domain offers the agent this iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    /// The action verb.
    pub action_type: String,

    /// What the action does, phrased for the decision source.
    pub description: String,
}

impl Capability {
    pub fn new(action_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            description: description.into(),
        }
    }
}

/// The set of actions available in the current state. While the plan
/// gate is locked this shrinks to the unlock action alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub capabilities: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new(capabilities: Vec<Capability>) -> Self {
        Self { capabilities }
    }

    pub fn names(&self) -> Vec<&str> {
        self.capabilities
            .iter()
            .map(|c| c.action_type.as_str())
            .collect()
    }
}

/// The core decision trait.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// A human-readable name for this source (e.g. "ollama", "scripted").
    fn name(&self) -> &str;

    /// Produce the next action given the composed context.
    ///
    /// The source keeps its own conversation history; the engine only
    /// supplies the fresh context string, the remaining budget, and
    /// the capability set for the active domain.
    async fn next_action(
        &mut self,
        context: &str,
        actions_left: u32,
        capabilities: &CapabilitySet,
    ) -> Result<Action, DecisionError>;

    /// Generate a free-text reflection (used for the session summary).
    async fn reflect(&mut self, prompt: &str) -> Result<String, DecisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_set_names() {
        let set = CapabilitySet::new(vec![
            Capability::new("wiki_search", "Search the wiki"),
            Capability::new("wiki_read", "Read a page"),
        ]);
        assert_eq!(set.names(), ["wiki_search", "wiki_read"]);
    }
}
