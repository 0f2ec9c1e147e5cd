//! The memory module — labeled notes the agent stores and recalls.
//!
//! Memory operations are sticky: they never move the session to
//! another domain.

use hatchling_core::action::{Action, ActionResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MemoryState {
    notes: HashMap<String, String>,
}

/// Handles `memory_*` actions.
pub struct MemoryModule {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryModule {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "memory_store" => self.store(action),
            "memory_retrieve" => self.retrieve(action),
            other => ActionResult::fail(format!("Unknown memory action: {other}")),
        }
    }

    fn store(&mut self, action: &Action) -> ActionResult {
        let Some(key) = action.str_param("key") else {
            return ActionResult::fail("memory_store requires a 'key' parameter.");
        };
        let Some(content) = action.str_param("content") else {
            return ActionResult::fail("memory_store requires a 'content' parameter.");
        };
        self.state
            .lock()
            .expect("memory lock poisoned")
            .notes
            .insert(key.to_string(), content.to_string());
        ActionResult::ok(format!("Memory stored under '{key}'."))
    }

    fn retrieve(&self, action: &Action) -> ActionResult {
        let Some(key) = action.str_param("key") else {
            return ActionResult::fail("memory_retrieve requires a 'key' parameter.");
        };
        let state = self.state.lock().expect("memory lock poisoned");
        match state.notes.get(key) {
            Some(content) => ActionResult::ok(format!("Recalled '{key}': {content}")),
            None => ActionResult::fail(format!("Nothing stored under '{key}'.")),
        }
    }
}

impl Default for MemoryModule {
    fn default() -> Self {
        Self::new()
    }
}
