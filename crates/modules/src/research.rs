//! The simulated research module: a tiny wiki with a query cache.

use hatchling_core::action::{Action, ActionResult};
use hatchling_core::error::CollaboratorError;
use hatchling_core::view::DomainView;
use hatchling_core::workspace::Workspace;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ResearchState {
    /// query → page titles returned, kept so repeated research can be
    /// answered from cache.
    query_cache: HashMap<String, Vec<String>>,
    completed_topics: Vec<String>,
}

/// Handles `wiki_*` and `research_*` actions.
pub struct ResearchModule {
    state: Arc<Mutex<ResearchState>>,
    pages: HashMap<&'static str, &'static str>,
}

impl ResearchModule {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ResearchState::default())),
            pages: seed_pages(),
        }
    }

    pub fn view(&self) -> ResearchView {
        ResearchView {
            state: Arc::clone(&self.state),
        }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "wiki_search" => self.search(action),
            "wiki_read" => self.read(action),
            "research_query_cache" => self.cached(action),
            "research_complete" => self.complete(action),
            other => ActionResult::fail(format!("Unknown research action: {other}")),
        }
    }

    fn search(&mut self, action: &Action) -> ActionResult {
        let Some(query) = action.str_param("query") else {
            return ActionResult::fail("wiki_search requires a 'query' parameter.");
        };
        let needle = query.to_lowercase();
        let hits: Vec<String> = self
            .pages
            .iter()
            .filter(|(title, body)| {
                title.to_lowercase().contains(&needle) || body.to_lowercase().contains(&needle)
            })
            .map(|(title, _)| title.to_string())
            .collect();

        self.state
            .lock()
            .expect("research lock poisoned")
            .query_cache
            .insert(needle.clone(), hits.clone());

        if hits.is_empty() {
            return ActionResult::ok(format!("No pages match '{query}'."));
        }
        ActionResult::ok(format!("Pages matching '{query}': {}", hits.join(", ")))
    }

    fn read(&self, action: &Action) -> ActionResult {
        let Some(title) = action.str_param("page_title") else {
            return ActionResult::fail("wiki_read requires a 'page_title' parameter.");
        };
        match self
            .pages
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(title))
        {
            Some((t, body)) => ActionResult::ok(format!("📖 {t}\n\n{body}")),
            None => ActionResult::fail(format!("No wiki page titled '{title}'.")),
        }
    }

    fn cached(&self, action: &Action) -> ActionResult {
        let Some(query) = action.str_param("query") else {
            return ActionResult::fail("research_query_cache requires a 'query' parameter.");
        };
        let state = self.state.lock().expect("research lock poisoned");
        match state.query_cache.get(&query.to_lowercase()) {
            Some(hits) => ActionResult::ok(format!(
                "Cached results for '{query}': {}",
                if hits.is_empty() {
                    "(none)".to_string()
                } else {
                    hits.join(", ")
                }
            )),
            None => ActionResult::fail(format!("'{query}' has not been searched yet.")),
        }
    }

    fn complete(&mut self, action: &Action) -> ActionResult {
        let Some(topic) = action.str_param("topic") else {
            return ActionResult::fail("research_complete requires a 'topic' parameter.");
        };
        let Some(findings) = action.str_param("findings") else {
            return ActionResult::fail("research_complete requires a 'findings' parameter.");
        };
        let mut state = self.state.lock().expect("research lock poisoned");
        if state.completed_topics.iter().any(|t| t == topic) {
            return ActionResult::fail(format!("Research on '{topic}' is already complete."));
        }
        state.completed_topics.push(topic.to_string());

        // Findings get pinned so they survive into later contexts.
        ActionResult::ok(format!("Research on '{topic}' marked complete."))
            .with_pin(format!("research_{topic}"), findings)
    }
}

impl Default for ResearchModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Research dashboard renderer.
pub struct ResearchView {
    state: Arc<Mutex<ResearchState>>,
}

impl DomainView for ResearchView {
    fn list_view(
        &self,
        _result: &ActionResult,
        _workspace: &Workspace,
    ) -> Result<String, CollaboratorError> {
        let state = self.state.lock().map_err(|_| CollaboratorError::ViewFailed {
            domain: "research".into(),
            reason: "state lock poisoned".into(),
        })?;

        let mut out = String::from("## 🔍 RESEARCH TERMINAL\n");
        out.push_str(&format!(
            "Cached queries: {} | Completed topics: {}\n",
            state.query_cache.len(),
            state.completed_topics.len()
        ));
        for topic in &state.completed_topics {
            out.push_str(&format!("✅ {topic}\n"));
        }
        out.push_str("\nUse `wiki_search(query)` then `wiki_read(page_title)`.\n");
        Ok(out)
    }

    fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError> {
        Ok(format!("🔎 Focused research target: {item_id}"))
    }
}

fn seed_pages() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "Molting",
            "Molting is the shedding of an outer layer to allow growth. Many arthropods \
             molt repeatedly through their life cycle.",
        ),
        (
            "Swarm intelligence",
            "Swarm intelligence is collective behavior emerging from decentralized, \
             self-organized systems, natural or artificial.",
        ),
        (
            "Operant conditioning",
            "Operant conditioning shapes behavior through reinforcement and punishment; \
             rewarded behaviors repeat, penalized ones fade.",
        ),
        (
            "Crustacean",
            "Crustaceans form a large arthropod group including crabs, lobsters, and \
             krill, most with hard exoskeletons they periodically molt.",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_fills_the_cache() {
        let mut research = ResearchModule::new();
        let result = research.handle(&Action::new("wiki_search").with_param("query", "molt"));
        assert!(result.success);

        let cached = research.handle(
            &Action::new("research_query_cache").with_param("query", "MOLT"),
        );
        assert!(cached.success);
        assert!(cached.data.unwrap().contains("Molting"));
    }

    #[test]
    fn cache_miss_fails() {
        let mut research = ResearchModule::new();
        let result = research.handle(
            &Action::new("research_query_cache").with_param("query", "unseen"),
        );
        assert!(!result.success);
    }

    #[test]
    fn read_is_case_insensitive() {
        let mut research = ResearchModule::new();
        let result = research.handle(&Action::new("wiki_read").with_param("page_title", "molting"));
        assert!(result.success);
        assert!(result.data.unwrap().contains("shedding"));
    }

    #[test]
    fn complete_pins_findings_once() {
        let mut research = ResearchModule::new();
        let result = research.handle(
            &Action::new("research_complete")
                .with_param("topic", "molting")
                .with_param("findings", "growth requires shedding"),
        );
        assert!(result.success);
        assert!(result.pin_data.unwrap().contains_key("research_molting"));

        let again = research.handle(
            &Action::new("research_complete")
                .with_param("topic", "molting")
                .with_param("findings", "again"),
        );
        assert!(!again.success);
    }
}
