//! Domain views — per-domain screen body producers.
//!
//! A view renders the body of the context for its domain: the feed
//! listing, the inbox, the shop catalog. Domains without a registered
//! view fall back to a generic status line, so a missing view can
//! never break the loop.

use crate::action::ActionResult;
use crate::domain::Domain;
use crate::error::CollaboratorError;
use crate::workspace::Workspace;
use std::collections::HashMap;

/// Renders the context body for one domain.
pub trait DomainView: Send + Sync {
    /// The overview screen: listings, queues, counters.
    fn list_view(
        &self,
        result: &ActionResult,
        workspace: &Workspace,
    ) -> Result<String, CollaboratorError>;

    /// A single item in focus (post, message, article, wiki page).
    fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError>;
}

/// Registry mapping domains to their views.
#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<Domain, Box<dyn DomainView>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view. Replaces any existing view for the domain.
    pub fn register(&mut self, domain: Domain, view: Box<dyn DomainView>) {
        self.views.insert(domain, view);
    }

    pub fn get(&self, domain: Domain) -> Option<&dyn DomainView> {
        self.views.get(&domain).map(|v| v.as_ref())
    }

    pub fn registered_domains(&self) -> Vec<Domain> {
        self.views.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubView;

    impl DomainView for StubView {
        fn list_view(
            &self,
            _result: &ActionResult,
            _workspace: &Workspace,
        ) -> Result<String, CollaboratorError> {
            Ok("list".into())
        }

        fn focus_view(&self, item_id: &str) -> Result<String, CollaboratorError> {
            Ok(format!("focus:{item_id}"))
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ViewRegistry::new();
        registry.register(Domain::Social, Box::new(StubView));

        assert!(registry.get(Domain::Social).is_some());
        assert!(registry.get(Domain::Email).is_none());
    }

    #[test]
    fn focus_view_receives_item_id() {
        let mut registry = ViewRegistry::new();
        registry.register(Domain::Blog, Box::new(StubView));

        let view = registry.get(Domain::Blog).unwrap();
        assert_eq!(view.focus_view("a7").unwrap(), "focus:a7");
    }
}
