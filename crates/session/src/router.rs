//! The domain router — a pure function from an executed action and
//! its result to the next active domain.
//!
//! Priority order, which must not be reordered:
//! 1. A successful result carrying `navigate_to` always wins.
//! 2. The dedicated `visit_shop` action goes to the shop.
//! 3. `navigate_to_mode` goes to the requested mode (default home).
//! 4. Non-sticky actions resolve through the action→domain table,
//!    falling back to the verb's first token.
//! 5. Sticky actions leave the domain unchanged.

use hatchling_core::action::{ACTION_NAVIGATE, ACTION_VISIT_SHOP, Action, ActionResult};
use hatchling_core::domain::Domain;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Static routing configuration: the action→domain table and the set
/// of sticky actions that never change domain.
pub struct RouterTable {
    action_to_domain: HashMap<String, Domain>,
    sticky: HashSet<String>,
}

impl RouterTable {
    /// The built-in table covering every module action family.
    pub fn with_defaults() -> Self {
        let mut action_to_domain = HashMap::new();

        // Verbs whose first token does not name their domain.
        for verb in [
            "read_post",
            "select_post_to_comment",
            "select_comment_to_reply",
            "comment_post",
            "reply_to_comment",
            "create_post",
            "vote_post",
            "follow_agent",
            "share_link",
        ] {
            action_to_domain.insert(verb.to_string(), Domain::Social);
        }
        for verb in [
            "write_blog_article",
            "review_pending_comments",
            "approve_comment",
            "reject_comment",
            "share_blog_article",
        ] {
            action_to_domain.insert(verb.to_string(), Domain::Blog);
        }
        for verb in ["wiki_search", "wiki_read", "research_query_cache", "research_complete"] {
            action_to_domain.insert(verb.to_string(), Domain::Research);
        }
        for verb in ["buy_tool"] {
            action_to_domain.insert(verb.to_string(), Domain::Shop);
        }

        let sticky = [
            "pin_to_workspace",
            "unpin_from_workspace",
            "memory_store",
            "memory_retrieve",
            "confirm_action",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            action_to_domain,
            sticky,
        }
    }

    /// Mark an action as sticky.
    pub fn add_sticky(&mut self, action_type: impl Into<String>) {
        self.sticky.insert(action_type.into());
    }

    /// Add or replace a table entry.
    pub fn map_action(&mut self, action_type: impl Into<String>, domain: Domain) {
        self.action_to_domain.insert(action_type.into(), domain);
    }

    pub fn is_sticky(&self, action_type: &str) -> bool {
        self.sticky.contains(action_type)
    }

    pub fn lookup(&self, action_type: &str) -> Option<Domain> {
        self.action_to_domain.get(action_type).copied()
    }
}

impl Default for RouterTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Compute the next domain for a finished iteration.
pub fn route(
    table: &RouterTable,
    current: Domain,
    action: &Action,
    result: &ActionResult,
) -> Domain {
    // Rule 1: explicit navigation from the executor always wins,
    // even when the action itself implies a different domain.
    if result.success {
        if let Some(target) = result.navigate_to.as_deref() {
            match target.parse::<Domain>() {
                Ok(domain) => {
                    debug!(%domain, "Router honoring explicit navigate_to");
                    return domain;
                }
                Err(e) => {
                    warn!(target, %e, "Ignoring unparseable navigate_to target");
                }
            }
        }
    }

    // Rule 2: the dedicated shop entrance.
    if action.action_type == ACTION_VISIT_SHOP {
        return Domain::Shop;
    }

    // Rule 3: generic navigation, defaulting to home.
    if action.action_type == ACTION_NAVIGATE {
        let raw = action
            .str_param("chosen_mode")
            .or_else(|| action.str_param("mode"))
            .unwrap_or("home");
        return raw.parse::<Domain>().unwrap_or(Domain::Home);
    }

    // Rule 5 (checked before 4): sticky actions never move the session.
    if table.is_sticky(&action.action_type) {
        return current;
    }

    // Rule 4: table lookup, then the verb's first token.
    if let Some(domain) = table.lookup(&action.action_type) {
        return domain;
    }
    let first_token = action
        .action_type
        .split('_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match first_token.parse::<Domain>() {
        Ok(domain) => domain,
        // A verb whose first token names no domain stays put.
        Err(_) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchling_core::action::Action;

    fn table() -> RouterTable {
        RouterTable::with_defaults()
    }

    #[test]
    fn navigate_to_in_result_always_wins() {
        // comment_post maps to social by table, but the executor says email.
        let action = Action::new("comment_post").with_param("post_id", "p1");
        let mut result = ActionResult::ok("done");
        result.navigate_to = Some("EMAIL".into());

        let next = route(&table(), Domain::Home, &action, &result);
        assert_eq!(next, Domain::Email);
    }

    #[test]
    fn navigate_to_requires_success() {
        let action = Action::new("comment_post");
        let mut result = ActionResult::fail("nope");
        result.navigate_to = Some("EMAIL".into());

        let next = route(&table(), Domain::Social, &action, &result);
        assert_eq!(next, Domain::Social);
    }

    #[test]
    fn visit_shop_routes_to_shop_without_navigate_to() {
        let action = Action::new("visit_shop");
        let result = ActionResult::ok("welcome");
        let next = route(&table(), Domain::Home, &action, &result);
        assert_eq!(next, Domain::Shop);
    }

    #[test]
    fn visit_shop_loses_to_explicit_navigate() {
        let action = Action::new("visit_shop");
        let mut result = ActionResult::ok("redirect");
        result.navigate_to = Some("blog".into());
        let next = route(&table(), Domain::Home, &action, &result);
        assert_eq!(next, Domain::Blog);
    }

    #[test]
    fn navigate_to_mode_uses_requested_mode() {
        let action = Action::new("navigate_to_mode").with_param("chosen_mode", "research");
        let result = ActionResult::ok("moved");
        let next = route(&table(), Domain::Home, &action, &result);
        assert_eq!(next, Domain::Research);
    }

    #[test]
    fn navigate_to_mode_defaults_to_home() {
        let action = Action::new("navigate_to_mode");
        let result = ActionResult::ok("moved");
        let next = route(&table(), Domain::Blog, &action, &result);
        assert_eq!(next, Domain::Home);
    }

    #[test]
    fn sticky_actions_keep_current_domain() {
        let action = Action::new("pin_to_workspace")
            .with_param("label", "n")
            .with_param("content", "c");
        let result = ActionResult::ok("pinned");
        let next = route(&table(), Domain::Research, &action, &result);
        assert_eq!(next, Domain::Research);
    }

    #[test]
    fn table_lookup_routes_selected_verbs() {
        let action = Action::new("wiki_search").with_param("query", "rust");
        let result = ActionResult::ok("results");
        let next = route(&table(), Domain::Home, &action, &result);
        assert_eq!(next, Domain::Research);
    }

    #[test]
    fn first_token_fallback_routes_prefixed_verbs() {
        // email_compose_draft is not in the table; its first token is.
        let action = Action::new("email_compose_draft");
        let result = ActionResult::ok("drafted");
        let next = route(&table(), Domain::Home, &action, &result);
        assert_eq!(next, Domain::Email);
    }

    #[test]
    fn unknown_first_token_stays_put() {
        let action = Action::new("calibrate_sensors");
        let result = ActionResult::ok("ok");
        let next = route(&table(), Domain::Research, &action, &result);
        assert_eq!(next, Domain::Research);
    }
}
