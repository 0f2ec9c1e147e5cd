//! The module dispatcher — the `Executor` implementation that routes
//! actions to their handlers.
//!
//! All failure modes are encoded into failed `ActionResult`s; nothing
//! escapes this seam as an error. Destructive actions go through the
//! two-step confirm protocol staged here.

use crate::blog::BlogModule;
use crate::mail::MailModule;
use crate::memory::MemoryModule;
use crate::plan::{PlanBoard, PlanModule};
use crate::research::ResearchModule;
use crate::shop::{ShopModule, ToolShed};
use crate::social::SocialModule;
use async_trait::async_trait;
use hatchling_core::action::{Action, ActionResult, ControlAction};
use hatchling_core::decision::{Capability, CapabilitySet};
use hatchling_core::domain::Domain;
use hatchling_core::error::DispatchError;
use hatchling_core::executor::Executor;
use hatchling_core::session::PendingAction;
use hatchling_core::view::ViewRegistry;
use hatchling_progression::SharedLedger;
use tracing::{info, warn};

/// Actions that require the confirm protocol before taking effect.
const DESTRUCTIVE_ACTIONS: [&str; 2] = ["delete_post", "email_delete"];

/// Routes actions to the simulated modules.
pub struct ModuleDispatcher {
    social: SocialModule,
    blog: BlogModule,
    mail: MailModule,
    research: ResearchModule,
    shop: ShopModule,
    plan: PlanModule,
    memory: MemoryModule,
    plan_board: PlanBoard,
    pending: Option<PendingAction>,
}

impl ModuleDispatcher {
    pub fn new(ledger: SharedLedger, agent_name: impl Into<String>) -> Self {
        let plan_board = PlanBoard::new();
        Self {
            social: SocialModule::new(agent_name),
            blog: BlogModule::new(),
            mail: MailModule::new(),
            research: ResearchModule::new(),
            shop: ShopModule::new(ledger),
            plan: PlanModule::new(plan_board.clone()),
            memory: MemoryModule::new(),
            plan_board,
            pending: None,
        }
    }

    /// The shared plan gate for the loop controller.
    pub fn plan_board(&self) -> PlanBoard {
        self.plan_board.clone()
    }

    /// The owned-tool inventory.
    pub fn inventory(&self) -> ToolShed {
        self.shop.inventory()
    }

    /// Views over the same module state, for the controller's registry.
    pub fn build_views(&self) -> ViewRegistry {
        let mut views = ViewRegistry::new();
        views.register(Domain::Social, Box::new(self.social.view()));
        views.register(Domain::Blog, Box::new(self.blog.view()));
        views.register(Domain::Email, Box::new(self.mail.view()));
        views.register(Domain::Research, Box::new(self.research.view()));
        views.register(Domain::Shop, Box::new(self.shop.view()));
        views
    }

    fn dispatch(&mut self, action: &Action) -> ActionResult {
        // Built-in control verbs first, validated into variants.
        match ControlAction::parse(action) {
            Err(reason) => return ActionResult::fail(reason),
            Ok(Some(control)) => return self.dispatch_control(control),
            Ok(None) => {}
        }

        // Destructive verbs are staged until confirmed.
        if DESTRUCTIVE_ACTIONS.contains(&action.action_type.as_str())
            && action.str_param("confirmed").is_none()
        {
            self.pending = Some(PendingAction {
                action_type: action.action_type.clone(),
                params: action.params.clone(),
            });
            warn!(action_type = %action.action_type, "Destructive action staged for confirmation");
            return ActionResult::fail(format!(
                "⚠️ CONFIRMATION REQUIRED: `{}` is permanent. Proceed with \
                 `confirm_action(decision=\"yes\")` or cancel with \
                 `confirm_action(decision=\"no\")`.",
                action.action_type
            ));
        }

        self.dispatch_module(action)
    }

    fn dispatch_control(&mut self, control: ControlAction) -> ActionResult {
        match control {
            ControlAction::NavigateToMode { mode } => {
                info!(%mode, "Navigation requested");
                ActionResult::ok(format!("Successfully navigated to {mode}."))
            }
            ControlAction::VisitShop => self.shop.handle(&Action::new("visit_shop")),
            ControlAction::PinWorkspace { label, content } => {
                ActionResult::ok(format!("Pinned: {label}")).with_pin(label, content)
            }
            ControlAction::UnpinWorkspace { label } => {
                ActionResult::ok(format!("Unpinned: {label}")).with_unpin(label)
            }
            ControlAction::ConfirmAction { approved } => self.confirm(approved),
            ControlAction::FinishSession => {
                ActionResult::ok("Session finished by agent. Saving state...")
                    .with_navigate(Domain::Finish)
            }
        }
    }

    fn confirm(&mut self, approved: bool) -> ActionResult {
        let Some(pending) = self.pending.take() else {
            return ActionResult::fail(DispatchError::NothingPending.to_string());
        };

        if !approved {
            info!(action_type = %pending.action_type, "Staged action cancelled");
            return ActionResult::ok("Action cancelled.");
        }

        info!(action_type = %pending.action_type, "Confirmation received, executing");
        let mut confirmed = Action::new(pending.action_type);
        confirmed.params = pending.params;
        confirmed.params.insert("confirmed".into(), "yes".into());
        self.dispatch_module(&confirmed)
    }

    fn dispatch_module(&mut self, action: &Action) -> ActionResult {
        let verb = action.action_type.as_str();

        if verb.starts_with("social_")
            || matches!(
                verb,
                "read_post"
                    | "select_post_to_comment"
                    | "comment_post"
                    | "create_post"
                    | "vote_post"
                    | "follow_agent"
                    | "share_link"
                    | "delete_post"
            )
        {
            return self.social.handle(action);
        }
        if verb.starts_with("email_") {
            return self.mail.handle(action);
        }
        if verb.starts_with("wiki_") || verb.starts_with("research_") {
            return self.research.handle(action);
        }
        if verb.starts_with("blog_")
            || matches!(
                verb,
                "write_blog_article"
                    | "review_pending_comments"
                    | "approve_comment"
                    | "reject_comment"
                    | "share_blog_article"
            )
        {
            return self.blog.handle(action);
        }
        if verb.starts_with("plan_") {
            return self.plan.handle(action);
        }
        if verb.starts_with("memory_") {
            return self.memory.handle(action);
        }
        if verb == "buy_tool" {
            return self.shop.handle(action);
        }

        warn!(action_type = verb, "Unknown action attempted");
        ActionResult::fail(format!(
            "{} Consult the available actions for the current screen.",
            DispatchError::UnknownAction(verb.to_string())
        ))
    }
}

#[async_trait]
impl Executor for ModuleDispatcher {
    async fn execute(&mut self, action: &Action) -> ActionResult {
        self.dispatch(action)
    }

    fn capabilities(&self, domain: Domain) -> CapabilitySet {
        // A staged destructive action narrows the choice to yes/no.
        if self.pending.is_some() {
            return CapabilitySet::new(vec![Capability::new(
                "confirm_action",
                "Confirm or cancel the staged action with decision=\"yes\"/\"no\"",
            )]);
        }

        let mut caps = vec![
            Capability::new("navigate_to_mode", "Move to another module"),
            Capability::new("pin_to_workspace", "Keep labeled content visible"),
            Capability::new("unpin_from_workspace", "Remove a workspace pin"),
            Capability::new("session_finish", "End the session gracefully"),
        ];

        let domain_caps: &[(&str, &str)] = match domain {
            Domain::Social => &[
                ("social_refresh_feed", "Refresh the feed listing"),
                ("read_post", "Read a post by post_id"),
                ("select_post_to_comment", "Focus a post before commenting"),
                ("comment_post", "Publish a comment on the focused post"),
                ("create_post", "Publish a new post"),
                ("vote_post", "Vote a post up or down"),
                ("follow_agent", "Follow another agent"),
                ("share_link", "Share a link to the feed"),
                ("delete_post", "Delete one of your own posts"),
            ],
            Domain::Blog => &[
                ("blog_latest_articles", "List published articles"),
                ("write_blog_article", "Publish a new article"),
                ("review_pending_comments", "List the moderation queue"),
                ("approve_comment", "Approve a pending comment"),
                ("reject_comment", "Reject a pending comment"),
                ("share_blog_article", "Share a published article to the feed"),
            ],
            Domain::Email => &[
                ("email_get_messages", "List the inbox"),
                ("email_read", "Read a message by uid"),
                ("email_send", "Send a mail"),
                ("email_archive", "Archive a message"),
                ("email_delete", "Permanently delete a message"),
                ("email_search", "Search subjects and bodies"),
                ("email_mark_as_read", "Mark a message read"),
            ],
            Domain::Research => &[
                ("wiki_search", "Search wiki pages"),
                ("wiki_read", "Read a page by title"),
                ("research_query_cache", "Recall earlier search results"),
                ("research_complete", "Record finished research with findings"),
            ],
            Domain::Shop => &[("buy_tool", "Buy a tool with XP")],
            Domain::Plan => &[
                ("plan_initialize", "Define the master plan"),
                ("plan_update", "Revise the master plan"),
                ("plan_view", "Show the master plan"),
            ],
            Domain::Home | Domain::System | Domain::Finish => &[
                ("visit_shop", "Open the tool shop"),
                ("memory_store", "Store a note under a key"),
                ("memory_retrieve", "Recall a stored note"),
            ],
        };

        caps.extend(
            domain_caps
                .iter()
                .map(|(name, desc)| Capability::new(*name, *desc)),
        );
        CapabilitySet::new(caps)
    }

    fn pending_confirmation(&self) -> Option<PendingAction> {
        self.pending.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchling_progression::{MemoryStore, ProgressionLedger, shared};

    fn dispatcher() -> ModuleDispatcher {
        let ledger = shared(ProgressionLedger::open(Box::new(MemoryStore::new())).unwrap());
        ModuleDispatcher::new(ledger, "hatchling")
    }

    #[tokio::test]
    async fn unknown_action_fails_with_suggestion() {
        let mut dispatcher = dispatcher();
        let result = dispatcher.execute(&Action::new("summon_kraken")).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("summon_kraken"));
    }

    #[tokio::test]
    async fn malformed_control_action_fails() {
        let mut dispatcher = dispatcher();
        let result = dispatcher
            .execute(&Action::new("pin_to_workspace").with_param("label", "x"))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("empty content"));
    }

    #[tokio::test]
    async fn pin_action_carries_pin_data() {
        let mut dispatcher = dispatcher();
        let result = dispatcher
            .execute(
                &Action::new("pin_to_workspace")
                    .with_param("label", "note")
                    .with_param("content", "keep this"),
            )
            .await;
        assert!(result.success);
        assert!(result.pin_data.unwrap().contains_key("note"));
    }

    #[tokio::test]
    async fn destructive_action_requires_confirmation() {
        let mut dispatcher = dispatcher();

        let staged = dispatcher
            .execute(&Action::new("email_delete").with_param("uid", "m1"))
            .await;
        assert!(!staged.success);
        assert!(staged.error.unwrap().contains("CONFIRMATION REQUIRED"));
        assert!(dispatcher.pending_confirmation().is_some());

        // Only confirm_action is offered while staged.
        let caps = dispatcher.capabilities(Domain::Email);
        assert_eq!(caps.names(), ["confirm_action"]);

        let confirmed = dispatcher
            .execute(&Action::new("confirm_action").with_param("decision", "yes"))
            .await;
        assert!(confirmed.success);
        assert!(dispatcher.pending_confirmation().is_none());

        // The message is really gone.
        let gone = dispatcher
            .execute(&Action::new("email_read").with_param("uid", "m1"))
            .await;
        assert!(!gone.success);
    }

    #[tokio::test]
    async fn declined_confirmation_cancels() {
        let mut dispatcher = dispatcher();
        dispatcher
            .execute(&Action::new("email_delete").with_param("uid", "m2"))
            .await;

        let cancelled = dispatcher
            .execute(&Action::new("confirm_action").with_param("decision", "no"))
            .await;
        assert!(cancelled.success);
        assert!(dispatcher.pending_confirmation().is_none());

        // Message survived.
        let read = dispatcher
            .execute(&Action::new("email_read").with_param("uid", "m2"))
            .await;
        assert!(read.success);
    }

    #[tokio::test]
    async fn confirm_without_pending_fails() {
        let mut dispatcher = dispatcher();
        let result = dispatcher
            .execute(&Action::new("confirm_action").with_param("decision", "yes"))
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn session_finish_navigates_to_finish() {
        let mut dispatcher = dispatcher();
        let result = dispatcher.execute(&Action::new("session_finish")).await;
        assert!(result.success);
        assert_eq!(result.navigate_to.as_deref(), Some("finish"));
    }

    #[tokio::test]
    async fn capabilities_differ_by_domain() {
        let dispatcher = dispatcher();
        let social = dispatcher.capabilities(Domain::Social);
        let email = dispatcher.capabilities(Domain::Email);
        assert!(social.names().contains(&"create_post"));
        assert!(!social.names().contains(&"email_send"));
        assert!(email.names().contains(&"email_send"));
    }

    #[tokio::test]
    async fn views_cover_the_interactive_domains() {
        let dispatcher = dispatcher();
        let views = dispatcher.build_views();
        for domain in [
            Domain::Social,
            Domain::Blog,
            Domain::Email,
            Domain::Research,
            Domain::Shop,
        ] {
            assert!(views.get(domain).is_some(), "missing view for {domain}");
        }
    }
}
