//! The session loop controller — the heart of Hatchling.
//!
//! Each iteration follows a fixed contract:
//!
//! 1. Check the plan gate; while locked, force the plan domain and a
//!    blocking overlay.
//! 2. Ask the decision source for the next action.
//! 3. A terminal action stops the loop without consuming budget.
//! 4. Dispatch the action to the executor.
//! 5. Credit XP on success; a successful share drops its pin.
//! 6. Apply pin/unpin instructions from the result.
//! 7. Consume exactly one budget unit.
//! 8. Run the repetition detector over the trailing events; apply
//!    the ledger penalty on a hit.
//! 9. Advance the domain router.
//! 10. Compose the next context.
//! 11. Record the event.
//!
//! The `Session` is owned here and nowhere else; the ledger and
//! detector are invoked request/response and never reach into it.

use crate::context::ContextComposer;
use crate::repetition::{DETECTION_WINDOW, RepetitionDetector};
use crate::report::render_report;
use crate::router::{RouterTable, route};
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::archive::{ArchiveSink, SessionSummary};
use hatchling_core::broadcast::{Broadcaster, NoopBroadcaster};
use hatchling_core::decision::{Capability, CapabilitySet, DecisionSource};
use hatchling_core::domain::Domain;
use hatchling_core::error::Result;
use hatchling_core::event::Event;
use hatchling_core::executor::{Executor, PlanGate};
use hatchling_core::session::Session;
use hatchling_core::view::ViewRegistry;
use hatchling_progression::{ProgressionStatus, SharedLedger, XpReceipt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Verbs that put a single item in focus rather than a listing.
const FOCUS_KEYWORDS: [&str; 7] = ["read", "details", "focus", "view", "summarize", "select", "mark"];

/// Parameter keys that may carry the focused item's id.
const FOCUS_ID_KEYS: [&str; 6] = ["uid", "id", "post_id", "message_id", "page_title", "query"];

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `actions_remaining` reached zero.
    BudgetExhausted,
    /// The agent issued the terminal action or navigated to finish.
    FinishedByAgent,
    /// The decision source failed after its own retry budget.
    DecisionFailure { message: String },
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: String,
    pub stop: StopReason,
    pub actions_used: u32,
    pub successes: usize,
    pub failures: usize,
    pub final_status: Option<ProgressionStatus>,
    /// The last composed context snapshot, including any banners that
    /// never reached the decision source because the loop ended.
    pub final_context: String,
}

/// Drives one session from start to archival.
pub struct LoopController {
    decision: Box<dyn DecisionSource>,
    executor: Box<dyn Executor>,
    ledger: SharedLedger,
    budget: u32,
    views: ViewRegistry,
    broadcaster: Box<dyn Broadcaster>,
    archive: Option<Box<dyn ArchiveSink>>,
    plan_gate: Option<Arc<dyn PlanGate>>,
    router_table: RouterTable,
    detector: RepetitionDetector,
    composer: ContextComposer,
}

impl LoopController {
    pub fn new(
        decision: Box<dyn DecisionSource>,
        executor: Box<dyn Executor>,
        ledger: SharedLedger,
        budget: u32,
    ) -> Self {
        Self {
            decision,
            executor,
            ledger,
            budget,
            views: ViewRegistry::new(),
            broadcaster: Box::new(NoopBroadcaster),
            archive: None,
            plan_gate: None,
            router_table: RouterTable::with_defaults(),
            detector: RepetitionDetector::new(),
            composer: ContextComposer::new(budget),
        }
    }

    /// Register the per-domain views.
    pub fn with_views(mut self, views: ViewRegistry) -> Self {
        self.views = views;
        self
    }

    /// Attach a live broadcaster.
    pub fn with_broadcaster(mut self, broadcaster: Box<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// Attach an archival sink.
    pub fn with_archive(mut self, archive: Box<dyn ArchiveSink>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Attach the plan gate. Without one the gate is always open.
    pub fn with_plan_gate(mut self, gate: Arc<dyn PlanGate>) -> Self {
        self.plan_gate = Some(gate);
        self
    }

    /// Replace the routing table.
    pub fn with_router_table(mut self, table: RouterTable) -> Self {
        self.router_table = table;
        self
    }

    /// Run one full session. Always archives exactly once on the way
    /// out, whatever the stop reason.
    pub async fn run(&mut self) -> Result<SessionOutcome> {
        let mut session = Session::new(self.budget);
        info!(session_id = %session.id, budget = self.budget, "Session started");

        let mut context = self.initial_context(&session);
        let mut stop = StopReason::BudgetExhausted;

        while !session.is_exhausted() {
            let gate_locked = self
                .plan_gate
                .as_ref()
                .is_some_and(|gate| !gate.has_active_plan());

            if gate_locked {
                warn!("System locked: waiting for a master plan");
                session.current_domain = Domain::Plan;
                context = self.locked_context(&session);
            }

            let capabilities = if gate_locked {
                // The overlay is a hard precondition: only the unlock
                // action is offered while it is active.
                CapabilitySet::new(vec![Capability::new(
                    "plan_initialize",
                    "Define the master plan and unlock the system",
                )])
            } else {
                self.executor.capabilities(session.current_domain)
            };

            self.broadcaster
                .broadcast_screen(&context, session.current_domain, session.actions_remaining)
                .await;

            let action = match self
                .decision
                .next_action(&context, session.actions_remaining, &capabilities)
                .await
            {
                Ok(action) => action,
                Err(e) => {
                    warn!(error = %e, "Decision source exhausted its retries, ending session");
                    stop = StopReason::DecisionFailure {
                        message: e.to_string(),
                    };
                    break;
                }
            };

            if action.is_terminal() {
                info!("Session finished by agent");
                stop = StopReason::FinishedByAgent;
                break;
            }

            debug!(action_type = %action.action_type, "Dispatching action");
            self.broadcaster
                .broadcast_action_start(&action, session.current_domain)
                .await;

            let result = self.executor.execute(&action).await;

            self.broadcaster
                .broadcast_result(&action.action_type, &result)
                .await;

            let xp_receipt = self.apply_progression(&mut session, &action, &result);
            Self::apply_pins(&mut session, &result);

            // One dispatched action = one budget unit, success or not.
            session.consume_action();

            let loop_warning = self.detect_repetition(&session, &action);

            let next_domain = route(&self.router_table, session.current_domain, &action, &result);

            session
                .history
                .push(Event::record(session.current_domain, &action, &result));
            session.current_domain = next_domain;

            if next_domain == Domain::Finish {
                info!("Executor navigated to finish");
                stop = StopReason::FinishedByAgent;
                break;
            }

            session.pending_action = self.executor.pending_confirmation();

            context = self.compose_context(
                &session,
                &action,
                &result,
                xp_receipt.as_ref(),
                loop_warning.as_deref(),
            );
            info!(actions_left = session.actions_remaining, "Iteration complete");
        }

        self.finish(session, stop, context).await
    }

    /// Step 5: credit XP for a success and drop the pin behind a
    /// successful share.
    fn apply_progression(
        &mut self,
        session: &mut Session,
        action: &Action,
        result: &ActionResult,
    ) -> Option<XpReceipt> {
        if !result.success {
            return None;
        }

        let receipt = {
            let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
            match ledger.add_xp(&action.action_type, Some(&session.id.0)) {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    warn!(error = %e, "XP credit failed, continuing without it");
                    None
                }
            }
        };

        if action.action_type.starts_with("share") {
            if let Some(label) = action.str_param("label") {
                if session.workspace.unpin(label) {
                    debug!(label, "Shared pinned content, pin removed");
                }
            }
        }

        receipt
    }

    /// Step 6: pins and unpins carried in the result.
    fn apply_pins(session: &mut Session, result: &ActionResult) {
        if let Some(pins) = &result.pin_data {
            for (label, value) in pins {
                session.workspace.pin(label.clone(), value_to_text(value));
            }
        }
        if let Some(label) = &result.unpin_label {
            session.workspace.unpin(label);
        }
    }

    /// Step 8: detector plus the ledger penalty on a hit.
    fn detect_repetition(&mut self, session: &Session, action: &Action) -> Option<String> {
        let recent = session.recent_events(DETECTION_WINDOW);
        let hit = self.detector.check(action, &recent)?;

        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
        match ledger.penalize_loop(hit.count, &action.action_type, Some(&session.id.0)) {
            Ok(receipt) if receipt.penalty_applied => {
                warn!(
                    loop_count = hit.count,
                    xp_lost = receipt.xp_lost,
                    "Loop penalty applied"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Loop penalty failed to apply"),
        }

        Some(hit.warning)
    }

    fn ledger_status(&self) -> Option<ProgressionStatus> {
        self.ledger
            .lock()
            .ok()
            .map(|ledger| ledger.status())
    }

    fn initial_context(&self, session: &Session) -> String {
        let body = self.domain_body(session, Domain::Home, None, &ActionResult::default());
        self.composer.compose(
            Domain::Home,
            0,
            self.ledger_status().as_ref(),
            &session.workspace,
            &body,
            None,
            None,
            "",
        )
    }

    fn locked_context(&self, session: &Session) -> String {
        let overlay = self.composer.plan_overlay();
        self.composer.compose(
            Domain::Plan,
            session.actions_used(),
            self.ledger_status().as_ref(),
            &session.workspace,
            &overlay,
            None,
            None,
            "",
        )
    }

    /// Step 10: the next context snapshot for the decision source.
    fn compose_context(
        &self,
        session: &Session,
        action: &Action,
        result: &ActionResult,
        xp_receipt: Option<&XpReceipt>,
        loop_warning: Option<&str>,
    ) -> String {
        let body = self.domain_body(session, session.current_domain, Some(action), result);

        let level_up = xp_receipt.and_then(|r| self.composer.level_up_banner(r));
        let success_msg = result
            .success
            .then(|| result.data.as_deref().unwrap_or("OK"));
        let error_msg = (!result.success).then(|| result.error.as_deref().unwrap_or("unknown error"));
        let feedback = self
            .composer
            .feedback(success_msg, error_msg, session.current_domain);

        self.composer.compose(
            session.current_domain,
            session.actions_used(),
            self.ledger_status().as_ref(),
            &session.workspace,
            &body,
            level_up.as_deref(),
            loop_warning,
            &feedback,
        )
    }

    /// Body text for a domain: registered view (focus or list) with a
    /// generic fallback when no view exists or rendering fails.
    fn domain_body(
        &self,
        session: &Session,
        domain: Domain,
        action: Option<&Action>,
        result: &ActionResult,
    ) -> String {
        let Some(view) = self.views.get(domain) else {
            return match action {
                Some(action) => self.composer.fallback_body(&action.action_type, result),
                None => format!("> Welcome. You are on the {domain} screen."),
            };
        };

        let rendered = match action.and_then(|a| focused_item_id(a)) {
            Some(item_id) => {
                debug!(item_id = %item_id, "Rendering focus view");
                view.focus_view(&item_id)
            }
            None => view.list_view(result, &session.workspace),
        };

        match rendered {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, %domain, "View failed, using fallback body");
                match action {
                    Some(action) => self.composer.fallback_body(&action.action_type, result),
                    None => format!("> Status unavailable for {domain}."),
                }
            }
        }
    }

    /// Archival: reflective summary, sink call (exactly once), final
    /// report. Collaborator failures degrade to log lines.
    async fn finish(
        &mut self,
        session: Session,
        stop: StopReason,
        final_context: String,
    ) -> Result<SessionOutcome> {
        let successes = session.history.iter().filter(|e| e.success).count();
        let failures = session.history.len() - successes;

        let summary = self.build_summary(&session, successes).await;

        if let Some(archive) = &mut self.archive {
            if let Err(e) = archive
                .archive(&session.id.0, &summary, &session.history)
                .await
            {
                warn!(error = %e, "Archival failed, session ends without it");
            }
        }

        self.broadcaster
            .broadcast_session_end(&session.id.0, &summary.learnings)
            .await;

        let final_status = self.ledger_status();
        info!(
            "\n{}",
            render_report(&session, &summary, final_status.as_ref())
        );

        let actions_used = session.actions_used();
        Ok(SessionOutcome {
            session_id: session.id.0,
            stop,
            actions_used,
            successes,
            failures,
            final_status,
            final_context,
        })
    }

    async fn build_summary(&mut self, session: &Session, successes: usize) -> SessionSummary {
        let total = session.history.len();
        let events_summary: String = session
            .history
            .iter()
            .map(|e| {
                format!(
                    "{} {} in {}\n",
                    if e.success { "✅" } else { "❌" },
                    e.action_type,
                    e.domain
                )
            })
            .collect();

        let prompt = format!(
            "Analyze this session and provide a concise reflection:\n\n{events_summary}\n\
             Generate:\n\
             1. **Learnings**: 2-3 key insights or patterns discovered\n\
             2. **Struggles**: What didn't work or needs improvement\n\
             3. **Next Session Plan**: Recommended priorities for next time\n\n\
             Keep it brief (max 200 words total)."
        );

        let learnings = match self.decision.reflect(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Reflection failed, archiving without it");
                "No reflection available for this session.".to_string()
            }
        };

        SessionSummary {
            learnings,
            total_actions: total,
            success_rate: if total > 0 {
                successes as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The item id for a focus verb, if the action is one.
fn focused_item_id(action: &Action) -> Option<String> {
    let is_focus = FOCUS_KEYWORDS
        .iter()
        .any(|kw| action.action_type.contains(kw));
    if !is_focus {
        return None;
    }
    FOCUS_ID_KEYS
        .iter()
        .find_map(|key| action.str_param(key))
        .map(str::to_string)
}
