//! End-to-end session scenarios with mock collaborators.

use async_trait::async_trait;
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::archive::{ArchiveSink, SessionSummary};
use hatchling_core::decision::{CapabilitySet, DecisionSource};
use hatchling_core::domain::Domain;
use hatchling_core::error::{CollaboratorError, DecisionError};
use hatchling_core::event::Event;
use hatchling_core::executor::Executor;
use hatchling_progression::{MemoryStore, ProgressionLedger, shared};
use hatchling_session::{LoopController, StopReason};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays a fixed queue of actions, then finishes the session.
struct ScriptedDecision {
    queue: VecDeque<Action>,
}

impl ScriptedDecision {
    fn new(actions: Vec<Action>) -> Self {
        Self {
            queue: actions.into(),
        }
    }
}

#[async_trait]
impl DecisionSource for ScriptedDecision {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn next_action(
        &mut self,
        _context: &str,
        _actions_left: u32,
        _capabilities: &CapabilitySet,
    ) -> Result<Action, DecisionError> {
        Ok(self
            .queue
            .pop_front()
            .unwrap_or_else(|| Action::new("session_finish")))
    }

    async fn reflect(&mut self, _prompt: &str) -> Result<String, DecisionError> {
        Ok("Scripted reflection.".into())
    }
}

/// Succeeds every action without navigation side effects.
struct EchoExecutor;

#[async_trait]
impl Executor for EchoExecutor {
    async fn execute(&mut self, action: &Action) -> ActionResult {
        ActionResult::ok(format!("executed {}", action.action_type))
    }

    fn capabilities(&self, _domain: Domain) -> CapabilitySet {
        CapabilitySet::default()
    }
}

/// Counts archive invocations.
struct CountingArchive {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ArchiveSink for CountingArchive {
    async fn archive(
        &mut self,
        _session_id: &str,
        _summary: &SessionSummary,
        _history: &[Event],
    ) -> Result<(), CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn navigate_social() -> Action {
    Action::new("navigate_to_mode").with_param("chosen_mode", "SOCIAL")
}

fn seeded_ledger(articles: u32) -> hatchling_progression::SharedLedger {
    let mut ledger = ProgressionLedger::open(Box::new(MemoryStore::new())).unwrap();
    for _ in 0..articles {
        ledger.add_xp("write_blog_article", None).unwrap();
    }
    shared(ledger)
}

#[tokio::test]
async fn triple_navigate_trips_the_loop_detector() {
    let archive_calls = Arc::new(AtomicUsize::new(0));
    let ledger = seeded_ledger(1); // 25 XP balance to make the debit visible

    let decision = ScriptedDecision::new(vec![
        navigate_social(),
        navigate_social(),
        navigate_social(),
    ]);

    let mut controller = LoopController::new(
        Box::new(decision),
        Box::new(EchoExecutor),
        ledger.clone(),
        3,
    )
    .with_archive(Box::new(CountingArchive {
        calls: archive_calls.clone(),
    }));

    let outcome = controller.run().await.unwrap();

    // The budget is fully consumed and the loop exits on exhaustion.
    assert_eq!(outcome.actions_used, 3);
    assert_eq!(outcome.stop, StopReason::BudgetExhausted);

    // Third occurrence escalates: loop_count == 2 means a 10 XP debit.
    let status = ledger.lock().unwrap().status();
    assert_eq!(status.xp_balance, 15);
    // Penalties never touch the earned total.
    assert_eq!(status.total_xp_earned, 25);

    // The warning is present in the final composed context.
    assert!(outcome.final_context.contains("LOOP WARNING"));
    assert!(outcome.final_context.contains("stop navigating"));

    // Archival runs exactly once.
    assert_eq!(archive_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn two_navigations_do_not_escalate() {
    let ledger = seeded_ledger(1);
    let decision = ScriptedDecision::new(vec![navigate_social(), navigate_social()]);

    let mut controller =
        LoopController::new(Box::new(decision), Box::new(EchoExecutor), ledger.clone(), 2);
    let outcome = controller.run().await.unwrap();

    assert_eq!(outcome.actions_used, 2);
    assert_eq!(ledger.lock().unwrap().status().xp_balance, 25);
    assert!(!outcome.final_context.contains("LOOP WARNING"));
}

#[tokio::test]
async fn terminal_action_stops_without_consuming_budget() {
    let ledger = seeded_ledger(0);
    let decision = ScriptedDecision::new(vec![
        Action::new("wiki_search").with_param("query", "molting"),
        Action::new("session_finish"),
    ]);

    let mut controller =
        LoopController::new(Box::new(decision), Box::new(EchoExecutor), ledger.clone(), 5);
    let outcome = controller.run().await.unwrap();

    assert_eq!(outcome.stop, StopReason::FinishedByAgent);
    assert_eq!(outcome.actions_used, 1);
    assert_eq!(outcome.successes, 1);
}

#[tokio::test]
async fn successful_actions_earn_xp() {
    let ledger = seeded_ledger(0);
    let decision = ScriptedDecision::new(vec![
        Action::new("wiki_search").with_param("query", "a"),
        Action::new("wiki_search").with_param("query", "b"),
    ]);

    let mut controller =
        LoopController::new(Box::new(decision), Box::new(EchoExecutor), ledger.clone(), 2);
    controller.run().await.unwrap();

    let status = ledger.lock().unwrap().status();
    assert_eq!(status.total_xp_earned, 20);
    assert_eq!(status.xp_balance, 20);
}

#[tokio::test]
async fn decision_failure_ends_gracefully_with_archival() {
    struct FailingDecision;

    #[async_trait]
    impl DecisionSource for FailingDecision {
        fn name(&self) -> &str {
            "failing"
        }

        async fn next_action(
            &mut self,
            _context: &str,
            _actions_left: u32,
            _capabilities: &CapabilitySet,
        ) -> Result<Action, DecisionError> {
            Err(DecisionError::MalformedAction {
                attempts: 3,
                last_error: "gibberish".into(),
            })
        }

        async fn reflect(&mut self, _prompt: &str) -> Result<String, DecisionError> {
            Err(DecisionError::ReflectionFailed("still down".into()))
        }
    }

    let archive_calls = Arc::new(AtomicUsize::new(0));
    let ledger = seeded_ledger(0);

    let mut controller = LoopController::new(
        Box::new(FailingDecision),
        Box::new(EchoExecutor),
        ledger,
        5,
    )
    .with_archive(Box::new(CountingArchive {
        calls: archive_calls.clone(),
    }));

    let outcome = controller.run().await.unwrap();

    assert!(matches!(outcome.stop, StopReason::DecisionFailure { .. }));
    assert_eq!(outcome.actions_used, 0);
    // Still archived, with the fallback reflection.
    assert_eq!(archive_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_dispatch_consumes_budget_without_xp() {
    struct FailingExecutor;

    #[async_trait]
    impl Executor for FailingExecutor {
        async fn execute(&mut self, _action: &Action) -> ActionResult {
            ActionResult::fail("backend unavailable")
        }

        fn capabilities(&self, _domain: Domain) -> CapabilitySet {
            CapabilitySet::default()
        }
    }

    let ledger = seeded_ledger(0);
    let decision = ScriptedDecision::new(vec![Action::new("create_post")]);

    let mut controller =
        LoopController::new(Box::new(decision), Box::new(FailingExecutor), ledger.clone(), 1);
    let outcome = controller.run().await.unwrap();

    assert_eq!(outcome.actions_used, 1);
    assert_eq!(outcome.failures, 1);
    assert_eq!(ledger.lock().unwrap().status().total_xp_earned, 0);
}

#[tokio::test]
async fn executor_navigation_overrides_routing_table() {
    struct RedirectingExecutor;

    #[async_trait]
    impl Executor for RedirectingExecutor {
        async fn execute(&mut self, action: &Action) -> ActionResult {
            // comment_post would route to social by table; the
            // executor redirects to email instead.
            ActionResult::ok(format!("executed {}", action.action_type))
                .with_navigate(Domain::Email)
        }

        fn capabilities(&self, _domain: Domain) -> CapabilitySet {
            CapabilitySet::default()
        }
    }

    let ledger = seeded_ledger(0);
    let decision =
        ScriptedDecision::new(vec![Action::new("comment_post").with_param("post_id", "p1")]);

    let mut controller = LoopController::new(
        Box::new(decision),
        Box::new(RedirectingExecutor),
        ledger,
        1,
    );
    let outcome = controller.run().await.unwrap();

    assert!(outcome.final_context.contains("EMAIL MODE"));
}
