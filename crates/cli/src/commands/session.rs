//! `hatchling session` — wire the collaborators together and run one
//! autonomous session.

use hatchling_channels::{FileArchive, ViewerBroadcaster};
use hatchling_config::AppConfig;
use hatchling_core::decision::DecisionSource;
use hatchling_core::executor::Inventory;
use hatchling_modules::ModuleDispatcher;
use hatchling_progression::{
    JsonFileStore, MemoryStore, ProgressionLedger, ProgressionStore, shared,
};
use hatchling_providers::{OllamaSource, ScriptedSource};
use hatchling_session::{LoopController, StopReason};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(config_path: &Path, budget: Option<u32>, scripted: bool) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let budget = budget.unwrap_or(config.session.budget);

    // ── Progression ledger ──
    let store: Box<dyn ProgressionStore> = match config.progression.store.as_str() {
        "memory" => Box::new(MemoryStore::new()),
        _ => Box::new(JsonFileStore::new(&config.progression.path)),
    };
    let ledger = shared(ProgressionLedger::open(store)?);

    // ── Simulated world ──
    let dispatcher = ModuleDispatcher::new(ledger.clone(), &config.agent_name);
    let plan_board = dispatcher.plan_board();
    let inventory: Box<dyn Inventory> = Box::new(dispatcher.inventory());
    let views = dispatcher.build_views();

    // ── Decision source ──
    let decision: Box<dyn DecisionSource> = if scripted || config.decision.provider == "scripted" {
        info!("Using the scripted decision source");
        Box::new(ScriptedSource::demo())
    } else {
        Box::new(
            OllamaSource::new(
                &config.decision.base_url,
                &config.decision.model,
                &config.agent_name,
            )
            .with_retry_budget(config.decision.retry_budget),
        )
    };

    // ── Controller ──
    let mut controller = LoopController::new(decision, Box::new(dispatcher), ledger, budget)
        .with_views(views)
        .with_plan_gate(Arc::new(plan_board));

    if config.viewer.enabled {
        let broadcaster = ViewerBroadcaster::connect(&config.viewer.addr).await;
        controller = controller.with_broadcaster(Box::new(broadcaster));
    }
    if config.archive.enabled {
        controller = controller.with_archive(Box::new(FileArchive::new(&config.archive.dir)));
    }

    let outcome = controller.run().await?;

    match &outcome.stop {
        StopReason::BudgetExhausted => info!("🏁 Session limit reached."),
        StopReason::FinishedByAgent => info!("🏁 Session finished by agent."),
        StopReason::DecisionFailure { message } => {
            anyhow::bail!("session ended early: decision source failed: {message}")
        }
    }

    info!(
        session_id = %outcome.session_id,
        actions = outcome.actions_used,
        successes = outcome.successes,
        failures = outcome.failures,
        tools = ?inventory.owned_tools(),
        "Session complete"
    );
    Ok(())
}
