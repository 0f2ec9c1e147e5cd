//! The master plan module — backs the plan gate that locks every
//! other module until a strategy exists.

use chrono::{DateTime, Utc};
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::executor::PlanGate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// The agent's long-term strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterPlan {
    pub objective: String,
    pub steps: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct PlanState {
    plan: Option<MasterPlan>,
}

/// Shared plan storage. The dispatcher mutates it; the loop
/// controller reads it through [`PlanGate`].
#[derive(Debug, Clone, Default)]
pub struct PlanBoard {
    state: Arc<Mutex<PlanState>>,
}

impl PlanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<MasterPlan> {
        self.state.lock().expect("plan lock poisoned").plan.clone()
    }

    fn set(&self, plan: MasterPlan) {
        self.state.lock().expect("plan lock poisoned").plan = Some(plan);
    }
}

impl PlanGate for PlanBoard {
    fn has_active_plan(&self) -> bool {
        self.state.lock().expect("plan lock poisoned").plan.is_some()
    }
}

/// Handles `plan_*` actions.
pub struct PlanModule {
    board: PlanBoard,
}

impl PlanModule {
    pub fn new(board: PlanBoard) -> Self {
        Self { board }
    }

    pub fn handle(&mut self, action: &Action) -> ActionResult {
        match action.action_type.as_str() {
            "plan_initialize" => self.initialize(action),
            "plan_update" => self.update(action),
            "plan_view" => self.view_plan(),
            other => ActionResult::fail(format!("Unknown plan action: {other}")),
        }
    }

    fn initialize(&mut self, action: &Action) -> ActionResult {
        if self.board.has_active_plan() {
            return ActionResult::fail(
                "A master plan already exists. Use `plan_update` to revise it.",
            );
        }
        let Some(objective) = action.str_param("objective") else {
            return ActionResult::fail("plan_initialize requires an 'objective' parameter.");
        };

        let steps = step_list(action);
        info!(objective, "Master plan initialized");
        self.board.set(MasterPlan {
            objective: objective.to_string(),
            steps,
            updated_at: Utc::now(),
        });

        ActionResult::ok(
            "🧭 Master plan locked in. All modules are now unlocked — execute it.",
        )
    }

    fn update(&mut self, action: &Action) -> ActionResult {
        let Some(mut plan) = self.board.current() else {
            return ActionResult::fail("No master plan yet. Use `plan_initialize` first.");
        };
        if let Some(objective) = action.str_param("objective") {
            plan.objective = objective.to_string();
        }
        let steps = step_list(action);
        if !steps.is_empty() {
            plan.steps = steps;
        }
        plan.updated_at = Utc::now();
        self.board.set(plan);
        ActionResult::ok("Master plan revised.")
    }

    fn view_plan(&self) -> ActionResult {
        match self.board.current() {
            Some(plan) => {
                let steps = if plan.steps.is_empty() {
                    "  (no steps recorded)".to_string()
                } else {
                    plan.steps
                        .iter()
                        .enumerate()
                        .map(|(i, s)| format!("  {}. {s}", i + 1))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                ActionResult::ok(format!(
                    "🧭 MASTER PLAN\nObjective: {}\nSteps:\n{steps}",
                    plan.objective
                ))
            }
            None => ActionResult::fail("No master plan yet. Use `plan_initialize` first."),
        }
    }
}

fn step_list(action: &Action) -> Vec<String> {
    match action.params.get("steps") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(serde_json::Value::String(s)) => s
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> (PlanModule, PlanBoard) {
        let board = PlanBoard::new();
        (PlanModule::new(board.clone()), board)
    }

    #[test]
    fn gate_opens_after_initialize() {
        let (mut module, board) = module();
        assert!(!board.has_active_plan());

        let result = module.handle(
            &Action::new("plan_initialize")
                .with_param("objective", "grow the blog")
                .with_param("steps", "research; write; share"),
        );
        assert!(result.success);
        assert!(board.has_active_plan());
        assert_eq!(board.current().unwrap().steps.len(), 3);
    }

    #[test]
    fn initialize_requires_objective() {
        let (mut module, board) = module();
        let result = module.handle(&Action::new("plan_initialize"));
        assert!(!result.success);
        assert!(!board.has_active_plan());
    }

    #[test]
    fn double_initialize_is_rejected() {
        let (mut module, _board) = module();
        module.handle(&Action::new("plan_initialize").with_param("objective", "x"));
        let result = module.handle(&Action::new("plan_initialize").with_param("objective", "y"));
        assert!(!result.success);
    }

    #[test]
    fn view_without_plan_fails() {
        let (mut module, _) = module();
        assert!(!module.handle(&Action::new("plan_view")).success);
    }

    #[test]
    fn update_revises_objective() {
        let (mut module, board) = module();
        module.handle(&Action::new("plan_initialize").with_param("objective", "old"));
        let result = module.handle(&Action::new("plan_update").with_param("objective", "new"));
        assert!(result.success);
        assert_eq!(board.current().unwrap().objective, "new");
    }
}
