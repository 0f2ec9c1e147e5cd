//! Data model for progression state, receipts, and the XP history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persistent progression record.
///
/// `total_xp_earned` only ever grows; `xp_balance` is the spendable
/// side and can be debited by purchases and loop penalties. `level`
/// is derived from `total_xp_earned` and never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Spendable XP. Never negative.
    pub xp_balance: u64,

    /// Cumulative XP ever earned. Monotonic.
    pub total_xp_earned: u64,

    /// Progression tier, derived from `total_xp_earned`. Starts at 1.
    pub level: u32,

    /// The display title for the current level.
    pub title: String,
}

impl ProgressionState {
    pub fn fresh(initial_title: impl Into<String>) -> Self {
        Self {
            xp_balance: 0,
            total_xp_earned: 0,
            level: 1,
            title: initial_title.into(),
        }
    }
}

/// What kind of XP movement a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Earned,
    Spent,
    Penalty,
}

/// One entry in the XP history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpTransaction {
    /// What caused the movement (action type, purchase, penalty tag).
    pub reason: String,

    /// Signed XP delta applied to the balance.
    pub xp_change: i64,

    pub kind: TransactionKind,

    /// Session the movement happened in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    pub timestamp: DateTime<Utc>,
}

/// A title unlocked by reaching a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleReward {
    pub level: u32,
    pub title: String,
    pub description: String,
}

/// Receipt from [`crate::ProgressionLedger::add_xp`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpReceipt {
    pub xp_gained: u64,
    pub leveled_up: bool,
    pub current_level: u32,
    pub current_title: String,
    pub current_xp_balance: u64,
    pub total_xp_earned: u64,
    /// XP still needed to reach the next level.
    pub xp_needed: u64,
    /// Titles unlocked by this credit, oldest first.
    pub rewards: Vec<TitleReward>,
}

/// Receipt from [`crate::ProgressionLedger::spend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub spent: u64,
    pub remaining_balance: u64,
}

/// Receipt from [`crate::ProgressionLedger::penalize_loop`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyReceipt {
    pub penalty_applied: bool,
    pub xp_lost: u64,
    pub loop_count: u32,
    pub current_xp_balance: u64,
    pub current_level: u32,
    /// Always false under current rules: levels are permanent. Kept in
    /// the contract so callers surface it if the rules ever change.
    pub leveled_down: bool,
}

impl PenaltyReceipt {
    /// The no-op receipt for loop counts below the escalation bar.
    pub fn skipped(state: &ProgressionState, loop_count: u32) -> Self {
        Self {
            penalty_applied: false,
            xp_lost: 0,
            loop_count,
            current_xp_balance: state.xp_balance,
            current_level: state.level,
            leveled_down: false,
        }
    }
}

/// Read-only snapshot from [`crate::ProgressionLedger::status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionStatus {
    pub xp_balance: u64,
    pub total_xp_earned: u64,
    pub level: u32,
    pub title: String,
    /// XP needed to go from the current level to the next.
    pub xp_needed_for_next_level: u64,
    /// XP earned past the current level's threshold.
    pub xp_progress_in_level: u64,
    /// 0–100 progress toward the next level.
    pub progress_percentage: f64,
}
