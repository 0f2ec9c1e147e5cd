//! The progression ledger — the economy backing agent incentives.
//!
//! Invoked by the session loop as a pure request/response
//! collaborator: every operation takes a request, mutates the owned
//! state, persists it, and returns a receipt. Nothing else holds a
//! reference to the state.

use crate::model::{
    PenaltyReceipt, ProgressionState, ProgressionStatus, SpendReceipt, TitleReward,
    TransactionKind, XpReceipt, XpTransaction,
};
use crate::rewards::{RewardTable, loop_penalty};
use crate::store::{PersistedProgression, ProgressionStore};
use crate::titles::{level_for_total, threshold, title_for_level, xp_to_advance};
use chrono::Utc;
use hatchling_core::error::LedgerError;
use tracing::{debug, info, warn};

/// The XP ledger.
pub struct ProgressionLedger {
    state: ProgressionState,
    history: Vec<XpTransaction>,
    rewards: RewardTable,
    store: Box<dyn ProgressionStore>,
}

impl ProgressionLedger {
    /// Open the ledger, loading persisted state or starting fresh.
    pub fn open(store: Box<dyn ProgressionStore>) -> Result<Self, LedgerError> {
        let record = store.load()?;
        let state = record
            .state
            .unwrap_or_else(|| ProgressionState::fresh(title_for_level(1).name));
        debug!(
            backend = store.name(),
            level = state.level,
            balance = state.xp_balance,
            "Progression ledger opened"
        );
        Ok(Self {
            state,
            history: record.history,
            rewards: RewardTable::with_defaults(),
            store,
        })
    }

    /// Replace the reward table (config overrides).
    pub fn with_rewards(mut self, rewards: RewardTable) -> Self {
        self.rewards = rewards;
        self
    }

    /// Credit XP for a successful action.
    ///
    /// Credits both `total_xp_earned` and `xp_balance`, then
    /// recomputes the level from the cumulative total. Zero-reward
    /// actions are a no-op and do not touch the store.
    pub fn add_xp(
        &mut self,
        action_type: &str,
        session_id: Option<&str>,
    ) -> Result<XpReceipt, LedgerError> {
        let xp_gained = self.rewards.reward(action_type);

        if xp_gained == 0 {
            return Ok(XpReceipt {
                xp_gained: 0,
                leveled_up: false,
                current_level: self.state.level,
                current_title: self.state.title.clone(),
                current_xp_balance: self.state.xp_balance,
                total_xp_earned: self.state.total_xp_earned,
                xp_needed: self.xp_needed_for_next(),
                rewards: Vec::new(),
            });
        }

        let old_level = self.state.level;
        self.state.total_xp_earned += xp_gained;
        self.state.xp_balance += xp_gained;

        let new_level = level_for_total(self.state.total_xp_earned);
        let mut rewards = Vec::new();
        if new_level > old_level {
            for level in (old_level + 1)..=new_level {
                let title = title_for_level(level);
                if title.level == level {
                    rewards.push(TitleReward {
                        level,
                        title: title.name.to_string(),
                        description: title.description.to_string(),
                    });
                }
            }
            self.state.level = new_level;
            self.state.title = title_for_level(new_level).name.to_string();
            info!(level = new_level, title = %self.state.title, "Level up");
        }

        self.record_transaction(action_type, xp_gained as i64, TransactionKind::Earned, session_id)?;

        Ok(XpReceipt {
            xp_gained,
            leveled_up: new_level > old_level,
            current_level: self.state.level,
            current_title: self.state.title.clone(),
            current_xp_balance: self.state.xp_balance,
            total_xp_earned: self.state.total_xp_earned,
            xp_needed: self.xp_needed_for_next(),
            rewards,
        })
    }

    /// Debit the spendable balance for a purchase.
    ///
    /// `total_xp_earned` and level are untouched: spending XP never
    /// affects progression. Fails without any state change when the
    /// balance does not cover the price.
    pub fn spend(
        &mut self,
        tool_name: &str,
        price: u64,
        session_id: Option<&str>,
    ) -> Result<SpendReceipt, LedgerError> {
        if self.state.xp_balance < price {
            return Err(LedgerError::InsufficientBalance {
                balance: self.state.xp_balance,
                price,
            });
        }

        self.state.xp_balance -= price;
        self.record_transaction(
            &format!("buy_tool:{tool_name}"),
            -(price as i64),
            TransactionKind::Spent,
            session_id,
        )?;

        info!(tool = tool_name, price, balance = self.state.xp_balance, "XP spent");

        Ok(SpendReceipt {
            spent: price,
            remaining_balance: self.state.xp_balance,
        })
    }

    /// Apply the loop penalty for a repeated action.
    ///
    /// Counts below 2 are a no-op. The debit is clamped so the
    /// balance never goes negative. Levels are permanent: the
    /// penalty never touches `level` or `total_xp_earned`, and
    /// `leveled_down` is reported as false.
    pub fn penalize_loop(
        &mut self,
        loop_count: u32,
        action_type: &str,
        session_id: Option<&str>,
    ) -> Result<PenaltyReceipt, LedgerError> {
        if loop_count < 2 {
            return Ok(PenaltyReceipt::skipped(&self.state, loop_count));
        }

        let penalty = loop_penalty(loop_count);
        let xp_lost = penalty.min(self.state.xp_balance);
        self.state.xp_balance -= xp_lost;

        self.record_transaction(
            &format!("loop_penalty:{action_type}"),
            -(xp_lost as i64),
            TransactionKind::Penalty,
            session_id,
        )?;

        warn!(
            action_type,
            loop_count,
            xp_lost,
            balance = self.state.xp_balance,
            "Loop penalty applied"
        );

        Ok(PenaltyReceipt {
            penalty_applied: true,
            xp_lost,
            loop_count,
            current_xp_balance: self.state.xp_balance,
            current_level: self.state.level,
            leveled_down: false,
        })
    }

    /// Read-only snapshot. Idempotent and side-effect free.
    pub fn status(&self) -> ProgressionStatus {
        let xp_needed = self.xp_needed_for_next();
        let progress = self.state.total_xp_earned - threshold(self.state.level);
        let percentage = if xp_needed > 0 {
            ((progress as f64 / xp_needed as f64) * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        ProgressionStatus {
            xp_balance: self.state.xp_balance,
            total_xp_earned: self.state.total_xp_earned,
            level: self.state.level,
            title: self.state.title.clone(),
            xp_needed_for_next_level: xp_needed,
            xp_progress_in_level: progress,
            progress_percentage: percentage,
        }
    }

    /// The full XP transaction history, oldest first.
    pub fn history(&self) -> &[XpTransaction] {
        &self.history
    }

    fn xp_needed_for_next(&self) -> u64 {
        xp_to_advance(self.state.level)
    }

    fn record_transaction(
        &mut self,
        reason: &str,
        xp_change: i64,
        kind: TransactionKind,
        session_id: Option<&str>,
    ) -> Result<(), LedgerError> {
        self.history.push(XpTransaction {
            reason: reason.to_string(),
            xp_change,
            kind,
            session_id: session_id.map(str::to_string),
            timestamp: Utc::now(),
        });
        self.store.save(&PersistedProgression {
            state: Some(self.state.clone()),
            history: self.history.clone(),
        })
    }
}
