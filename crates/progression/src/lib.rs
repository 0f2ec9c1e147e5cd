//! # Hatchling Progression
//!
//! The XP economy: per-action rewards, a geometric level curve with
//! unlockable titles, a spendable balance for the shop, and the loop
//! penalty ladder that backs the repetition detector.
//!
//! Two counters, deliberately distinct:
//! - `total_xp_earned` — cumulative, monotonic, drives the level.
//! - `xp_balance` — spendable, debited by purchases and penalties.

pub mod ledger;
pub mod model;
pub mod rewards;
pub mod store;
pub mod titles;

pub use ledger::ProgressionLedger;

/// Shared handle to the ledger. The session loop and the shop both
/// transact against the same economy; the mutex is held only for the
/// duration of one synchronous operation, never across an await.
pub type SharedLedger = std::sync::Arc<std::sync::Mutex<ProgressionLedger>>;

/// Wrap a ledger for sharing between the loop and module handlers.
pub fn shared(ledger: ProgressionLedger) -> SharedLedger {
    std::sync::Arc::new(std::sync::Mutex::new(ledger))
}
pub use model::{
    PenaltyReceipt, ProgressionState, ProgressionStatus, SpendReceipt, TitleReward,
    TransactionKind, XpReceipt, XpTransaction,
};
pub use rewards::{RewardTable, loop_penalty};
pub use store::{JsonFileStore, MemoryStore, PersistedProgression, ProgressionStore};
pub use titles::{Title, TITLES, level_for_total, threshold, title_for_level, xp_to_advance};
