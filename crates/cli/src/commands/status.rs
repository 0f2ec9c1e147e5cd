//! `hatchling status` — print the progression snapshot.

use hatchling_config::AppConfig;
use hatchling_progression::{JsonFileStore, MemoryStore, ProgressionLedger, ProgressionStore};
use std::path::Path;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;

    let store: Box<dyn ProgressionStore> = match config.progression.store.as_str() {
        "memory" => Box::new(MemoryStore::new()),
        _ => Box::new(JsonFileStore::new(&config.progression.path)),
    };
    let ledger = ProgressionLedger::open(store)?;
    let status = ledger.status();

    println!("⭐ Level {} — {}", status.level, status.title);
    println!("💰 Balance: {} XP (spendable)", status.xp_balance);
    println!("📈 Total earned: {} XP", status.total_xp_earned);
    println!(
        "🎯 Next level: {}/{} XP ({:.1}%)",
        status.xp_progress_in_level, status.xp_needed_for_next_level, status.progress_percentage
    );

    Ok(())
}
