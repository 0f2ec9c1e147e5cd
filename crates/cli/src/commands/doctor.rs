//! `hatchling doctor` — check configuration and collaborator
//! reachability without running a session.

use hatchling_channels::ViewerBroadcaster;
use hatchling_config::AppConfig;
use hatchling_progression::{JsonFileStore, ProgressionStore};
use std::path::Path;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    println!("🔧 Hatchling doctor\n");

    // Config loads and validates.
    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("✅ Config: {} (budget {})", config_path.display(), config.session.budget);
            config
        }
        Err(e) => {
            println!("❌ Config: {e}");
            return Ok(());
        }
    };

    // Progression store is readable.
    if config.progression.store == "file" {
        let store = JsonFileStore::new(&config.progression.path);
        match store.load() {
            Ok(record) => println!(
                "✅ Progression store: {} ({} transactions)",
                config.progression.path,
                record.history.len()
            ),
            Err(e) => println!("❌ Progression store: {e}"),
        }
    } else {
        println!("✅ Progression store: in-memory (ephemeral)");
    }

    // Decision endpoint reachability.
    if config.decision.provider == "ollama" {
        let url = format!("{}/api/tags", config.decision.base_url.trim_end_matches('/'));
        match reqwest_get(&url).await {
            Ok(()) => println!("✅ Ollama endpoint: {}", config.decision.base_url),
            Err(e) => println!("⚠️ Ollama endpoint unreachable: {e}"),
        }
    } else {
        println!("✅ Decision source: scripted (no endpoint needed)");
    }

    // Viewer reachability — optional by design.
    if config.viewer.enabled {
        let broadcaster = ViewerBroadcaster::connect(&config.viewer.addr).await;
        if broadcaster.is_available() {
            println!("✅ Live viewer: {}", config.viewer.addr);
        } else {
            println!("⚠️ Live viewer unreachable (broadcasts will be skipped)");
        }
    } else {
        println!("✅ Live viewer: disabled");
    }

    Ok(())
}

async fn reqwest_get(url: &str) -> Result<(), String> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .map_err(|e| e.to_string())?;
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("status {}", response.status()))
    }
}
