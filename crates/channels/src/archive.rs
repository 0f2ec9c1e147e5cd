//! JSON file archival sink — one file per finished session.

use async_trait::async_trait;
use chrono::Utc;
use hatchling_core::archive::{ArchiveSink, SessionSummary};
use hatchling_core::error::CollaboratorError;
use hatchling_core::event::Event;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Writes finished sessions to `<dir>/session-<id>.json`.
pub struct FileArchive {
    dir: PathBuf,
}

impl FileArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArchiveSink for FileArchive {
    async fn archive(
        &mut self,
        session_id: &str,
        summary: &SessionSummary,
        history: &[Event],
    ) -> Result<(), CollaboratorError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CollaboratorError::ArchiveFailed(format!("mkdir: {e}")))?;

        let record = json!({
            "session_id": session_id,
            "archived_at": Utc::now().to_rfc3339(),
            "summary": summary,
            "history": history,
        });
        let raw = serde_json::to_string_pretty(&record)
            .map_err(|e| CollaboratorError::ArchiveFailed(format!("serialize: {e}")))?;

        let path = self.dir.join(format!("session-{session_id}.json"));
        tokio::fs::write(&path, raw)
            .await
            .map_err(|e| CollaboratorError::ArchiveFailed(format!("write {}: {e}", path.display())))?;

        info!(path = %path.display(), "Session archived");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchling_core::action::{Action, ActionResult};
    use hatchling_core::domain::Domain;

    #[tokio::test]
    async fn archive_writes_one_file_per_session() {
        let dir = std::env::temp_dir().join(format!("hatchling-archive-{}", std::process::id()));
        let mut sink = FileArchive::new(&dir);

        let history = vec![Event::record(
            Domain::Social,
            &Action::new("create_post"),
            &ActionResult::ok("posted"),
        )];
        let summary = SessionSummary {
            learnings: "Posting works.".into(),
            total_actions: 1,
            success_rate: 1.0,
        };

        sink.archive("test-session", &summary, &history).await.unwrap();

        let raw = tokio::fs::read_to_string(dir.join("session-test-session.json"))
            .await
            .unwrap();
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(record["session_id"], "test-session");
        assert_eq!(record["history"][0]["action_type"], "create_post");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
