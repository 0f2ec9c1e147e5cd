//! Archival sink — where a finished session goes.
//!
//! Called exactly once per session, after the loop exits. Failures
//! are recoverable: the engine logs them and finishes anyway.

use crate::error::CollaboratorError;
use crate::event::Event;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The reflective summary built at session end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Free-text reflection from the decision source.
    pub learnings: String,

    /// Total actions dispatched.
    pub total_actions: usize,

    /// Fraction of successful actions, 0.0 when nothing ran.
    pub success_rate: f64,
}

/// Persists a finished session.
#[async_trait]
pub trait ArchiveSink: Send + Sync {
    async fn archive(
        &mut self,
        session_id: &str,
        summary: &SessionSummary,
        history: &[Event],
    ) -> Result<(), CollaboratorError>;
}
