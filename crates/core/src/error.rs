//! Error types for the Hatchling domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Hatchling operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Decision source errors ---
    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    // --- Ledger errors ---
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // --- Collaborator errors ---
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// The decision source could not produce a usable action.
///
/// This is the only error class that is allowed to end a session
/// abnormally, and only after the source has exhausted its own
/// retry budget.
#[derive(Debug, Clone, Error)]
pub enum DecisionError {
    #[error("Decision source unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed action after {attempts} attempts: {last_error}")]
    MalformedAction { attempts: u32, last_error: String },

    #[error("Reflection generation failed: {0}")]
    ReflectionFailed(String),
}

/// Failures inside the executor. These never cross the `Executor`
/// seam directly; the dispatcher encodes them into a failed
/// `ActionResult` so the session stays continuable.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Action '{0}' is not recognized")]
    UnknownAction(String),

    #[error("Invalid parameters for '{action_type}': {reason}")]
    InvalidParams { action_type: String, reason: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("No pending action to confirm")]
    NothingPending,
}

/// Progression ledger failures.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Insufficient XP balance: have {balance}, need {price}")]
    InsufficientBalance { balance: u64, price: u64 },

    #[error("Progression store error: {0}")]
    Store(String),
}

/// A best-effort collaborator (broadcaster, view, archival sink)
/// failed. Always recovered: the caller degrades to a fallback
/// string or skips the call.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("Channel unavailable: {0}")]
    Unavailable(String),

    #[error("View rendering failed for domain '{domain}': {reason}")]
    ViewFailed { domain: String, reason: String },

    #[error("Archival failed: {0}")]
    ArchiveFailed(String),
}
