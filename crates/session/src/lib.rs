//! # Hatchling Session
//!
//! The session orchestration engine: an action-budgeted control loop
//! that asks a decision source for actions, dispatches them, settles
//! XP, detects repetition, routes between domains, and composes the
//! next context — until the budget runs out or the agent finishes.
//!
//! The moving parts:
//! - [`LoopController`] — owns the `Session` and drives iterations.
//! - [`router`] — pure `(domain, action, result) → domain` function.
//! - [`repetition`] — signature-based consecutive-repeat detection.
//! - [`context`] — screen composition for the decision source.

pub mod context;
pub mod controller;
pub mod repetition;
pub mod report;
pub mod router;

pub use context::ContextComposer;
pub use controller::{LoopController, SessionOutcome, StopReason};
pub use repetition::{DETECTION_WINDOW, LoopHit, RepetitionDetector, SIGNATURE_KEYS, signature};
pub use router::{RouterTable, route};
