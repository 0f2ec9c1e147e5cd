//! # Hatchling Core
//!
//! Domain types, traits, and error definitions for the Hatchling
//! autonomous agent engine. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the session loop talks to is defined as a trait
//! here. Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod archive;
pub mod broadcast;
pub mod decision;
pub mod domain;
pub mod error;
pub mod event;
pub mod executor;
pub mod session;
pub mod view;
pub mod workspace;

// Re-export key types at crate root for ergonomics
pub use action::{Action, ActionResult, ControlAction, Params};
pub use archive::{ArchiveSink, SessionSummary};
pub use broadcast::{Broadcaster, NoopBroadcaster};
pub use decision::{Capability, CapabilitySet, DecisionSource};
pub use domain::Domain;
pub use error::{CollaboratorError, DecisionError, DispatchError, Error, LedgerError, Result};
pub use event::Event;
pub use executor::{Executor, Inventory, PlanGate};
pub use session::{PendingAction, Session, SessionId};
pub use view::{DomainView, ViewRegistry};
pub use workspace::{Pin, Workspace};
