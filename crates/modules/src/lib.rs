//! # Hatchling Modules
//!
//! The simulated world the agent acts against: a social feed, a blog
//! with comment moderation, a mailbox, a small wiki, the XP shop, the
//! master plan board, and a note store — all behind the
//! [`hatchling_core::Executor`] seam via [`ModuleDispatcher`].
//!
//! Everything here is in-memory simulation. The session engine never
//! sees these types; it only sees `ActionResult`s and rendered views.

pub mod blog;
pub mod dispatcher;
pub mod mail;
pub mod memory;
pub mod plan;
pub mod research;
pub mod shop;
pub mod social;

pub use blog::BlogModule;
pub use dispatcher::ModuleDispatcher;
pub use mail::MailModule;
pub use memory::MemoryModule;
pub use plan::{MasterPlan, PlanBoard, PlanModule};
pub use research::ResearchModule;
pub use shop::{ShopModule, ToolListing, ToolShed};
pub use social::SocialModule;
