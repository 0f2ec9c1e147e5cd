//! # Hatchling Providers
//!
//! `DecisionSource` implementations: an Ollama-compatible HTTP client
//! for real runs, and a deterministic scripted queue for demos and
//! tests.

pub mod ollama;
pub mod scripted;

pub use ollama::OllamaSource;
pub use scripted::ScriptedSource;
