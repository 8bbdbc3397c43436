//! Replay of captured requests.
//!
//! `target` maps a captured URL onto a destination, `executor` sends one
//! replay through the injected `HttpCaller`, `sequencer` drives ordered
//! batches, and `history` keeps every attempt.

pub mod executor;
pub mod history;
pub mod model;
pub mod sequencer;
pub mod target;

pub use executor::ReplayExecutor;
pub use history::ReplayHistoryStore;
pub use model::*;
pub use sequencer::ReplaySequencer;
pub use target::{resolve_target, validate_target, ResolvedTarget};
