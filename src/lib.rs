//! RelayCraft environment diff.
//!
//! Replays captured HTTP requests against their original origin, a named
//! environment or a custom URL, and scores how the new responses differ from
//! the captured ones.

pub mod common;
pub mod config;
pub mod diff;
pub mod engine;
pub mod logging;
pub mod replay;
pub mod session;
pub mod traffic;

pub use common::error::{AppError, ReplayError, TransportError};
pub use common::models::{ResponseSnapshot, ResponseTiming};
pub use config::EnvDiffConfig;
pub use diff::{diff, summarize, DiffOptions, DiffResult};
pub use engine::ReplayDiffEngine;
pub use replay::{
    CapturedRequest, EnvironmentConfig, EnvironmentMapping, ReplayConfig, ReplayResult,
    ReplayTarget, SequenceOptions,
};
pub use traffic::{HttpCallResponse, HttpCaller, ReqwestCaller};
