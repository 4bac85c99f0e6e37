// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `run_watch`: check the feed once and notify about new releases

pub mod watch;

pub use watch::{Pipeline, RunState, RunSummary, run_watch};
