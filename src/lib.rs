//! Read-only monitoring dashboard for the live trading agent.
//!
//! Loads the agent's run and alert JSONL logs and renders them as a web page
//! (or a one-shot terminal snapshot).

pub mod config;
pub mod dashboard;
pub mod format;
pub mod loader;
pub mod records;
pub mod render;
