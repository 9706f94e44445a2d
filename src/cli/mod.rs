//! CLI command implementations

pub mod app;
pub mod auth;
pub mod challenges;
pub mod progress;
