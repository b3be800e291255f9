//! Subcommand implementations.

pub mod config;
pub mod plan;
pub mod resize;
