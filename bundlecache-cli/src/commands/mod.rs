//! CLI command implementations.

pub mod chain;
pub mod common;
pub mod config;
pub mod dump;
pub mod resolve;
