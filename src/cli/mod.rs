//! CLI module - command handlers for the `screenflow` binary

pub mod commands;
pub mod setup;

pub use commands::RunOptions;
