//! Core module - shared infrastructure for screenflow
//!
//! Configuration, error handling and the value types every workflow returns.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Result, ScreenflowError};
pub use types::*;
