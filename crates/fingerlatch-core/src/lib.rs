//! Core types shared by the fingerprint latch crates: validated
//! configuration, servo angles, defaults and the configuration error type.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::LatchConfig;
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
