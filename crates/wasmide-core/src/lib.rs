pub mod config;
pub mod error;
pub mod models;

pub use error::{Result, WasmIdeError};
pub use models::*;

/// Application version, resolved at compile time from the workspace Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
