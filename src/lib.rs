pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod derive;
pub mod error;
pub mod pipeline;
pub mod test_utils;
pub mod validate;

pub use error::{FactoryError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
