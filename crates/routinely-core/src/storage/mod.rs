//! File-backed adapters around the engine: configuration, the template
//! catalog and the persisted active session.

mod catalog;
mod config;
mod session_store;

pub use catalog::{Catalog, CatalogStore};
pub use config::{Config, SessionConfig};
pub use session_store::SessionStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/routinely[-dev]/` based on ROUTINELY_ENV.
///
/// Set ROUTINELY_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ROUTINELY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("routinely-dev")
    } else {
        base_dir.join("routinely")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
