//! CLI commands.

pub mod contacts;
pub mod send;
pub mod serve;
pub mod status;

use std::path::Path;
use talentwire_core::Config;

/// Load config, falling back to defaults when the file does not exist.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}
