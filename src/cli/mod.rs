pub mod ask;
pub mod check;
pub mod extract;
pub mod init;

use crate::config::{self, Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locate and parse the config. Returns where it was found as well.
pub fn load_config(explicit: Option<&Path>) -> Result<(PathBuf, Config)> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let path = config::discover_config(explicit, &cwd).with_context(|| {
        format!(
            "No config found. Run `gitask init` to create {}, or pass --config.",
            config::parser::CONFIG_FILE_NAME
        )
    })?;
    let config = config::parse_config_file(&path)?;
    Ok((path, config))
}
