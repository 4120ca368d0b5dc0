//! CLI subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ogcard_site::SiteConfig;

pub mod build;
pub mod check;
pub mod fonts;
pub mod init;
pub mod render;
pub mod serve;

/// Load site.toml. Relative paths in it resolve against the returned directory.
pub fn load_site(config_path: &Path) -> Result<(SiteConfig, PathBuf)> {
    let config = SiteConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    tracing::debug!("Loaded config from {}", config_path.display());

    Ok((config, base_dir(config_path)))
}

fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
