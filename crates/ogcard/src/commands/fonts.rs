//! Font variable stylesheet command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ogcard_site::stylesheet;

use super::load_site;

/// Run the fonts command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let (site, _) = load_site(config_path)?;

    if site.experimental.fonts.is_empty() {
        tracing::warn!("No experimental fonts configured");
    }

    let css = stylesheet(&site)?;

    match output {
        Some(path) => {
            fs::write(&path, &css).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", css),
    }

    Ok(())
}
