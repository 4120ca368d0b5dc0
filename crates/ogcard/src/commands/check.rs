//! Validate site configuration.

use std::path::Path;

use anyhow::{Context, Result};
use ogcard_site::CardPipeline;

use super::load_site;

/// Run the check command.
pub async fn run(config_path: &Path) -> Result<()> {
    let (config, base) = load_site(config_path)?;

    tracing::info!("Site: {}", config.site);

    let names: Vec<_> = config.integrations.iter().map(|i| i.name()).collect();
    tracing::info!("Integrations: {}", names.join(", "));

    match config.og_options() {
        Some(og) => tracing::info!(
            "Cards: {}x{} {}, {} font(s)",
            og.width,
            og.height,
            og.format,
            og.fonts.len()
        ),
        None => tracing::warn!("opengraph-images is not enabled, cards use defaults"),
    }

    if !config.experimental.fonts.is_empty() {
        let variables: Vec<_> = config
            .experimental
            .fonts
            .iter()
            .map(|f| f.css_variable.as_str())
            .collect();
        tracing::info!("Font variables: {}", variables.join(", "));
    }

    // Loads fonts and the theme the same way a build does.
    let pipeline = CardPipeline::from_site(&config, &base, None)
        .context("Card pipeline configuration is invalid")?;
    tracing::debug!("Card pipeline ready ({})", pipeline.format());

    let content = base.join(&config.content.dir);
    if !content.exists() {
        tracing::warn!("Content directory not found: {}", content.display());
    }

    tracing::info!("{} is valid", config_path.display());

    Ok(())
}
