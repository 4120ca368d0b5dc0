//! Batch card build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use ogcard_render::ImageFormat;
use ogcard_site::{BuildConfig, CardPipeline, OgBuilder};

use super::load_site;

/// Run the build command.
pub async fn run(
    config_path: &Path,
    content: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<ImageFormat>,
) -> Result<()> {
    tracing::info!("Building Open Graph cards...");

    let (site, base) = load_site(config_path)?;

    let config = BuildConfig {
        content_dir: content.unwrap_or_else(|| base.join(&site.content.dir)),
        output_dir: output.unwrap_or_else(|| base.join(&site.content.output)),
    };

    let pipeline = CardPipeline::from_site(&site, &base, format)?;
    let result = OgBuilder::new(config, pipeline).build().await?;

    tracing::info!(
        "Rendered {} cards ({} drafts skipped) in {}ms",
        result.pages,
        result.drafts,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
