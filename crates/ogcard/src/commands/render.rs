//! Single card render command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use ogcard_render::{ImageFormat, PreviewRequest};
use ogcard_site::CardPipeline;

use super::load_site;

/// Output of the render command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Png,
    Svg,
    /// The node tree, before layout
    Json,
}

impl RenderFormat {
    fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Png => "png",
            RenderFormat::Svg => "svg",
            RenderFormat::Json => "json",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            RenderFormat::Png => ImageFormat::Png,
            RenderFormat::Svg | RenderFormat::Json => ImageFormat::Svg,
        }
    }
}

/// Run the render command.
pub async fn run(
    config_path: &Path,
    title: String,
    description: String,
    output: Option<PathBuf>,
    format: RenderFormat,
) -> Result<()> {
    let (site, base) = load_site(config_path)?;

    let pipeline = CardPipeline::from_site(&site, &base, Some(format.image_format()))?;
    let request = PreviewRequest::new(title, description);

    let bytes = match format {
        RenderFormat::Json => pipeline
            .tree(&request)?
            .to_json()
            .context("Failed to serialize node tree")?
            .into_bytes(),
        _ => pipeline.render(&request)?,
    };

    let path = output.unwrap_or_else(|| default_output(format));
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());

    Ok(())
}

fn default_output(format: RenderFormat) -> PathBuf {
    PathBuf::from(format!("og.{}", format.extension()))
}
