//! Initialize ogcard in a blog project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ogcard_site::DEFAULT_SITE_TOML;

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing ogcard...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_SITE_TOML)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let base = config_path.parent().unwrap_or(Path::new(""));

    let blog_dir = base.join("src/content/blog");
    fs::create_dir_all(&blog_dir).context("Failed to create content directory")?;

    let post_path = blog_dir.join("hello-world.md");
    if !post_path.exists() || yes {
        fs::write(&post_path, SAMPLE_POST).context("Failed to write sample post")?;
        tracing::info!("Created {}", post_path.display());
    }

    fs::create_dir_all(base.join("fonts")).context("Failed to create fonts directory")?;
    tracing::info!("Put GeistSans-Regular.ttf in fonts/ or edit the card fonts in site.toml");

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'ogcard build' to render cards.");

    Ok(())
}

const SAMPLE_POST: &str = r#"---
title: Hello World | moyis.dev
description: The first post on this blog, and the card that goes with it.
pubDate: 2025-01-01
---

# Hello World

This post exists so `ogcard build` has something to render.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use ogcard_site::SiteConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_config_and_sample_post() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("site.toml");

        run(&config, false).await.unwrap();

        assert!(SiteConfig::load(&config).is_ok());
        assert!(temp.path().join("src/content/blog/hello-world.md").exists());
    }

    #[tokio::test]
    async fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("site.toml");
        fs::write(&config, "site = \"https://example.org\"\n").unwrap();

        run(&config, false).await.unwrap();

        assert_eq!(
            fs::read_to_string(&config).unwrap(),
            "site = \"https://example.org\"\n"
        );
    }
}
