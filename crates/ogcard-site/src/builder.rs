//! Batch card builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use ogcard_content::{parse_page, PageMeta};
use ogcard_render::{PreviewRequest, RenderError};
use ogcard_style::StyleError;

use crate::pipeline::CardPipeline;

/// Name of the manifest written next to the cards.
pub const MANIFEST_FILE: &str = "og-manifest.json";

/// Configuration for a card build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source content directory
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of cards written
    pub pages: usize,

    /// Number of draft pages skipped
    pub drafts: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// One generated card, as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Page path relative to the content directory
    pub source: String,

    /// Image path relative to the output directory
    pub image: String,

    /// Title as given to the renderer
    pub title: String,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read content directory: {0}")]
    ReadError(String),

    #[error("Failed to parse page: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render card for {path}: {source}")]
    RenderError { path: String, source: RenderError },

    #[error("Invalid card theme: {0}")]
    Style(#[from] StyleError),

    #[error("Failed to load font {path}: {message}")]
    Font { path: String, message: String },

    #[error("Failed to process CSS: {0}")]
    Css(String),

    #[error("Invalid slug '{slug}' in {path}")]
    InvalidSlug { slug: String, path: String },

    #[error("{first} and {second} both produce {image}")]
    Conflict {
        image: String,
        first: String,
        second: String,
    },

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page to be rendered.
#[derive(Debug)]
struct PageInfo {
    /// Path relative to the content dir
    relative_path: PathBuf,

    /// Image path relative to the output dir
    image_path: PathBuf,

    meta: PageMeta,
}

/// Renders one card per content page.
pub struct OgBuilder {
    config: BuildConfig,
    pipeline: CardPipeline,
}

impl OgBuilder {
    pub fn new(config: BuildConfig, pipeline: CardPipeline) -> Self {
        Self { config, pipeline }
    }

    /// Build all cards.
    ///
    /// Cards are rendered in memory first; nothing is written unless every
    /// page renders.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let (pages, drafts) = self.discover_pages()?;
        check_conflicts(&pages)?;

        let rendered: Vec<Result<Vec<u8>, BuildError>> =
            pages.par_iter().map(|page| self.render_page(page)).collect();

        let mut images = Vec::with_capacity(pages.len());
        for result in rendered {
            images.push(result?);
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let mut manifest = Vec::with_capacity(pages.len());
        for (page, bytes) in pages.iter().zip(images) {
            let path = self.config.output_dir.join(&page.image_path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::write(&path, bytes)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))?;

            manifest.push(ManifestEntry {
                source: slash_path(&page.relative_path),
                image: slash_path(&page.image_path),
                title: page.meta.title.clone(),
            });
        }

        self.write_manifest(&manifest)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: manifest.len(),
            drafts,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Discover all non-draft pages, sorted by path. Also returns the draft count.
    fn discover_pages(&self) -> Result<(Vec<PageInfo>, usize), BuildError> {
        let mut pages = Vec::new();
        let mut drafts = 0;

        if !self.config.content_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Content directory not found: {}",
                self.config.content_dir.display()
            )));
        }

        for entry in WalkDir::new(&self.config.content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "mdx" && ext != "md" {
                continue;
            }

            let content = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let page = parse_page(&content).map_err(|e| BuildError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            let relative_path = path
                .strip_prefix(&self.config.content_dir)
                .unwrap_or(path)
                .to_path_buf();

            let stem = relative_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("untitled");
            let meta = page.meta(stem);

            if meta.draft {
                tracing::debug!("Skipping draft {}", relative_path.display());
                drafts += 1;
                continue;
            }

            let image_path = self.image_path(&relative_path, meta.slug.as_deref())?;

            pages.push(PageInfo {
                relative_path,
                image_path,
                meta,
            });
        }

        Ok((pages, drafts))
    }

    /// Image path for a page, relative to the output dir.
    ///
    /// `blog/post.mdx` becomes `blog/post.png`; a slug replaces the path.
    fn image_path(&self, relative: &Path, slug: Option<&str>) -> Result<PathBuf, BuildError> {
        let ext = self.pipeline.format().extension();

        let Some(slug) = slug else {
            return Ok(relative.with_extension(ext));
        };

        let trimmed = slug.trim_matches('/');
        let base = PathBuf::from(trimmed);
        let valid = !trimmed.is_empty()
            && base.components().all(|c| matches!(c, Component::Normal(_)));

        if !valid {
            return Err(BuildError::InvalidSlug {
                slug: slug.to_string(),
                path: relative.display().to_string(),
            });
        }

        Ok(PathBuf::from(format!("{}.{}", trimmed, ext)))
    }

    fn render_page(&self, page: &PageInfo) -> Result<Vec<u8>, BuildError> {
        let request = PreviewRequest::new(page.meta.title.clone(), page.meta.description.clone());

        let bytes = self
            .pipeline
            .render(&request)
            .map_err(|source| BuildError::RenderError {
                path: page.relative_path.display().to_string(),
                source,
            })?;

        tracing::debug!(
            "Rendered {} -> {}",
            page.relative_path.display(),
            page.image_path.display()
        );

        Ok(bytes)
    }

    fn write_manifest(&self, entries: &[ManifestEntry]) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join(MANIFEST_FILE), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }
}

/// Two pages may not write the same image.
fn check_conflicts(pages: &[PageInfo]) -> Result<(), BuildError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();

    for page in pages {
        if let Some(first) = seen.insert(&page.image_path, &page.relative_path) {
            return Err(BuildError::Conflict {
                image: slash_path(&page.image_path),
                first: first.display().to_string(),
                second: page.relative_path.display().to_string(),
            });
        }
    }

    Ok(())
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogcard_render::{CardRenderer, ImageFormat, Node, Rasterizer, SvgRasterizer};
    use ogcard_style::{StyleMap, StyleSource, Tailwind};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn svg_pipeline() -> CardPipeline {
        CardPipeline::new(
            CardRenderer::new(Arc::new(Tailwind::new())),
            Arc::new(SvgRasterizer::default()),
        )
    }

    fn write_page(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn builder(content: &Path, output: &Path, pipeline: CardPipeline) -> OgBuilder {
        OgBuilder::new(
            BuildConfig {
                content_dir: content.to_path_buf(),
                output_dir: output.to_path_buf(),
            },
            pipeline,
        )
    }

    #[tokio::test]
    async fn builds_one_card_per_page() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("dist/og");

        write_page(
            &content,
            "blog/caches.md",
            "---\ntitle: Understanding Caches | moyis.dev\ndescription: How caches work\n---\n",
        );
        write_page(&content, "about.mdx", "# About me\n\nI write things.\n");
        write_page(&content, "notes.txt", "not a page");

        let result = builder(&content, &out, svg_pipeline())
            .build()
            .await
            .unwrap();

        assert_eq!(result.pages, 2);
        assert_eq!(result.drafts, 0);

        let card = fs::read_to_string(out.join("blog/caches.svg")).unwrap();
        assert!(card.contains(">Understanding Caches</tspan>"));
        assert!(card.contains(">How caches work</tspan>"));
        assert!(out.join("about.svg").exists());
        assert!(!out.join("notes.svg").exists());
    }

    #[tokio::test]
    async fn writes_manifest() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("out");

        write_page(&content, "b.md", "---\ntitle: Second\n---\n");
        write_page(&content, "a.md", "---\ntitle: First\nslug: posts/first\n---\n");

        builder(&content, &out, svg_pipeline())
            .build()
            .await
            .unwrap();

        let manifest = fs::read_to_string(out.join(MANIFEST_FILE)).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&manifest).unwrap();

        assert_eq!(
            entries,
            serde_json::json!([
                { "source": "a.md", "image": "posts/first.svg", "title": "First" },
                { "source": "b.md", "image": "b.svg", "title": "Second" },
            ])
        );
        assert!(out.join("posts/first.svg").exists());
    }

    #[tokio::test]
    async fn skips_drafts() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("out");

        write_page(&content, "live.md", "---\ntitle: Live\n---\n");
        write_page(&content, "wip.md", "---\ntitle: WIP\ndraft: true\n---\n");

        let result = builder(&content, &out, svg_pipeline())
            .build()
            .await
            .unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.drafts, 1);
        assert!(!out.join("wip.svg").exists());
    }

    #[tokio::test]
    async fn render_failure_writes_nothing() {
        struct Broken;

        impl StyleSource for Broken {
            fn translate(&self, classes: &str) -> Result<StyleMap, StyleError> {
                Err(StyleError::UnknownClass(classes.to_string()))
            }
        }

        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("out");
        write_page(&content, "post.md", "---\ntitle: Post\n---\n");

        let pipeline = CardPipeline::new(
            CardRenderer::new(Arc::new(Broken)),
            Arc::new(SvgRasterizer::default()),
        );

        let result = builder(&content, &out, pipeline).build().await;

        match result {
            Err(BuildError::RenderError { path, .. }) => assert_eq!(path, "post.md"),
            other => panic!("expected render error, got {:?}", other.map(|r| r.pages)),
        }
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn rasterizer_failure_aborts_build() {
        struct Failing(ogcard_render::Canvas);

        impl Rasterizer for Failing {
            fn format(&self) -> ImageFormat {
                ImageFormat::Png
            }

            fn canvas(&self) -> &ogcard_render::Canvas {
                &self.0
            }

            fn rasterize(&self, _tree: &Node) -> Result<Vec<u8>, RenderError> {
                Err(RenderError::Raster("out of memory".to_string()))
            }
        }

        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        write_page(&content, "post.md", "# Post\n");

        let pipeline = CardPipeline::new(
            CardRenderer::new(Arc::new(Tailwind::new())),
            Arc::new(Failing(ogcard_render::Canvas::default())),
        );

        let result = builder(&content, &temp.path().join("out"), pipeline)
            .build()
            .await;

        assert!(matches!(result, Err(BuildError::RenderError { .. })));
    }

    #[tokio::test]
    async fn rejects_conflicting_slugs() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");

        write_page(&content, "a.md", "---\nslug: same\n---\n");
        write_page(&content, "b.md", "---\nslug: same\n---\n");

        let result = builder(&content, &temp.path().join("out"), svg_pipeline())
            .build()
            .await;

        assert!(matches!(result, Err(BuildError::Conflict { .. })));
    }

    #[tokio::test]
    async fn rejects_escaping_slug() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");

        write_page(&content, "a.md", "---\nslug: ../../etc/card\n---\n");

        let result = builder(&content, &temp.path().join("out"), svg_pipeline())
            .build()
            .await;

        assert!(matches!(result, Err(BuildError::InvalidSlug { .. })));
    }

    #[tokio::test]
    async fn missing_content_dir_is_an_error() {
        let temp = tempdir().unwrap();

        let result = builder(
            &temp.path().join("nope"),
            &temp.path().join("out"),
            svg_pipeline(),
        )
        .build()
        .await;

        assert!(matches!(result, Err(BuildError::ReadError(_))));
    }
}
