//! Card server command.
//!
//! Renders cards on request and serves the built output directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use ogcard_render::{ImageFormat, PreviewRequest};
use ogcard_site::{CardPipeline, SiteConfig};
use tower_http::services::ServeDir;

use super::load_site;

#[derive(Clone)]
struct AppState {
    /// Missing when the card fonts could not be loaded
    png: Option<CardPipeline>,
    svg: CardPipeline,
}

impl AppState {
    /// Build both pipelines. A PNG pipeline that fails to build is logged
    /// and left out so SVG cards are still served.
    fn from_site(site: &SiteConfig, base: &Path) -> Result<Self> {
        let svg = CardPipeline::from_site(site, base, Some(ImageFormat::Svg))?;

        let png = match CardPipeline::from_site(site, base, Some(ImageFormat::Png)) {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                tracing::warn!("PNG cards disabled, serving SVG only: {}", e);
                None
            }
        };

        Ok(Self { png, svg })
    }
}

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>) -> Result<()> {
    let (site, base) = load_site(config_path)?;

    let state = AppState::from_site(&site, &base)?;
    let png_enabled = state.png.is_some();

    let dir = dir.unwrap_or_else(|| base.join(&site.content.output));
    if !dir.exists() {
        tracing::warn!(
            "Directory not found: {}. Run 'ogcard build' to serve prebuilt cards.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let app = router(state, &dir);

    if png_enabled {
        tracing::info!("Serving cards at http://{}/og.png", addr);
    }
    tracing::info!("Serving cards at http://{}/og.svg", addr);
    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState, dir: &Path) -> Router {
    Router::new()
        .route("/og.png", get(png_handler))
        .route("/og.svg", get(svg_handler))
        .fallback_service(ServeDir::new(dir))
        .with_state(state)
}

/// Handler for PNG cards.
async fn png_handler(
    State(state): State<AppState>,
    Query(request): Query<PreviewRequest>,
) -> Response {
    match state.png {
        Some(pipeline) => render_card(pipeline, request).await,
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "PNG cards are unavailable, check the card fonts. Use /og.svg instead.",
        )
            .into_response(),
    }
}

/// Handler for SVG cards.
async fn svg_handler(
    State(state): State<AppState>,
    Query(request): Query<PreviewRequest>,
) -> Response {
    render_card(state.svg, request).await
}

/// Render off the async runtime; layout and rasterization are CPU-bound.
async fn render_card(pipeline: CardPipeline, request: PreviewRequest) -> Response {
    let format = pipeline.format();
    let title = request.title.clone();

    match tokio::task::spawn_blocking(move || pipeline.render(&request)).await {
        Ok(Ok(bytes)) => {
            tracing::debug!("Rendered {} card for '{}'", format, title);
            ([(header::CONTENT_TYPE, format.content_type())], bytes).into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!("Failed to render card for '{}': {}", title, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!("Render task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
