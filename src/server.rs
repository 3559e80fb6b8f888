//! HTTP endpoint serving the rendered dashboard.
//!
//! Every request renders from scratch: fetch, compose, lay out, rasterize.
//! Nothing is cached between requests.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info};

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::layout::{self, PanelLayout};
use crate::render::{Rasterizer, to_svg};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
    pub rasterizer: Rasterizer,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch_timeout())?;
        let rasterizer =
            Rasterizer::new(config.fonts.dir.as_deref(), config.fonts.family.as_deref());
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            rasterizer,
        })
    }

    async fn layout(&self) -> PanelLayout {
        let data = self.fetcher.dashboard(&self.config).await;
        layout::compose(&data)
    }

    pub async fn render_svg(&self) -> String {
        to_svg(&self.layout().await)
    }

    /// One full frame as PNG. Rasterization is the only step that can fail.
    pub async fn render_png(&self) -> Result<Vec<u8>> {
        let started = Instant::now();
        let svg = self.render_svg().await;
        let fetched = started.elapsed();

        let rasterizer = self.rasterizer.clone();
        let png = tokio::task::spawn_blocking(move || rasterizer.render_png(&svg))
            .await
            .context("rasterizer task panicked")??;

        info!(
            target: "render",
            fetch_ms = fetched.as_millis() as u64,
            total_ms = started.elapsed().as_millis() as u64,
            bytes = png.len(),
            "frame rendered"
        );
        Ok(png)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/dashboard.png", get(dashboard_png))
        .route("/dashboard.svg", get(dashboard_svg))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(target: "server", addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .await
        .context("http server")
}

async fn dashboard_png(State(state): State<AppState>) -> Response {
    match state.render_png().await {
        Ok(png) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            png,
        )
            .into_response(),
        Err(e) => {
            error!(target: "server", "render failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("render failed: {e:#}")).into_response()
        }
    }
}

async fn dashboard_svg(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        state.render_svg().await,
    )
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every upstream points at a closed local port, so each render is
    /// composed entirely of placeholders.
    fn offline_config() -> Config {
        let mut config = Config::default();
        config.weather.forecast_url = "http://127.0.0.1:9/forecast".into();
        config.twilight.api_url = "http://127.0.0.1:9/twilight".into();
        config.calendar.urls = vec!["http://127.0.0.1:9/cal.ics".into()];
        config.fetch.timeout_secs = 2;
        config
    }

    async fn spawn(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn healthz_answers() {
        let base = spawn(AppState::new(offline_config()).unwrap()).await;
        let body = reqwest::get(format!("{base}/healthz")).await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn svg_route_serves_placeholder_dashboard() {
        let base = spawn(AppState::new(offline_config()).unwrap()).await;
        let resp = reqwest::get(format!("{base}/dashboard.svg")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let body = resp.text().await.unwrap();
        assert!(body.contains("NO UPCOMING EVENTS"));
        assert!(body.contains(">ERR<"));
        assert!(body.contains("NO IMAGERY"));
    }

    #[tokio::test]
    async fn png_route_serves_portrait_png() {
        let base = spawn(AppState::new(offline_config()).unwrap()).await;
        let resp = reqwest::get(format!("{base}/dashboard.png")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = resp.bytes().await.unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (460, 640));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let base = spawn(AppState::new(offline_config()).unwrap()).await;
        let resp = reqwest::get(format!("{base}/nope")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
