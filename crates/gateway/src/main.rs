use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use reqwest::Client;
use shared::protocol::IDEAS_ROUTE;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::Url;

mod config;
mod relay;

use config::{load_settings, parse_upstream_url};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: Client,
    pub(crate) upstream_url: Url,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let upstream_url = parse_upstream_url(&settings.upstream_url)?;
    let state = AppState {
        http: Client::new(),
        upstream_url,
    };
    info!(upstream = %state.upstream_url, "relaying ideas requests");
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(IDEAS_ROUTE, get(relay::relay_ideas))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
