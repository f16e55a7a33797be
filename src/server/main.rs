//! Resolve server.
//!
//! Small HTTP API over the shared resolver, for interactive lookups and for
//! tooling that wants one-off resolutions without a batch run.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tamarack::resolver::Resolver;
use tamarack::{Config, Resolution};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Address resolution server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persisted address cache to preload
    #[arg(long)]
    cache: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    resolver: Resolver,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Tamarack Resolve Server");

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::from_env(),
    };
    let resolver = Resolver::new(&config)?;

    if let Some(cache) = &args.cache {
        let count = resolver.load_persisted_cache(cache)?;
        info!("Cache entries loaded: {}", count);
    }

    let state = Arc::new(AppState { resolver });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/resolve", get(resolve_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let reachable = state.resolver.client().reachable().await;
    Json(HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        search_service: reachable,
        cache_entries: state.resolver.cache().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    search_service: bool,
    cache_entries: usize,
}

#[derive(Deserialize)]
struct ResolveQueryParams {
    /// Raw address to resolve
    address: String,
}

/// Resolve one raw address, including the full strategy trace.
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQueryParams>,
) -> Result<Json<ResolveResponse>, (StatusCode, String)> {
    if params.address.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "address is required".to_string()));
    }

    let resolution = state.resolver.resolve(&params.address).await;
    Ok(Json(ResolveResponse {
        found: resolution.found(),
        resolution: resolution.as_ref().clone(),
    }))
}

#[derive(Serialize)]
struct ResolveResponse {
    found: bool,
    resolution: Resolution,
}
