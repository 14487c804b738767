mod analysis;
mod config;
mod errors;
mod models;
mod presentation;
mod profile;
mod recommendations;
mod routes;
mod service_client;
mod session;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisCache;
use crate::config::Config;
use crate::profile::SkillProfileStore;
use crate::routes::build_router;
use crate::service_client::{AnalysisClient, RecommendationClient, ServiceClient};
use crate::session::RecommendationSession;
use crate::state::AppState;
use crate::storage::{FileStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skillmatch v{}", env!("CARGO_PKG_VERSION"));

    // Durable profile storage (per-user files) and the per-process handoff slot
    let durable = FileStore::new(&config.data_dir, config.storage_quota_bytes);
    info!("Profile storage at {}", durable.dir().display());
    let profile = SkillProfileStore::open(Arc::new(durable));
    info!("Loaded {} skills", profile.skills().len());

    let session = RecommendationSession::new(
        Arc::new(MemoryStore::new()),
        config.recommendation_top_k,
    );

    // Inference service clients share one connection pool and timeout
    let service = ServiceClient::new(&config.inference_api_url, config.service_timeout)?;
    info!(
        "Inference service at {} (timeout {:?})",
        service.base_url(),
        config.service_timeout
    );
    let recommender = Arc::new(RecommendationClient::new(service.clone()));
    let analysis = AnalysisCache::new(Arc::new(AnalysisClient::new(service)));

    let state = AppState::new(profile, session, recommender, analysis);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
