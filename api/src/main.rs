//! Rally API Server
//!
//! Doubles court rotation for drop-in groups: recommends the next 2v2
//! match, records scores and keeps Elo-style ratings.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;

use adapters::{PostgresGroupRepository, PostgresMatchRepository, PostgresPlayerRepository};
use app::{GroupService, MatchService, MatchmakerDebug, PlayerService};
use auth::EditorTokenSigner;
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub group_service: Arc<GroupService<PostgresGroupRepository>>,
    pub player_service: Arc<PlayerService<PostgresPlayerRepository>>,
    pub match_service: Arc<MatchService<PostgresPlayerRepository, PostgresMatchRepository>>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rally_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rally API...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Create adapters
    let group_repo = Arc::new(PostgresGroupRepository::new(db.clone()));
    let player_repo = Arc::new(PostgresPlayerRepository::new(db.clone()));
    let match_repo = Arc::new(PostgresMatchRepository::new(db.clone()));

    let debug = MatchmakerDebug::from_config(&config);
    if debug.is_enabled() {
        tracing::info!("Matchmaker debug events enabled");
    }

    // Create application services
    let state = AppState {
        group_service: Arc::new(GroupService::new(
            group_repo,
            EditorTokenSigner::new(&config.editor_token_secret, config.editor_token_ttl_secs),
        )),
        player_service: Arc::new(PlayerService::new(player_repo.clone())),
        match_service: Arc::new(MatchService::new(player_repo, match_repo, debug)),
    };

    // Rate limiting config: 2 req/sec sustained, burst of 5
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    // Rate-limited routes (group creation, PIN unlock)
    let rate_limited_routes = Router::new()
        .route("/groups", post(handlers::create_group))
        .route("/groups/:slug/unlock", post(handlers::unlock))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Build router
    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Public group overview
        .route("/groups/:slug", get(handlers::get_group))
        // Editor routes (bearer token checked by the `Editor` extractor)
        .route("/groups/:slug/players", post(handlers::update_players))
        .route("/groups/:slug/recommend", post(handlers::recommend))
        .route("/groups/:slug/submit_score", post(handlers::submit_score))
        .route("/groups/:slug/edit_score", post(handlers::edit_score))
        .merge(rate_limited_routes)
        // Middleware
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
