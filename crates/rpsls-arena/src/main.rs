//! RPSLS Arena Service
//!
//! HTTP service hosting commit-reveal games of Rock-Paper-Scissors-Lizard-Spock.
//! Callers are identified by the `X-Player-Id` header, which the fronting
//! wallet/auth layer is trusted to set.

mod config;
mod handlers;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::ArenaConfig;
use handlers::*;
use state::AppState;

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Games
        .route("/api/games", post(create_game))
        .route("/api/games/open", get(list_open_games))
        .route("/api/games/mine", get(list_my_games))
        .route("/api/games/:id", get(get_game))
        .route("/api/games/:id/join", post(join_game))
        .route("/api/games/:id/reveal", post(reveal_move))
        .route("/api/games/:id/timeout", post(claim_timeout))
        .route(
            "/api/games/:id/timeout/before-join",
            post(claim_timeout_before_join),
        )
        .route(
            "/api/games/:id/timeout/after-join",
            post(claim_timeout_after_join),
        )
        // Ledger
        .route("/api/balances/:player", get(get_balance))
        // Tooling
        .route("/api/commitments", post(compute_commitment))
        .route("/api/system/tick", post(tick))
        // Health
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ArenaConfig::from_env();
    tracing::info!(
        "Default game timeout {}s (max {}s)",
        config.default_timeout.num_seconds(),
        config.max_timeout.num_seconds()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_router(AppState::new(config));

    tracing::info!("Arena service starting on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
