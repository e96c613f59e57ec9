use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchlens_api::config::ServerConfig;
use matchlens_api::router::build_app_router;
use matchlens_api::state::AppState;
use matchlens_core::config::AnalysisConfig;
use matchlens_jobs::{JobRegistry, WorkerContext};
use matchlens_narrator::HttpNarrator;
use matchlens_pipeline::assign::NearestPlayerAssigner;
use matchlens_pipeline::engine::{AnnotationWriter, JsonTrackSource};
use matchlens_pipeline::media::FsMediaStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchlens_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let analysis = AnalysisConfig::default();
    analysis
        .validate()
        .expect("Default analysis configuration must be valid");

    // --- Worker collaborators ---
    let worker = Arc::new(WorkerContext {
        store: Arc::new(FsMediaStore::new(&config.media_root)),
        tracker: Arc::new(JsonTrackSource),
        renderer: Arc::new(AnnotationWriter),
        assigner: Arc::new(NearestPlayerAssigner::new(
            analysis.max_player_ball_distance,
        )),
        narrator: Arc::new(HttpNarrator::new(config.narrator_url.clone())),
        config: analysis,
    });
    tracing::info!(
        media_root = %config.media_root,
        narrator_url = %config.narrator_url,
        "Worker collaborators ready",
    );

    // --- App state ---
    let state = AppState {
        registry: Arc::new(JobRegistry::new()),
        worker,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
