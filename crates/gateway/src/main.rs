//! Pressroom API Gateway
//!
//! The entry point for all archive API requests. Handles:
//! - Metadata CRUD routes for the admin SPA (legacy paths preserved)
//! - Media store auth and best-effort delete routes
//! - Issue upload / deletion orchestration routes
//! - Read views (issues, topics, topic PDFs by date)
//! - Observability (logging, metrics, request tracing)

mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use pressroom_common::{config::AppConfig, db::DbPool, media::ImageKitClient, metrics};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub media: ImageKitClient,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_new(&config.observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Starting Pressroom gateway v{}", pressroom_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Metrics exporter listening on {}", addr);
    }

    // Initialize database connection and schema
    let db = DbPool::new(&config.database).await?;
    db.migrate().await?;

    // Media store client
    let media = ImageKitClient::new(config.media.clone());

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        media,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS open to any origin, as the SPA is served from a different host
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let max_body = state.config.server.max_upload_bytes;

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Media store endpoints (legacy SPA paths)
        .route("/ik-auth", get(handlers::media::upload_auth))
        .route("/ik-delete", post(handlers::media::delete_media))
        // Metadata endpoints (legacy SPA paths)
        .route("/sb-files", get(handlers::files::list_files))
        .route("/sb-upsert", post(handlers::files::upsert_file))
        .route("/sb-delete", post(handlers::files::delete_files))
        .route(
            "/sb-newspapers",
            get(handlers::newspapers::list)
                .post(handlers::newspapers::create)
                .delete(handlers::newspapers::remove),
        )
        // Issue orchestration
        .route("/issues/upload", post(handlers::issues::upload_issue))
        .route("/issues/delete", post(handlers::issues::delete_issue))
        // Read views
        .route("/issues", get(handlers::issues::list_issues))
        .route("/topics", get(handlers::issues::list_topics))
        .route("/topics/{topic}/pdfs", get(handlers::issues::list_topic_pdfs))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
