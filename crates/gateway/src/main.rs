//! BioLens API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Question routing against patient profiles
//! - Citation lookup and marker resolution
//! - Session transcripts
//! - Rate limiting
//! - Observability (logging, metrics)

mod extract;
mod handlers;
mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use biolens_common::{
    citations::CitationRegistry,
    config::AppConfig,
    context::TranscriptStore,
    errors::{AppError, Result},
    metrics,
    profile::{ProfileSource, StaticProfileSource},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{signal, sync::watch};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How often expired sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub profiles: Arc<dyn ProfileSource>,
    pub citations: &'static CitationRegistry,
    pub transcripts: Arc<TranscriptStore>,
}

impl AppState {
    /// State backed by the demo roster and the built-in registry
    pub fn new(config: AppConfig) -> Self {
        let transcripts = TranscriptStore::new(config.ask.transcript_window, config.session_ttl());
        Self {
            config: Arc::new(config),
            profiles: Arc::new(StaticProfileSource::demo()),
            citations: CitationRegistry::global(),
            transcripts: Arc::new(transcripts),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    init_tracing(&config);

    info!(
        service = %config.observability.service_name,
        "Starting BioLens API Gateway v{}",
        biolens_common::VERSION
    );

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .set_buckets(metrics::LATENCY_BUCKETS)
            .and_then(|builder| builder.install())
            .map_err(|e| AppError::Configuration {
                message: format!("Prometheus exporter: {}", e),
            })?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }
    metrics::register_metrics();

    let state = AppState::new(config);
    info!(
        patients = state.profiles.len(),
        citations = state.citations.len(),
        "Demo data loaded"
    );

    spawn_session_sweeper(state.transcripts.clone());

    let config = state.config.clone();
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    // In-flight requests get `shutdown_timeout` to drain once a signal arrives
    let (draining_tx, mut draining_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            draining_tx.send(true).ok();
        })
        .into_future();

    let shutdown_timeout = config.shutdown_timeout();
    tokio::select! {
        result = server => result?,
        _ = async {
            draining_rx.wait_for(|draining| *draining).await.ok();
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping open connections"
            );
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Periodically drop expired sessions and refresh the active gauge
fn spawn_session_sweeper(transcripts: Arc<TranscriptStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            transcripts.purge_expired().await;
            metrics::record_active_sessions(transcripts.live_len().await);
        }
    });
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Ask endpoints
        .route("/ask", post(handlers::ask::ask))
        .route("/suggestions", get(handlers::ask::suggestions))

        // Citation endpoints
        .route("/citations", get(handlers::citations::list_citations))
        .route("/citations/resolve", post(handlers::citations::resolve_text))
        .route("/citations/{key}", get(handlers::citations::get_citation))

        // Patient endpoints
        .route("/patients", get(handlers::patients::list_patients))
        .route("/patients/{id}", get(handlers::patients::get_patient))

        // Session endpoints
        .route("/sessions", post(handlers::sessions::create_session))
        .route("/sessions/{id}", get(handlers::sessions::get_session))
        .route("/sessions/{id}/turns", post(handlers::sessions::submit_turn));

    let rate_limit = &state.config.rate_limit;
    if rate_limit.enabled {
        let limiter =
            middleware::rate_limit::create_rate_limiter(rate_limit.requests_per_second, rate_limit.burst);
        api_routes = api_routes.layer(from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit_middleware,
        ));
    }

    let server = &state.config.server;
    let body_limit = DefaultBodyLimit::max(server.max_request_bytes);
    let timeout = TimeoutLayer::new(state.config.request_timeout());

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .fallback(handlers::not_found)
        .layer(from_fn(middleware::metrics::track_metrics))
        .layer(body_limit)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
