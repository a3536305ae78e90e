//! # petclinic-api — Owner Pages for the Pet Clinic
//!
//! Server-rendered HTML pages for registering, finding, editing, and viewing
//! clinic owners. Owners live in an in-memory repository with optional
//! Postgres write-through.
//!
//! ## Routes
//!
//! | Path                     | Module               | Purpose                  |
//! |--------------------------|----------------------|--------------------------|
//! | `/owners/new`            | [`routes::owners`]   | Creation form            |
//! | `/owners/find`, `/owners`| [`routes::owners`]   | Search by last name      |
//! | `/owners/:id`            | [`routes::owners`]   | Detail page              |
//! | `/owners/:id/edit`       | [`routes::owners`]   | Edit form                |
//! | `/health/*`              | this module          | Liveness and readiness   |
//! | `/metrics`               | this module          | Prometheus scrape        |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;
pub mod views;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics_on = state.config.metrics_enabled;

    // Fallback must precede the layers for them to wrap it.
    let mut pages = Router::new()
        .merge(routes::owners::router())
        .fallback(not_found);

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        pages = pages
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(axum::Extension(state.metrics.clone()));
    }

    let pages = pages
        .layer(middleware::tracing_layer::layer())
        .with_state(state.clone());

    let mut probes = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        probes = probes.route("/metrics", get(prometheus_metrics));
    }

    Router::new().merge(probes.with_state(state)).merge(pages)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Refreshes the owner gauge from the repository (pull model), then encodes
/// every registered metric in the text exposition format.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .owners_total()
        .set(state.owners.count() as f64);

    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Fallback for requests that match no route.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no page at {}", uri.path()))
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
///
/// Checks that the database answers when one is configured. Returns 200
/// "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
