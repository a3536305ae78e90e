//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware, labelled by matched route template. The owner gauge is
//! refreshed on each `/metrics` scrape (pull model), see the metrics handler
//! in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    core::Collector, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    owners_total: Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("petclinic_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "petclinic_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )?;

        let http_errors_total = IntCounterVec::new(
            Opts::new(
                "petclinic_http_errors_total",
                "Total HTTP errors (4xx and 5xx)",
            ),
            &["method", "path", "status"],
        )?;

        let owners_total = Gauge::new("petclinic_owners_total", "Total registered owners")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_errors_total.clone()))?;
        registry.register(Box::new(owners_total.clone()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                owners_total,
            }),
        })
    }

    /// Return current total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        sum_counter(&self.inner.http_requests_total)
    }

    /// Return current total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        sum_counter(&self.inner.http_errors_total)
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Access the owners gauge for updating.
    pub fn owners_total(&self) -> &Gauge {
        &self.inner.owners_total
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

fn sum_counter(counter: &IntCounterVec) -> u64 {
    let families = counter.collect();
    families
        .iter()
        .flat_map(|mf| mf.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

/// Path label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// The route template the request matched (e.g. `/owners/:owner_id/edit`),
/// or [`UNMATCHED_ROUTE`] when no route matched.
///
/// Keeps Prometheus label cardinality bounded by the route table, not by
/// whatever paths clients send.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new().unwrap();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn requests_increments() {
        let m = ApiMetrics::new().unwrap();
        m.record_request("GET", "/owners/find", 200, 0.01);
        assert_eq!(m.requests(), 1);
        m.record_request("POST", "/owners/new", 303, 0.02);
        m.record_request("GET", "/owners/{id}", 200, 0.005);
        assert_eq!(m.requests(), 3);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn client_and_server_errors_both_count() {
        let m = ApiMetrics::new().unwrap();
        m.record_request("GET", "/owners/{id}", 404, 0.05);
        m.record_request("GET", "/owners/find", 500, 0.1);
        assert_eq!(m.errors(), 2);
        assert_eq!(m.requests(), 2);
    }

    #[test]
    fn concurrent_increments_are_safe() {
        let m = ApiMetrics::new().unwrap();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        m.record_request("GET", "/owners", 200, 0.001);
                        m.record_request("GET", "/owners/{id}", 404, 0.001);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(m.requests(), 8_000);
        assert_eq!(m.errors(), 4_000);
    }

    #[test]
    fn instances_have_independent_registries() {
        let a = ApiMetrics::new().unwrap();
        let b = ApiMetrics::new().unwrap();
        a.record_request("GET", "/owners", 200, 0.01);
        assert_eq!(a.requests(), 1);
        assert_eq!(b.requests(), 0);
    }

    #[test]
    fn gather_and_encode_includes_owner_gauge() {
        let m = ApiMetrics::new().unwrap();
        m.record_request("GET", "/owners", 200, 0.01);
        m.owners_total().set(2.0);
        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("petclinic_http_requests_total"));
        assert!(output.contains("petclinic_http_request_duration_seconds"));
        assert!(output.contains("petclinic_owners_total 2"));
    }

    // -- Route labelling ------------------------------------------------------

    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    fn labelled_app(m: &ApiMetrics) -> Router {
        Router::new()
            .route("/owners/:owner_id", get(|| async { "owner" }))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(axum::middleware::from_fn(metrics_middleware))
            .layer(Extension(m.clone()))
    }

    async fn send(app: &Router, uri: &str) -> StatusCode {
        let req = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(req).await.unwrap().status()
    }

    fn request_series(m: &ApiMetrics) -> Vec<String> {
        m.gather_and_encode()
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("petclinic_http_requests_total{"))
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn matched_requests_use_route_template() {
        let m = ApiMetrics::new().unwrap();
        let app = labelled_app(&m);
        assert_eq!(send(&app, "/owners/1").await, StatusCode::OK);
        assert_eq!(send(&app, "/owners/2").await, StatusCode::OK);

        let series = request_series(&m);
        assert_eq!(series.len(), 1, "{series:?}");
        assert!(series[0].contains(r#"path="/owners/:owner_id""#));
        assert!(series[0].ends_with(" 2"));
    }

    #[tokio::test]
    async fn unrouted_paths_share_one_series() {
        let m = ApiMetrics::new().unwrap();
        let app = labelled_app(&m);
        for uri in ["/scan/a0", "/scan/a1", "/scan/a2", "/wp-login.php", "/"] {
            assert_eq!(send(&app, uri).await, StatusCode::NOT_FOUND);
        }

        let series = request_series(&m);
        assert_eq!(series.len(), 1, "{series:?}");
        assert!(series[0].contains(r#"path="unmatched""#));
        assert!(series[0].ends_with(" 5"));
        assert_eq!(m.errors(), 5);
    }
}
