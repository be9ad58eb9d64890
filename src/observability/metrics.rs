use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Lazily initializes and returns the process-wide metrics.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Prometheus text exposition of everything registered so far.
pub async fn render_metrics() -> String {
    let metrics = get_metrics().await;
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(err) = encoder.encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!("metrics encode failed: {}", err);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub const OUTCOME_CACHE_HIT: &str = "cache_hit";
pub const OUTCOME_FETCHED: &str = "fetched";
pub const OUTCOME_UNCACHED: &str = "uncached";
pub const OUTCOME_REJECTED: &str = "rejected";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_requests: IntCounterVec,

    // Transport metrics
    pub api_requests: IntCounterVec,
    pub api_request_failures: IntCounterVec,
    pub api_request_duration: HistogramVec,

    // Local files
    pub cursor_writes: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("easemob".into()), None)
            .expect("static registry prefix is valid");

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Bearer token lookups by outcome"), &["outcome"]).expect("token_requests_total"),

            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "HTTP requests sent by verb"), &["verb"]).expect("api_requests_total"),
            api_request_failures: IntCounterVec::new(Opts::new("api_request_failures_total", "HTTP requests that failed before a response"), &["verb", "reason"]).expect("api_request_failures_total"),
            api_request_duration: HistogramVec::new(HistogramOpts::new("api_request_duration_seconds", "HTTP request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["verb"]).expect("api_request_duration_seconds"),

            cursor_writes: IntCounterVec::new(Opts::new("cursor_writes_total", "Pagination cursors written to disk"), &["file"]).expect("cursor_writes_total"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        for collector in [
            Box::new(metrics.token_requests.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(metrics.api_requests.clone()),
            Box::new(metrics.api_request_failures.clone()),
            Box::new(metrics.api_request_duration.clone()),
            Box::new(metrics.cursor_writes.clone()),
        ] {
            if let Err(err) = reg.register(collector) {
                tracing::error!("metric registration failed: {}", err);
            }
        }

        metrics
    }
}
