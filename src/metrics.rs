//! Process-wide Prometheus registry and the HTTP request metrics recorded by
//! the middleware.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Label value used when the router resolved no matching pattern.
pub const ENDPOINT_UNKNOWN: &str = "unknown";

/// Owns the registry plus typed handles to every metric the service records.
///
/// Cloning is cheap: handles share the underlying atomics, so a clone in each
/// worker mutates the same series.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    requests_active: IntGauge,
    app_info: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests processed"),
            &["method", "endpoint", "status"],
        )?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "endpoint"],
        )?;

        let requests_active = IntGauge::new(
            "http_requests_active",
            "HTTP requests currently in flight",
        )?;

        let app_info = IntGaugeVec::new(
            Opts::new("app_info", "Static application build information"),
            &["version", "environment"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(requests_active.clone()))?;
        registry.register(Box::new(app_info.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            requests_active,
            app_info,
        })
    }

    /// Record one completed request: exactly one counter increment and one
    /// histogram observation, whatever the outcome was.
    pub fn observe_request(&self, method: &str, endpoint: &str, status: u16, duration: Duration) {
        self.requests_total
            .with_label_values(&[method, endpoint, &status.to_string()])
            .inc();
        self.request_duration
            .with_label_values(&[method, endpoint])
            .observe(duration.as_secs_f64());
    }

    pub fn inc_active(&self) {
        self.requests_active.inc();
    }

    pub fn dec_active(&self) {
        self.requests_active.dec();
    }

    pub fn active_requests(&self) -> i64 {
        self.requests_active.get()
    }

    /// Set once at startup; the sample never changes afterwards.
    pub fn set_app_info(&self, version: &str, environment: &str) {
        self.app_info
            .with_label_values(&[version, environment])
            .set(1);
    }

    /// Render the whole registry in the Prometheus text exposition format.
    ///
    /// Families are emitted sorted by name; vector families appear once their
    /// first sample is recorded.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
