// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::configure;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// One registry per running service. Each role registers only its own
// families into it:
// - customer: registration outcomes, collaborator calls (count and latency)
// - notification: notifications recorded
//
// Scraped via /metrics on the service's own HTTP port.
// ============================================================================

pub struct Metrics {
    registry: Registry,
    service: &'static str,
}

impl Metrics {
    pub fn new(service: &'static str) -> Self {
        Self {
            registry: Registry::new(),
            service,
        }
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn service(&self) -> &'static str {
        self.service
    }
}

pub struct CustomerMetrics {
    pub registrations: IntCounterVec,
    pub downstream_calls: IntCounterVec,
    pub downstream_call_duration: HistogramVec,
}

impl CustomerMetrics {
    pub fn register(registry: &Registry) -> anyhow::Result<Self> {
        let registrations = IntCounterVec::new(
            Opts::new("customer_registrations_total", "Customer registration attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(registrations.clone()))?;

        let downstream_calls = IntCounterVec::new(
            Opts::new("downstream_calls_total", "Calls made to collaborator services"),
            &["collaborator", "result"],
        )?;
        registry.register(Box::new(downstream_calls.clone()))?;

        let downstream_call_duration = HistogramVec::new(
            HistogramOpts::new("downstream_call_duration_seconds", "Collaborator call duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["collaborator"],
        )?;
        registry.register(Box::new(downstream_call_duration.clone()))?;

        Ok(Self {
            registrations,
            downstream_calls,
            downstream_call_duration,
        })
    }

    /// Helper to record how a registration attempt ended
    pub fn record_registration(&self, outcome: &str) {
        self.registrations.with_label_values(&[outcome]).inc();
    }

    /// Helper to record a collaborator call
    pub fn record_downstream_call(&self, collaborator: &str, duration_secs: f64, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.downstream_calls.with_label_values(&[collaborator, result]).inc();
        self.downstream_call_duration
            .with_label_values(&[collaborator])
            .observe(duration_secs);
    }
}

pub struct NotificationMetrics {
    pub notifications_recorded: IntCounter,
}

impl NotificationMetrics {
    pub fn register(registry: &Registry) -> anyhow::Result<Self> {
        let notifications_recorded = IntCounter::new(
            "notifications_recorded_total",
            "Notifications persisted (no delivery is attempted)",
        )?;
        registry.register(Box::new(notifications_recorded.clone()))?;

        Ok(Self { notifications_recorded })
    }

    pub fn record_notification(&self) {
        self.notifications_recorded.inc();
    }
}
