//! Metrics for Agri Anchor
//!
//! Counters and latency histograms kept in process and exported in
//! Prometheus text format on `/metrics`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Process-wide metrics registry
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub async fn inc_counter(&self, name: &str) {
        if let Some(counter) = self.counters.read().await.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.counters
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Get a counter value
    pub async fn get_counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .await
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Record a latency observation in seconds
    pub async fn observe_seconds(&self, name: &str, seconds: f64) {
        if let Some(histogram) = self.histograms.read().await.get(name) {
            histogram.observe(seconds);
            return;
        }

        self.histograms
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::default()))
            .observe(seconds);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus text format
    pub async fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP agri_anchor_uptime_seconds Time since service start\n");
        output.push_str("# TYPE agri_anchor_uptime_seconds gauge\n");
        output.push_str(&format!(
            "agri_anchor_uptime_seconds {}\n",
            self.uptime_seconds()
        ));

        let counters = self.counters.read().await;
        let mut names: Vec<&String> = counters.keys().collect();
        names.sort();
        for name in names {
            let prometheus_name = prometheus_name(name);
            output.push_str(&format!("# TYPE {} counter\n", prometheus_name));
            output.push_str(&format!(
                "{} {}\n",
                prometheus_name,
                counters[name].load(Ordering::Relaxed)
            ));
        }

        let histograms = self.histograms.read().await;
        let mut names: Vec<&String> = histograms.keys().collect();
        names.sort();
        for name in names {
            output.push_str(&histograms[name].to_prometheus(name));
        }

        output
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn prometheus_name(name: &str) -> String {
    name.replace(['.', '-'], "_")
}

/// Fixed-bucket histogram
pub struct Histogram {
    buckets: Vec<f64>,
    counts: Vec<AtomicU64>,
    /// Sum in microseconds
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(buckets: Vec<f64>) -> Self {
        let counts = buckets.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value: f64) {
        self.sum_micros
            .fetch_add((value * 1_000_000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        if let Some(i) = self.buckets.iter().position(|bound| value <= *bound) {
            self.counts[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn to_prometheus(&self, name: &str) -> String {
        let prometheus_name = prometheus_name(name);
        let mut output = format!("# TYPE {} histogram\n", prometheus_name);

        let mut cumulative = 0u64;
        for (bound, count) in self.buckets.iter().zip(&self.counts) {
            cumulative += count.load(Ordering::Relaxed);
            output.push_str(&format!(
                "{}_bucket{{le=\"{}\"}} {}\n",
                prometheus_name, bound, cumulative
            ));
        }

        let total = self.count();
        output.push_str(&format!(
            "{}_bucket{{le=\"+Inf\"}} {}\n",
            prometheus_name, total
        ));
        output.push_str(&format!(
            "{}_sum {}\n",
            prometheus_name,
            self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
        ));
        output.push_str(&format!("{}_count {}\n", prometheus_name, total));
        output
    }
}

impl Default for Histogram {
    fn default() -> Self {
        // RPC round trips; public testnets can take several seconds
        Self::new(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])
    }
}

/// Predefined metric names
pub mod metric_names {
    pub const CLAIMS_FILED: &str = "agri_anchor.claims.filed";
    pub const CLAIMS_REJECTED: &str = "agri_anchor.claims.rejected";

    pub const PROOFS_SUBMITTED: &str = "agri_anchor.proofs.submitted";
    pub const PROOFS_ALREADY_ANCHORED: &str = "agri_anchor.proofs.already_anchored";
    pub const PROOFS_FAILED: &str = "agri_anchor.proofs.failed";
    pub const GAS_ESTIMATE_FALLBACKS: &str = "agri_anchor.gas.estimate_fallbacks";

    pub const ANCHOR_LATENCY: &str = "agri_anchor.anchor.latency_seconds";
}
