//! Run metrics for a pipeline execution.
//!
//! A [`MetricsCollector`] is a cheap-to-clone handle around a shared map of
//! named metrics plus start/end timestamps. The driver records one counter per
//! stage outcome and a timing gauge per stage; the whole set is exported into
//! `metadata.json` and logged once when the run ends.
//!
//! # Example
//!
//! ```
//! use visitbeam::metrics::MetricsCollector;
//!
//! let metrics = MetricsCollector::new();
//! metrics.record_start();
//! metrics.increment_counter("records_loaded", 3);
//! metrics.increment_counter("records_loaded", 2);
//! metrics.record_end();
//!
//! assert_eq!(metrics.counter("records_loaded"), Some(5));
//! assert!(metrics.elapsed().is_some());
//! ```

use serde_json::{Value, json};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::info;

/// A named value that can be exported as JSON.
pub trait Metric: Send + Sync + Any {
    fn name(&self) -> &str;

    fn value(&self) -> Value;

    fn description(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Thread-safe container for the metrics of one run.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsCollectorInner>>,
}

struct MetricsCollectorInner {
    metrics: BTreeMap<String, Box<dyn Metric>>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsCollectorInner {
                metrics: BTreeMap::new(),
                start_time: None,
                end_time: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsCollectorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a metric, replacing any metric with the same name.
    pub fn register(&self, metric: Box<dyn Metric>) {
        self.lock().metrics.insert(metric.name().to_string(), metric);
    }

    pub fn record_start(&self) {
        self.lock().start_time = Some(Instant::now());
    }

    pub fn record_end(&self) {
        self.lock().end_time = Some(Instant::now());
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let inner = self.lock();
        match (inner.start_time, inner.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Add `value` to the counter `name`, creating it at zero if needed.
    pub fn increment_counter(&self, name: &str, value: u64) {
        let current = self.counter(name).unwrap_or(0);
        self.set_counter(name, current + value);
    }

    pub fn set_counter(&self, name: &str, value: u64) {
        self.register(Box::new(CounterMetric::with_value(name, value)));
    }

    /// Current value of counter `name`, if one is registered.
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.lock()
            .metrics
            .get(name)
            .and_then(|m| m.as_any().downcast_ref::<CounterMetric>())
            .map(|c| c.count)
    }

    /// Record the wall-clock duration of a stage as a `<stage>_ms` gauge.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_stage(&self, stage: &str, took: Duration) {
        let gauge = GaugeMetric::new(format!("{stage}_ms"), took.as_secs_f64() * 1000.0)
            .with_description(format!("Wall-clock time of the {stage} stage"));
        self.register(Box::new(gauge));
    }

    /// All metrics as a JSON object keyed by name, in name order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let inner = self.lock();
        let mut out = serde_json::Map::new();

        for (name, metric) in &inner.metrics {
            let mut obj = serde_json::Map::new();
            obj.insert("value".to_string(), metric.value());
            if let Some(desc) = metric.description() {
                obj.insert("description".to_string(), json!(desc));
            }
            out.insert(name.clone(), Value::Object(obj));
        }

        if let (Some(start), Some(end)) = (inner.start_time, inner.end_time) {
            out.insert(
                "execution_time_ms".to_string(),
                json!({
                    "value": end.duration_since(start).as_millis(),
                    "description": "Total pipeline execution time in milliseconds",
                }),
            );
        }
        Value::Object(out)
    }

    /// Metric names and values, without descriptions or timing.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.lock()
            .metrics
            .iter()
            .map(|(name, metric)| (name.clone(), metric.value()))
            .collect()
    }

    /// Emit every metric as one `info` event.
    pub fn log_summary(&self) {
        let elapsed_ms = self.elapsed().map(|d| d.as_millis());
        for (name, value) in self.snapshot() {
            info!(metric = %name, %value, "pipeline metric");
        }
        if let Some(ms) = elapsed_ms {
            info!(elapsed_ms = ms, "pipeline finished");
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/* ===================== Built-in metrics ===================== */

pub struct CounterMetric {
    name: String,
    count: u64,
}

impl CounterMetric {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, 0)
    }

    pub fn with_value(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl Metric for CounterMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.count)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A single floating-point reading.
pub struct GaugeMetric {
    name: String,
    value: f64,
    description: Option<String>,
}

impl GaugeMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Metric for GaugeMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.value)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_export_sorted() {
        let m = MetricsCollector::new();
        m.increment_counter("b_counter", 2);
        m.increment_counter("a_counter", 1);
        m.increment_counter("b_counter", 3);

        let json = m.to_json();
        let keys: Vec<&String> = json.as_object().map(|o| o.keys().collect()).unwrap_or_default();
        assert_eq!(keys, vec!["a_counter", "b_counter"]);
        assert_eq!(json["b_counter"]["value"], json!(5));
    }

    #[test]
    fn gauge_is_not_a_counter() {
        let m = MetricsCollector::new();
        m.record_stage("derive", Duration::from_millis(4));
        assert_eq!(m.counter("derive_ms"), None);
        assert!(m.snapshot().contains_key("derive_ms"));
    }
}
