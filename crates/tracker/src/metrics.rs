use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tracker_requests_total",
        "Requests sent to the tracker per method and outcome",
        &["method", "outcome"]
    )
    .expect("tracker requests metric")
});

pub static REQUEST_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tracker_request_latency_seconds",
        "Latency of tracker requests per method",
        &["method"]
    )
    .expect("tracker latency metric")
});

pub fn observe(method: &str, success: bool, elapsed_secs: f64) {
    let outcome = if success { "success" } else { "error" };
    REQUESTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
    REQUEST_LATENCY_SECONDS
        .with_label_values(&[method])
        .observe(elapsed_secs);
}
