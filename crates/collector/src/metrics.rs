use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

pub static DOWNLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "collector_downloads_total",
        "Download actions attempted, by outcome",
        &["outcome"]
    )
    .expect("collector downloads total")
});

pub static DOWNLOAD_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "collector_download_duration_seconds",
        "Wall-clock duration of a download action"
    )
    .expect("collector download duration")
});

pub static ENUM_TABLES_FETCHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "collector_enum_tables_fetched_total",
        "Enumeration tables fetched from the tracker, by kind",
        &["kind"]
    )
    .expect("collector enum tables fetched")
});

pub static CSV_SNAPSHOTS_FETCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "collector_csv_snapshots_fetched_total",
        "CSV exports downloaded because no local snapshot existed"
    )
    .expect("collector csv snapshots fetched")
});

pub static ISSUES_LOADED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "collector_issues_loaded_total",
        "Issue rows merged into the collection from the CSV snapshot"
    )
    .expect("collector issues loaded")
});

pub static USERS_SEEDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "collector_users_seeded_total",
        "Placeholder user records added to the collection"
    )
    .expect("collector users seeded")
});

pub static SPAM_DISCARDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "collector_spam_discarded_total",
        "Issues dropped because they have no messages"
    )
    .expect("collector spam discarded")
});

pub static COLLECTION_ISSUES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "collector_collection_issues",
        "Issues held by the collection after the last download"
    )
    .expect("collector collection issues")
});

/// Text exposition of the default registry, for the end-of-run debug log.
pub fn render() -> String {
    let mut buffer = Vec::new();
    let families = prometheus::gather();
    if TextEncoder::new().encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
