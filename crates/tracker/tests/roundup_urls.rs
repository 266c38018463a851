use std::collections::HashMap;

use anyhow::Result;
use common::config::TrackerConfig;
use tracker::{RoundupTracker, CSV_COLUMNS};

fn config(url: &str) -> TrackerConfig {
    TrackerConfig {
        url: url.to_string(),
        ..TrackerConfig::default()
    }
}

#[test]
fn endpoints_hang_off_base_url() -> Result<()> {
    let tracker = RoundupTracker::new(&config("https://bugs.example.org/roundup"))?;
    assert_eq!(
        tracker.rpc_url().as_str(),
        "https://bugs.example.org/roundup/xmlrpc"
    );
    assert_eq!(tracker.csv_url().path(), "/roundup/issue");
    assert!(!tracker.is_authenticated());
    Ok(())
}

#[test]
fn csv_export_requests_every_column_from_id_zero() -> Result<()> {
    let tracker = RoundupTracker::new(&config("https://bugs.example.org/"))?;
    let query: HashMap<String, String> = tracker
        .csv_url()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(query.get("@action").map(String::as_str), Some("export_csv"));
    assert_eq!(query.get("@filter").map(String::as_str), Some("id"));
    assert_eq!(query.get("id").map(String::as_str), Some("0-"));
    let columns: Vec<&str> = query["@columns"].split(',').collect();
    assert_eq!(columns, CSV_COLUMNS);
    Ok(())
}

#[test]
fn embedded_credentials_never_reach_the_url() -> Result<()> {
    let tracker = RoundupTracker::new(&config("https://alice:pw@bugs.example.org/"))?;
    assert!(tracker.is_authenticated());
    assert_eq!(tracker.rpc_url().username(), "");
    assert_eq!(tracker.rpc_url().password(), None);
    assert_eq!(tracker.csv_url().username(), "");
    Ok(())
}
