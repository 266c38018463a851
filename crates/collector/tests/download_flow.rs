mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use collection::{store, IssueRecord};
use collector::Collector;
use common::config::{CacheConfig, OutputConfig};
use support::StubTracker;
use tempfile::TempDir;

#[tokio::test]
async fn download_creates_cache_and_drops_spam() {
    let dir = TempDir::new().unwrap();
    let cache = CacheConfig::new(dir.path().join("cache"));
    let tracker = Arc::new(StubTracker::new());

    let report = Collector::new(cache.clone(), tracker.clone())
        .download()
        .await
        .unwrap();

    assert_eq!(report.enum_kinds_fetched.len(), 9);
    assert_eq!(report.issues_loaded, 4);
    assert_eq!(report.users_seeded, 3);
    assert_eq!(report.spam_discarded, 1);
    assert_eq!(report.issues_total, 3);
    assert!(cache.csv_path().exists());

    let saved = store::load(&cache.collection_path()).unwrap();
    assert_eq!(saved.issues.keys().copied().collect::<Vec<_>>(), vec![1, 3, 4]);
    assert_eq!(saved.users.len(), 3);
    assert!(saved
        .issues
        .values()
        .all(|issue| issue.module() == Some("")));
}

#[tokio::test]
async fn second_download_reuses_the_cache() {
    let dir = TempDir::new().unwrap();
    let cache = CacheConfig::new(dir.path());
    let tracker = Arc::new(StubTracker::new());
    let collector = Collector::new(cache.clone(), tracker.clone());

    collector.download().await.unwrap();
    let requests = tracker.requests();
    let first = store::load(&cache.collection_path()).unwrap();

    let report = collector.download().await.unwrap();
    assert!(report.enum_kinds_fetched.is_empty());
    assert_eq!(report.users_seeded, 0);
    assert_eq!(tracker.requests(), requests);
    assert_eq!(tracker.csv_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store::load(&cache.collection_path()).unwrap(), first);
}

#[tokio::test]
async fn failed_download_does_not_write_collection() {
    let dir = TempDir::new().unwrap();
    let cache = CacheConfig::new(dir.path());
    let tracker = Arc::new(StubTracker::failing_csv());

    let result = Collector::new(cache.clone(), tracker).download().await;
    assert!(result.is_err());
    assert!(!cache.collection_path().exists());
    assert!(!cache.csv_path().exists());
}

#[tokio::test]
async fn module_guesser_labels_saved_issues() {
    let dir = TempDir::new().unwrap();
    let cache = CacheConfig::new(dir.path());
    let guess = |issue: &IssueRecord| {
        issue
            .get("title")
            .and_then(|title| title.as_text())
            .filter(|title| title.contains("regex"))
            .map(|_| "re".to_string())
    };

    Collector::new(cache.clone(), Arc::new(StubTracker::new()))
        .with_module_guesser(guess)
        .download()
        .await
        .unwrap();

    let saved = store::load(&cache.collection_path()).unwrap();
    assert_eq!(saved.issues[&4].module(), Some("re"));
    assert_eq!(saved.issues[&1].module(), Some(""));
}

#[tokio::test]
async fn cached_collection_renders_chart_script() {
    let dir = TempDir::new().unwrap();
    let cache = CacheConfig::new(dir.path().join("cache"));
    let output = OutputConfig::new(dir.path().join("output"));

    Collector::new(cache.clone(), Arc::new(StubTracker::new()))
        .download()
        .await
        .unwrap();

    let collection = store::load(&cache.collection_path()).unwrap();
    let summary = analysis::summarize(&collection);
    assert_eq!(summary.issues_by_status["open"], 2);
    assert_eq!(summary.issues_by_status["closed"], 1);
    assert_eq!(summary.issues_by_type["closed"], 2);
    assert!(summary.issues_by_module.is_empty());
    assert!(summary.oldest_unreviewed.is_empty());

    analysis::write_script(&output.script_path(), &summary).unwrap();
    let script = std::fs::read_to_string(output.script_path()).unwrap();
    assert!(script.contains(r#"var issues_by_status = {"closed":1,"open":2};"#));
}
