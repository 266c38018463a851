use anyhow::{Context, Result};
use collection::{parse_issue_csv, IssueCollection};
use common::config::CacheConfig;
use tracing::info;
use tracker::Tracker;

use crate::metrics;

/// Merges the tracker's CSV export into the collection.
///
/// The export is downloaded only when no snapshot exists in the cache
/// directory; an existing snapshot is reused no matter how old it is.
/// Remove the file by hand to force a fresh export. A downloaded body that
/// does not parse is never stored. Every parsed row replaces any earlier
/// record with the same id. Returns the number of rows merged.
pub async fn download_bugs<T: Tracker + ?Sized>(
    collection: &mut IssueCollection,
    tracker: &T,
    cache: &CacheConfig,
) -> Result<usize> {
    let path = cache.csv_path();
    let rows = if path.exists() {
        info!(path = %path.display(), "reusing cached csv snapshot");
        let body = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        parse_issue_csv(body.as_slice()).with_context(|| format!("parsing {}", path.display()))?
    } else {
        let body = tracker
            .export_csv()
            .await
            .context("downloading csv export")?;
        // Only a body that parses becomes the snapshot.
        let rows = parse_issue_csv(body.as_slice()).context("parsing csv export")?;
        common::fs::write_atomic(&path, &body)
            .with_context(|| format!("writing csv snapshot {}", path.display()))?;
        metrics::CSV_SNAPSHOTS_FETCHED_TOTAL.inc();
        info!(path = %path.display(), bytes = body.len(), "stored csv snapshot");
        rows
    };

    let loaded = rows.len();
    for (id, record) in rows {
        collection.insert_issue(id, record);
    }
    metrics::ISSUES_LOADED_TOTAL.inc_by(loaded as u64);
    info!(rows = loaded, issues = collection.issues.len(), "merged csv issues");
    Ok(loaded)
}
