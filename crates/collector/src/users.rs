use anyhow::{Context, Result};
use collection::IssueCollection;
use tracing::{debug, info};
use tracker::Tracker;

use crate::metrics;

/// Seeds an empty record for every tracker user.
///
/// Any user already present marks the table as populated and the call
/// returns without contacting the tracker. Per-user details are not fetched.
pub async fn download_users<T: Tracker + ?Sized>(
    collection: &mut IssueCollection,
    tracker: &T,
) -> Result<usize> {
    if !collection.users.is_empty() {
        debug!(users = collection.users.len(), "users already cached");
        return Ok(0);
    }

    let ids = tracker.list("user").await.context("listing users")?;
    let listed = ids.len();
    let mut seeded = 0usize;
    for id in ids {
        if collection.seed_user(id) {
            seeded += 1;
        }
    }

    metrics::USERS_SEEDED_TOTAL.inc_by(seeded as u64);
    info!(listed, seeded, "seeded users");
    Ok(seeded)
}
