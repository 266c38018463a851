use anyhow::{Context, Result};
use collection::{EnumKind, EnumTable, IssueCollection};
use tracing::{debug, info};
use tracker::Tracker;

use crate::metrics;

/// Fills every enumeration table the collection does not hold yet.
///
/// Populated tables are left alone, so calling this on every run only costs
/// requests for kinds that are still empty. A table is installed only once
/// all of its labels resolved; any transport error aborts the whole call.
/// Returns the kinds that were fetched.
pub async fn scrape_enums<T: Tracker + ?Sized>(
    collection: &mut IssueCollection,
    tracker: &T,
) -> Result<Vec<EnumKind>> {
    let mut fetched = Vec::new();
    for kind in EnumKind::ALL {
        if collection.has_enum(kind) {
            debug!(kind = %kind, "enumeration already cached");
            continue;
        }

        let class = kind.as_str();
        let labels = tracker
            .list(class)
            .await
            .with_context(|| format!("listing {class} labels"))?;

        let mut table = EnumTable::new();
        for label in labels {
            let value = tracker
                .lookup(class, &label)
                .await
                .with_context(|| format!("resolving {class} label {label:?}"))?;
            table.insert(value, label);
        }

        info!(kind = %kind, labels = table.len(), "fetched enumeration");
        metrics::ENUM_TABLES_FETCHED_TOTAL
            .with_label_values(&[class])
            .inc();
        collection.set_enum(kind, table);
        fetched.push(kind);
    }
    Ok(fetched)
}
