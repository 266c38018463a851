use std::sync::Arc;

use anyhow::{Context, Result};
use collection::{store, EnumKind, IssueCollection, ModuleGuesser, NoModuleGuess};
use common::config::CacheConfig;
use tracing::{debug, info, instrument, warn};
use tracker::Tracker;

use crate::metrics;
use crate::{download_bugs, download_users, scrape_enums};

/// Counts from one download action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub enum_kinds_fetched: Vec<EnumKind>,
    pub issues_loaded: usize,
    pub users_seeded: usize,
    pub spam_discarded: usize,
    pub issues_total: usize,
}

pub struct Collector<T: Tracker + ?Sized + 'static> {
    cache: CacheConfig,
    tracker: Arc<T>,
    guesser: Box<dyn ModuleGuesser + Send + Sync>,
}

impl<T: Tracker + ?Sized + 'static> Collector<T> {
    pub fn new(cache: CacheConfig, tracker: Arc<T>) -> Self {
        Self {
            cache,
            tracker,
            guesser: Box::new(NoModuleGuess),
        }
    }

    pub fn with_module_guesser(
        mut self,
        guesser: impl ModuleGuesser + Send + Sync + 'static,
    ) -> Self {
        self.guesser = Box::new(guesser);
        self
    }

    /// Loads the cached collection, tops it up from the tracker, filters and
    /// annotates it, then writes it back. Nothing is saved unless every step
    /// succeeded.
    pub async fn download(&self) -> Result<DownloadReport> {
        let timer = metrics::DOWNLOAD_DURATION.start_timer();
        let result = self.download_inner().await;
        timer.observe_duration();

        match &result {
            Ok(report) => {
                metrics::DOWNLOADS_TOTAL.with_label_values(&["success"]).inc();
                metrics::COLLECTION_ISSUES.set(report.issues_total as i64);
                info!(
                    enums = report.enum_kinds_fetched.len(),
                    issues_loaded = report.issues_loaded,
                    users_seeded = report.users_seeded,
                    spam_discarded = report.spam_discarded,
                    issues_total = report.issues_total,
                    "download finished"
                );
            }
            Err(err) => {
                metrics::DOWNLOADS_TOTAL.with_label_values(&["error"]).inc();
                warn!(error = ?err, "download aborted, cache left unchanged");
            }
        }
        debug!(metrics = %metrics::render(), "run metrics");
        result
    }

    #[instrument(skip(self), fields(cache = %self.cache.dir.display()))]
    async fn download_inner(&self) -> Result<DownloadReport> {
        std::fs::create_dir_all(&self.cache.dir)
            .with_context(|| format!("creating cache dir {}", self.cache.dir.display()))?;

        let collection_path = self.cache.collection_path();
        let mut collection: IssueCollection =
            store::load(&collection_path).context("loading cached collection")?;

        let enum_kinds_fetched = scrape_enums(&mut collection, self.tracker.as_ref()).await?;
        let issues_loaded =
            download_bugs(&mut collection, self.tracker.as_ref(), &self.cache).await?;
        let users_seeded = download_users(&mut collection, self.tracker.as_ref()).await?;

        let spam_discarded = collection.discard_spam();
        metrics::SPAM_DISCARDED_TOTAL.inc_by(spam_discarded as u64);
        info!(spam_discarded, "discarded zero-message issues");

        collection.guess_modules(self.guesser.as_ref());

        store::save(&collection_path, &collection).context("saving collection")?;

        Ok(DownloadReport {
            enum_kinds_fetched,
            issues_loaded,
            users_seeded,
            spam_discarded,
            issues_total: collection.issues.len(),
        })
    }
}
