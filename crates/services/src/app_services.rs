use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use storage::repository::{DocumentStore, ProgressStore, Storage};

use crate::Clock;
use crate::config::{RemoteStoreConfig, TrackerConfig};
use crate::error::AppServicesError;
use crate::location::LocationProvider;
use crate::navigation::Navigator;
use crate::notice::Notifier;
use crate::remote_store::HttpDocumentStore;
use crate::tracker::TrackerDeps;

/// Assembles storage and configuration shared by every screen.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    config: TrackerConfig,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Trainer documents come from the HTTP store when `GAMEPLAN_DOCS_BASE_URL`
    /// is set, otherwise from the local database.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// environment holds invalid configuration.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let mut storage = Storage::sqlite(db_url).await?;
        if let Some(remote) = RemoteStoreConfig::from_env()? {
            tracing::info!(base_url = %remote.base_url, "using remote trainer documents");
            storage.documents = Arc::new(HttpDocumentStore::new(remote));
        }
        let config = TrackerConfig::from_env()?;
        Ok(Self::with_storage(storage, clock, config))
    }

    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock, config: TrackerConfig) -> Self {
        Self {
            clock,
            storage,
            config,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), clock, TrackerConfig::default())
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub fn progress(&self) -> ProgressStore {
        self.storage.progress()
    }

    #[must_use]
    pub fn documents(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.storage.documents)
    }

    /// Collaborators for one dashboard session, with a fresh cancellation token.
    #[must_use]
    pub fn tracker_deps(
        &self,
        location: Arc<dyn LocationProvider>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> TrackerDeps {
        TrackerDeps {
            clock: self.clock,
            progress: self.progress(),
            documents: self.documents(),
            location,
            navigator,
            notifier,
            config: self.config.clone(),
            cancel: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::FixedLocationProvider;
    use crate::navigation::RecordingNavigator;
    use crate::notice::RecordingNotifier;
    use crate::tracker::DashboardTracker;
    use gameplan_core::model::{Streak, StudentId, StudentProfile, TrainerId};
    use gameplan_core::time::fixed_clock;

    #[tokio::test]
    async fn sessions_share_storage_but_not_cancellation() {
        let services = AppServices::in_memory(fixed_clock());
        services.progress().save(&Streak::new(2)).await.unwrap();

        let deps = services.tracker_deps(
            Arc::new(FixedLocationProvider::denied()),
            Arc::new(RecordingNavigator::new()),
            Arc::new(RecordingNotifier::new()),
        );
        let other = services.tracker_deps(
            Arc::new(FixedLocationProvider::denied()),
            Arc::new(RecordingNavigator::new()),
            Arc::new(RecordingNotifier::new()),
        );
        other.cancel.cancel();

        let student = StudentProfile::new(StudentId::new("s1"), "Kai", TrainerId::default());
        let tracker = DashboardTracker::initialize(deps, Some(student))
            .await
            .unwrap();
        assert_eq!(tracker.streak(), Streak::new(2));
        assert!(!tracker.cancellation_token().is_cancelled());
    }
}
