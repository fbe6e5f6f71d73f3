use std::sync::Arc;

use storage::repository::{RemoteProgressStore, Storage};
use tracker_core::{Catalog, Clock};
use tracker_core::model::Identity;

use crate::error::AppServicesError;
use crate::progress::ProgressService;

/// Assembles the catalog and progress store for the presentation layer.
pub struct AppServices {
    catalog: Catalog,
    progress: ProgressService,
}

impl AppServices {
    /// Build services with a `SQLite`-backed local store and the given
    /// remote store, then run initial resolution for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog
    /// loading fails. Progress resolution itself cannot fail.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        remote: Arc<dyn RemoteProgressStore>,
        identity: Identity,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url, remote).await?;
        Self::with_storage(storage, clock, identity).await
    }

    /// Build services over in-memory stores; for tests and prototyping.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bundled catalog fails to parse.
    pub async fn in_memory(clock: Clock, identity: Identity) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::in_memory(), clock, identity).await
    }

    async fn with_storage(
        storage: Storage,
        clock: Clock,
        identity: Identity,
    ) -> Result<Self, AppServicesError> {
        let catalog = Catalog::bundled()?;
        let mut progress = ProgressService::new(clock, storage);
        progress.identity_changed(identity).await;
        Ok(Self { catalog, progress })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    #[must_use]
    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }
}
